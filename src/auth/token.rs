use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Keeps absurd `expires_in` values from overflowing the expiry timestamp.
const MAX_LIFETIME_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// A bearer token obtained through the relay's gateway login.
///
/// Tokens are never refreshed: the refresh token is kept only so callers
/// can inspect it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// `expires_in` is taken to be in seconds, per OAuth2 convention.
    pub fn new(token: String, refresh_token: String, expires_in: i64) -> Self {
        Self::issued_at(token, refresh_token, expires_in, Utc::now())
    }

    pub(crate) fn issued_at(
        token: String,
        refresh_token: String,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_in = expires_in.clamp(-MAX_LIFETIME_SECS, MAX_LIFETIME_SECS);
        Self {
            token,
            refresh_token,
            expires_at: now + Duration::seconds(expires_in),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Renders the bearer token itself, for use as the `access_token` parameter.
impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
