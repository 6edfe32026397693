use reqwest::header::{self, HeaderMap};
use std::fmt;
use tracing::{debug, info};

use crate::error::{NikeError, Result, Stage};

/// The user's email and password, in a struct out of ease.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Session cookies handed out by the developer site, joined as a `Cookie` header value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    header: String,
    count: usize,
}

impl SessionCookies {
    /// Collects `name=value` pairs from every `Set-Cookie` header,
    /// dropping attributes such as `Path` or `HttpOnly`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_set_cookie_values(
            headers
                .get_all(header::SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok()),
        )
    }

    /// Only values terminated by `;` are taken, as the developer site
    /// always sends attributes with its session cookies.
    pub fn from_set_cookie_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let pairs: Vec<&str> = values
            .into_iter()
            .filter_map(|value| value.split_once(';'))
            .map(|(pair, _)| pair.trim())
            .filter(|pair| !pair.is_empty())
            .collect();
        Self {
            header: pairs.join("; "),
            count: pairs.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.header
    }

    /// Number of cookies captured.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Logs into the developer site and captures its session cookies.
///
/// There is no other way to obtain an access token than through the
/// developer site's own relay, which requires a logged-in session.
/// Whether the login was accepted isn't checked here: a rejected login
/// simply yields no usable cookies, and the token exchange fails instead.
pub async fn login(
    client: &reqwest::Client,
    login_url: &str,
    credentials: &Credentials,
) -> Result<SessionCookies> {
    debug!(email = %credentials.email, "logging into developer site");

    let result = client
        .post(login_url)
        .form(&[
            ("email", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ])
        .send()
        .await
        .map_err(|error| NikeError::request(Stage::Login, error.to_string()))?;

    let cookies = SessionCookies::from_headers(result.headers());
    info!(
        status = %result.status(),
        cookie_count = cookies.len(),
        "captured session cookies"
    );
    Ok(cookies)
}
