use serde::Deserialize;
use tracing::{debug, info};

use super::{AccessToken, Credentials, SessionCookies};
use crate::error::{NikeError, Result, Stage};
use crate::relay::{self, RelayEnvelope, RelayResponse};

/// The gateway's login response, once unwrapped from the relay envelope.
#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
    expires_in: ExpiresIn,
}

/// `expires_in` has been observed both as a number and as a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(i64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Result<i64> {
        match self {
            ExpiresIn::Seconds(seconds) => Ok(*seconds),
            ExpiresIn::Text(text) => text.trim().parse().map_err(|_| {
                NikeError::token(Stage::Body, format!("expires_in is not a number: {text}"))
            }),
        }
    }
}

/// Obtains an access token by logging into the API gateway through the relay.
///
/// The relay only accepts requests from a logged-in developer site session,
/// so `cookies` must come from [`super::login`]. A single attempt is made.
pub async fn obtain_access_token(
    client: &reqwest::Client,
    relay_url: &str,
    cookies: &SessionCookies,
    credentials: &Credentials,
) -> Result<AccessToken> {
    let envelope = RelayEnvelope::gateway_login(&credentials.email, &credentials.password);
    let reply = relay::send(client, relay_url, cookies.as_str(), &envelope)
        .await
        .map_err(|error| NikeError::token(Stage::Transport, error.detail()))?;
    debug!(status = %reply.status, length = reply.text.len(), "received token exchange response");

    let token = parse_token_response(&reply.text)?;
    info!(expires_at = %token.expires_at(), "obtained access token");
    Ok(token)
}

/// Both layers of the relay response must decode, or no token can be had.
fn parse_token_response(response_text: &str) -> Result<AccessToken> {
    let outer: RelayResponse = serde_json::from_str(response_text)
        .map_err(|error| NikeError::token(Stage::Envelope, error.to_string()))?;

    let Some(body) = outer.body() else {
        return Err(NikeError::token(
            Stage::Envelope,
            "relay response carries no body",
        ));
    };

    let grant: TokenGrant = serde_json::from_str(body)
        .map_err(|error| NikeError::token(Stage::Body, error.to_string()))?;

    Ok(AccessToken::new(
        grant.access_token,
        grant.refresh_token,
        grant.expires_in.seconds()?,
    ))
}
