//! The developer site's request relay.
//!
//! Rather than talking to the API gateway directly, every call is described
//! as JSON and POSTed to a single endpoint, which performs it server-side.
//! For example, fetching aggregate sport data is sent as:
//! ```json
//! {
//!     "method": "GET",
//!     "url": "%base_url%/me/sport?access_token=[..]",
//!     "headers": { "appid": "%appid%", "Accept": "application/json" },
//!     "body": ""
//! }
//! ```
//! Placeholders such as `%base_url%` and `%appid%` are filled in by the relay.
//!
//! Its response wraps the gateway's response body as a JSON *string*:
//! ```json
//! { "response": { "body": "{\"distance\": 5.2}" }, "error": null }
//! ```
//! so every reply has to be decoded twice.

use std::collections::BTreeMap;

use reqwest::{header, StatusCode};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{NikeError, Result, Stage};

/// The gateway's user login method, with client secrets filled in by the relay.
pub const GATEWAY_LOGIN_URL: &str = "%base_url%/nsl/v2.0/user/login?format=json&app=%25appid%25&client_id=%25client_id%25&client_secret=%25client_secret%25";

/// A JSON-described request for the relay to perform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelayEnvelope {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RelayEnvelope {
    /// A GET against the API gateway. `path_and_query` is appended to `%base_url%`.
    pub fn get(path_and_query: &str) -> Self {
        Self {
            method: "GET".to_string(),
            url: format!("%base_url%{path_and_query}"),
            headers: gateway_headers(),
            body: String::new(),
        }
    }

    /// The gateway login call used to obtain an access token.
    pub fn gateway_login(email: &str, password: &str) -> Self {
        let mut headers = gateway_headers();
        headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("email", email)
            .append_pair("password", password)
            .finish();

        Self {
            method: "POST".to_string(),
            url: GATEWAY_LOGIN_URL.to_string(),
            headers,
            body,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|error| NikeError::request(Stage::Transport, error.to_string()))
    }
}

fn gateway_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("appid".to_string(), "%appid%".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ])
}

/// The outer envelope returned by the relay.
#[derive(Deserialize, Debug, Default)]
pub struct RelayResponse {
    #[serde(default)]
    pub response: Option<RelayBody>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RelayBody {
    /// The gateway's response body, still JSON-encoded.
    #[serde(default)]
    pub body: Option<String>,
}

impl RelayResponse {
    pub fn body(&self) -> Option<&str> {
        self.response.as_ref()?.body.as_deref()
    }
}

/// What the relay sent back, before any decoding.
#[derive(Debug, Clone)]
pub struct RelayReply {
    pub status: StatusCode,
    pub text: String,
}

impl RelayReply {
    /// Decodes the reply into the gateway's payload.
    ///
    /// The relay reports its own errors in the body whatever the status, so
    /// the status only matters once the body turns out not to be JSON.
    pub fn decode(&self) -> Result<Value> {
        if !self.status.is_success() && serde_json::from_str::<IgnoredAny>(&self.text).is_err() {
            return Err(NikeError::request(
                Stage::Transport,
                format!("relay responded with status {}", self.status),
            ));
        }
        unwrap_response(&self.text)
    }
}

/// POSTs the envelope to the relay with the session cookies attached.
/// Only failing to reach the relay or read its reply is an error here.
pub async fn send(
    client: &reqwest::Client,
    relay_url: &str,
    cookies: &str,
    envelope: &RelayEnvelope,
) -> Result<RelayReply> {
    debug!(method = %envelope.method, url = %redact(&envelope.url), "sending relay request");
    let data = envelope.to_json()?;

    let mut request = client.post(relay_url).form(&[("data", data)]);
    if !cookies.is_empty() {
        request = request.header(header::COOKIE, cookies);
    }

    let result = request
        .send()
        .await
        .map_err(|error| NikeError::request(Stage::Transport, error.to_string()))?;

    let status = result.status();
    if !status.is_success() {
        debug!(%status, "relay replied with a non-success status");
    }

    let text = result
        .text()
        .await
        .map_err(|error| NikeError::request(Stage::Transport, error.to_string()))?;
    Ok(RelayReply { status, text })
}

/// Decodes a relay response into the gateway's payload.
///
/// Checks run outer envelope first, then the nested body:
/// a relay `error` wins over anything the gateway said.
pub fn unwrap_response(raw: &str) -> Result<Value> {
    let outer: RelayResponse = serde_json::from_str(raw)
        .map_err(|error| NikeError::request(Stage::Envelope, error.to_string()))?;

    if let Some(error) = outer.error.as_ref().filter(|error| is_present(error)) {
        let code = error.get("code").unwrap_or(error);
        warn!(code = %describe(code), "relay reported an error");
        return Err(NikeError::request(Stage::Envelope, describe(code)));
    }

    let inner = match outer.body() {
        Some(body) => serde_json::from_str::<Value>(body).map_err(|error| {
            NikeError::request(
                Stage::Body,
                format!("Response cannot be used as JSON: {error}"),
            )
        })?,
        None => Value::Null,
    };

    if let Some(error) = inner.get("error").filter(|error| is_present(error)) {
        warn!(error = %describe(error), "gateway reported an error");
        return Err(NikeError::request(Stage::Body, describe(error)));
    }

    if inner.get("result").and_then(Value::as_str) == Some("failure") {
        let message = inner
            .get("errorMessage")
            .map(describe)
            .unwrap_or_default();
        warn!(%message, "gateway reported a failure result");
        return Err(NikeError::request(Stage::Body, message));
    }

    if matches!(inner, Value::Null | Value::Bool(false)) {
        return Err(NikeError::request(
            Stage::Body,
            "Response cannot be used as JSON: body is missing or empty",
        ));
    }

    Ok(inner)
}

/// Whether an `error` field actually reports something.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Number(number) => number.as_f64() != Some(0.0),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Renders an error value for humans: strings as-is, anything else as JSON.
fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Hides the access token when logging relay URLs.
fn redact(url: &str) -> String {
    match url.split_once("access_token=") {
        Some((before, after)) => {
            let rest = after.find('&').map(|index| &after[index..]).unwrap_or("");
            format!("{before}access_token=[redacted]{rest}")
        }
        None => url.to_string(),
    }
}
