use serde_json::Value;
use tracing::info;

use crate::auth::{self, AccessToken, Credentials, SessionCookies};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::relay::{self, RelayEnvelope, RelayReply};

/// An authenticated session against the Nike+ API.
///
/// Both the developer site cookies and the access token are required for
/// every call, so a client only exists once both have been obtained.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    cookies: SessionCookies,
    access_token: AccessToken,
}

impl ApiClient {
    /// Logs in with the production endpoints.
    pub async fn login(email: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::login_with_config(Credentials::new(email, password), ClientConfig::default()).await
    }

    /// Logs into the developer site, then exchanges the session for an access token.
    /// Either step failing aborts the whole login.
    pub async fn login_with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let http = config.build_http_client()?;

        let cookies = auth::login(&http, &config.login_url, &credentials).await?;
        let access_token =
            auth::obtain_access_token(&http, &config.relay_url, &cookies, &credentials).await?;
        info!(email = %credentials.email, "authenticated against Nike+ API");

        Ok(Self {
            http,
            config,
            cookies,
            access_token,
        })
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn session_cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    /// Performs a GET against an API gateway method, returning the decoded payload.
    ///
    /// `access_token` is always sent; a caller-supplied parameter of the same name replaces it.
    pub async fn request<K, V>(
        &self,
        path: &str,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Value>
    where
        K: Into<String>,
        V: ToString,
    {
        self.relay(path, params).await?.decode()
    }

    /// Like [`ApiClient::request`], but returns the relay's response untouched,
    /// whatever its status. No validation is performed on it whatsoever.
    pub async fn request_raw<K, V>(
        &self,
        path: &str,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<String>
    where
        K: Into<String>,
        V: ToString,
    {
        Ok(self.relay(path, params).await?.text)
    }

    async fn relay<K, V>(
        &self,
        path: &str,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<RelayReply>
    where
        K: Into<String>,
        V: ToString,
    {
        let query = build_query(self.access_token.token(), params);
        let envelope = RelayEnvelope::get(&format!("{path}?{query}"));
        relay::send(&self.http, &self.config.relay_url, self.cookies.as_str(), &envelope).await
    }
}

/// Merges the access token with caller parameters, later values winning
/// while keeping each key at its first position.
fn build_query<K, V>(access_token: &str, params: impl IntoIterator<Item = (K, V)>) -> String
where
    K: Into<String>,
    V: ToString,
{
    let mut merged: Vec<(String, String)> =
        vec![("access_token".to_string(), access_token.to_string())];

    for (key, value) in params {
        let key = key.into();
        let value = value.to_string();
        match merged.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => merged.push((key, value)),
        }
    }

    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(merged)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_comes_first() {
        let query = build_query("abc", [("offset", 1), ("count", 5)]);
        assert_eq!(query, "access_token=abc&offset=1&count=5");
    }

    #[test]
    fn caller_parameters_win_on_collision() {
        let query = build_query("abc", [("startDate", "2020-01-01"), ("access_token", "override")]);
        assert_eq!(query, "access_token=override&startDate=2020-01-01");
    }

    #[test]
    fn values_are_url_encoded() {
        let query = build_query("a+b/c", [("note", "a b&c")]);
        assert_eq!(query, "access_token=a%2Bb%2Fc&note=a+b%26c");
    }

    #[test]
    fn no_parameters_sends_only_the_token() {
        let query = build_query("abc", std::iter::empty::<(&str, &str)>());
        assert_eq!(query, "access_token=abc");
    }
}
