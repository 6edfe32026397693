use std::time::Duration;

use crate::error::{NikeError, Result};

/// The developer site login form.
pub const LOGIN_ENDPOINT: &str = "https://developer.nike.com/login";

/// The developer site's request relay. It executes a JSON-described request
/// against the Nike+ API gateway on our behalf.
pub const RELAY_ENDPOINT: &str = "https://developer.nike.com/request/";

/// The developer site only hands out session cookies to browsers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Connection settings for an [`crate::ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub login_url: String,
    pub relay_url: String,
    pub user_agent: String,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
    /// Skip TLS certificate and hostname checks.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            login_url: LOGIN_ENDPOINT.to_string(),
            relay_url: RELAY_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Some(Duration::from_secs(30)),
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    pub fn login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    pub fn relay_url(mut self, url: impl Into<String>) -> Self {
        self.relay_url = url.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables TLS verification, as the original PHP library did.
    /// Only use this if the relay cannot be reached otherwise.
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// Builds the HTTP client shared by every request of a session.
    ///
    /// Redirects are never followed: the login form answers with a redirect
    /// that carries the session cookies, and those must be read off that response.
    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(self.user_agent.as_str())
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(NikeError::Client)
    }
}
