//! API credentials and client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::WikifolioError;

/// Default base URL of the wikifolio trading API.
pub const DEFAULT_BASE_URL: &str = "https://trading-api.wikifolio.com/v1";

/// Environment variable holding the client-level API key.
pub const CLIENT_API_KEY_ENV: &str = "WIKIFOLIO_CLIENT_API_KEY";
/// Environment variable holding the user-level API key.
pub const USER_API_KEY_ENV: &str = "WIKIFOLIO_USER_API_KEY";

/// The client-level and user-level API keys.
///
/// Immutable once built. Both keys are sent as header values, so they must
/// be non-empty visible ASCII.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_api_key: String,
    user_api_key: String,
}

impl Credentials {
    pub fn new(
        client_api_key: impl Into<String>,
        user_api_key: impl Into<String>,
    ) -> Result<Self, WikifolioError> {
        let client_api_key = client_api_key.into();
        let user_api_key = user_api_key.into();
        check_key("client API key", &client_api_key)?;
        check_key("user API key", &user_api_key)?;
        Ok(Self { client_api_key, user_api_key })
    }

    /// Load from the default environment variables.
    pub fn from_env() -> Result<Self, WikifolioError> {
        Self::from_env_vars(CLIENT_API_KEY_ENV, USER_API_KEY_ENV)
    }

    /// Load from the named environment variables.
    pub fn from_env_vars(client_var: &str, user_var: &str) -> Result<Self, WikifolioError> {
        let client_api_key = std::env::var(client_var)
            .map_err(|_| WikifolioError::Configuration(format!("{} not set", client_var)))?;
        let user_api_key = std::env::var(user_var)
            .map_err(|_| WikifolioError::Configuration(format!("{} not set", user_var)))?;
        Self::new(client_api_key, user_api_key)
    }

    pub fn client_api_key(&self) -> &str {
        &self.client_api_key
    }

    pub fn user_api_key(&self) -> &str {
        &self.user_api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_api_key", &"<redacted>")
            .field("user_api_key", &"<redacted>")
            .finish()
    }
}

fn check_key(label: &str, key: &str) -> Result<(), WikifolioError> {
    if key.trim().is_empty() {
        return Err(WikifolioError::Configuration(format!("{} is empty", label)));
    }
    if !key.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(WikifolioError::Configuration(format!(
            "{} contains characters not allowed in a header value",
            label
        )));
    }
    Ok(())
}

/// Everything a client needs to talk to the API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Config against the production API with no request timeout.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Point the client at another base URL (sandbox, proxy, mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a per-request timeout on the transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
