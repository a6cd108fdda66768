use std::env;

/// Trait for settings that can be looked up from environment variables
pub trait KeyFromEnv {
    /// The environment variable name holding this setting
    const KEY_NAME: &'static str;

    /// Find the value by loading the .env file first, then reading the environment
    fn find_key() -> Option<String> {
        // Silently ignore a missing .env file
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Server URL of the GraphQL endpoint
pub struct ServerUrl;

impl KeyFromEnv for ServerUrl {
    const KEY_NAME: &'static str = "DATA_GQL_URL";
}

/// Bearer token sent along with GraphQL requests
pub struct Credential;

impl KeyFromEnv for Credential {
    const KEY_NAME: &'static str = "DATA_GQL_CREDENTIAL";
}

/// Bearer token sent along with REST requests; never shared with GraphQL
pub struct RestCredential;

impl KeyFromEnv for RestCredential {
    const KEY_NAME: &'static str = "DATA_REST_CREDENTIAL";
}

/// Verbose flow logging toggle
pub struct Logging;

impl KeyFromEnv for Logging {
    const KEY_NAME: &'static str = "DATA_LOGGING";
}

/// Settings shared by the data components.
///
/// `logging` enables the verbose flow logs (request issued, response received,
/// envelope built). It is intended for development; errors are logged regardless.
/// `credential` only goes to the GraphQL server, `rest_credential` only to REST URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataConfig {
    pub url: Option<String>,
    pub credential: Option<String>,
    pub rest_credential: Option<String>,
    pub logging: bool,
}

impl DataConfig {
    /// Load the configuration from the environment (and `.env`, if present)
    pub fn from_env() -> Self {
        Self {
            url: ServerUrl::find_key(),
            credential: Credential::find_key(),
            rest_credential: RestCredential::find_key(),
            logging: Logging::find_key().map_or(false, |v| parse_flag(&v)),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    #[must_use]
    pub fn with_rest_credential(mut self, credential: impl Into<String>) -> Self {
        self.rest_credential = Some(credential.into());
        self
    }

    #[must_use]
    pub const fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
