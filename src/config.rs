//! Configuration constants and the client configuration builder

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Result, TfeError};
use crate::hcp::{RetryHook, TokenResolver};

/// Configuration constants for TFE API
pub mod api {
    /// Base path for TFE API v2
    pub const BASE_PATH: &str = "/api/v2/";

    /// JSON:API media type used for both requests and responses
    pub const CONTENT_TYPE: &str = "application/vnd.api+json";

    /// Organizations endpoint
    pub const ORGANIZATIONS: &str = "organizations";

    /// Projects endpoint
    pub const PROJECTS: &str = "projects";

    /// Workspaces endpoint
    pub const WORKSPACES: &str = "workspaces";

    /// Runs endpoint
    pub const RUNS: &str = "runs";

    /// Teams endpoint
    pub const TEAMS: &str = "teams";

    /// Organization memberships endpoint
    pub const ORGANIZATION_MEMBERSHIPS: &str = "organization-memberships";

    /// Workspace variables endpoint (nested under a workspace)
    pub const VARS: &str = "vars";

    /// Configuration versions endpoint
    pub const CONFIGURATION_VERSIONS: &str = "configuration-versions";

    /// State versions endpoint
    pub const STATE_VERSIONS: &str = "state-versions";

    /// Policies endpoint
    pub const POLICIES: &str = "policies";

    /// Admin settings endpoint prefix
    pub const ADMIN_SETTINGS: &str = "admin/settings";

    /// Health check endpoint used to read remote metadata headers
    pub const PING: &str = "ping";

    /// Page size used when walking every page of a list
    pub const DEFAULT_PAGE_SIZE: u32 = 100;

    /// Largest page size the API accepts
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Upper bound on page requests in flight at once
    pub const MAX_CONCURRENT_PAGE_REQUESTS: usize = 10;
}

/// Retry and transport limits
pub mod retry {
    use std::time::Duration;

    /// Maximum number of retries after the first attempt
    pub const MAX_RETRIES: u32 = 5;

    /// Maximum number of redirects followed per request
    pub const MAX_REDIRECTS: usize = 5;

    /// Backoff window for rate limited (429/425) responses
    pub const WAIT_MIN: Duration = Duration::from_millis(100);
    pub const WAIT_MAX: Duration = Duration::from_millis(400);

    /// Backoff window for server errors, multiplied by the attempt number
    pub const SERVER_ERROR_WAIT_MIN: Duration = Duration::from_millis(700);
    pub const SERVER_ERROR_WAIT_MAX: Duration = Duration::from_millis(900);

    /// No single backoff sleep exceeds this
    pub const MAX_BACKOFF: Duration = Duration::from_secs(5);

    /// Header carrying the seconds until the rate limit window resets
    pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";
}

/// Configuration constants for credentials
pub mod credentials {
    /// Credentials file name
    pub const FILE_NAME: &str = "terraform.d/credentials.tfrc.json";

    /// Path to Terraform credentials file on Unix (relative to HOME)
    pub const FILE_PATH_UNIX: &str = ".terraform.d/credentials.tfrc.json";

    /// Environment variable names for token (checked in order)
    pub const TOKEN_ENV_VARS: &[&str] = &["TFE_TOKEN", "TFC_TOKEN", "HCP_TOKEN"];
}

/// Environment variables read by [`ClientConfig::from_env`](super::ClientConfig::from_env)
pub mod env {
    /// API address, e.g. `https://tfe.example.com`
    pub const ADDRESS: &str = "TFE_ADDRESS";

    /// API path prefix override
    pub const BASE_PATH: &str = "TFE_BASE_PATH";
}

/// Default values
pub mod defaults {
    /// Default API address
    pub const ADDRESS: &str = "https://app.terraform.io";

    /// Default TFE host
    pub const HOST: &str = "app.terraform.io";

    /// User agent sent with every request
    pub const USER_AGENT: &str = concat!("tfe-client/", env!("CARGO_PKG_VERSION"));

    /// Per-attempt connect timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Per-attempt request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
}

/// Settings consumed once by [`TfeClient::new`](crate::TfeClient::new).
///
/// The client copies everything it needs out of the config; nothing here can
/// be changed on a live client.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) address: String,
    pub(crate) base_path: String,
    pub(crate) token: String,
    pub(crate) headers: HeaderMap,
    pub(crate) retry_server_errors: bool,
    pub(crate) retry_hook: Option<RetryHook>,
    pub(crate) retry_wait: (Duration, Duration),
    pub(crate) server_error_wait: (Duration, Duration),
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) http_client: Option<reqwest::Client>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("address", &self.address)
            .field("base_path", &self.base_path)
            .field("token", &"<redacted>")
            .field("headers", &self.headers)
            .field("retry_server_errors", &self.retry_server_errors)
            .field("retry_hook", &self.retry_hook.is_some())
            .field("retry_wait", &self.retry_wait)
            .field("server_error_wait", &self.server_error_wait)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: defaults::ADDRESS.to_string(),
            base_path: api::BASE_PATH.to_string(),
            token: String::new(),
            headers: HeaderMap::new(),
            retry_server_errors: false,
            retry_hook: None,
            retry_wait: (retry::WAIT_MIN, retry::WAIT_MAX),
            server_error_wait: (retry::SERVER_ERROR_WAIT_MIN, retry::SERVER_ERROR_WAIT_MAX),
            request_timeout: None,
            http_client: None,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given address and token
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    /// Build a config from `TFE_ADDRESS`, `TFE_BASE_PATH` and the token
    /// resolution chain of [`TokenResolver`].
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(address) = std::env::var(env::ADDRESS) {
            if !address.is_empty() {
                debug!("Using address from {}: {}", env::ADDRESS, address);
                config.address = address;
            }
        }
        if let Ok(base_path) = std::env::var(env::BASE_PATH) {
            if !base_path.is_empty() {
                config.base_path = base_path;
            }
        }

        let host = host_of(&config.address)?;
        config.token = TokenResolver::new(&host).resolve(None)?;
        Ok(config)
    }

    /// Set the API address (scheme and host)
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the API path prefix
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Add a static header sent with every request
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::try_from(name)
            .map_err(|e| TfeError::Config(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| TfeError::Config(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Also retry 5xx responses and failed connection attempts
    pub fn retry_server_errors(mut self, enabled: bool) -> Self {
        self.retry_server_errors = enabled;
        self
    }

    /// Observe every retry. The hook gets the retry number (1-based) and the
    /// response that triggered it, if there was one.
    pub fn retry_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(u32, Option<&reqwest::Response>) + Send + Sync + 'static,
    {
        self.retry_hook = Some(Arc::new(hook));
        self
    }

    /// Backoff window used for 429/425 responses
    pub fn retry_wait(mut self, min: Duration, max: Duration) -> Self {
        self.retry_wait = (min, max.max(min));
        self
    }

    /// Backoff window used for server errors (scaled by attempt)
    pub fn server_error_wait(mut self, min: Duration, max: Duration) -> Self {
        self.server_error_wait = (min, max.max(min));
        self
    }

    /// Deadline for a whole call, retries included
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Use a caller-built transport instead of the default one
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

/// Extract the host (with port, if any) from an address
pub(crate) fn host_of(address: &str) -> Result<String> {
    let url = reqwest::Url::parse(address)
        .map_err(|e| TfeError::Config(format!("Invalid address '{}': {}", address, e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| TfeError::Config(format!("Address '{}' has no host", address)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_path_format() {
        assert!(api::BASE_PATH.starts_with('/'));
        assert!(api::BASE_PATH.ends_with('/'));
    }

    #[test]
    fn test_credentials_env_vars() {
        assert_eq!(
            credentials::TOKEN_ENV_VARS,
            &["TFE_TOKEN", "TFC_TOKEN", "HCP_TOKEN"]
        );
    }

    #[test]
    fn test_default_address_is_https() {
        assert!(defaults::ADDRESS.starts_with("https://"));
        assert!(defaults::ADDRESS.ends_with(defaults::HOST));
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.address, "https://app.terraform.io");
        assert_eq!(config.base_path, "/api/v2/");
        assert!(!config.retry_server_errors);
        assert!(config.retry_hook.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = ClientConfig::new("https://tfe.example.com", "secret")
            .base_path("/custom/")
            .retry_server_errors(true)
            .retry_hook(|_, _| {})
            .request_timeout(Duration::from_secs(3));

        assert_eq!(config.address, "https://tfe.example.com");
        assert_eq!(config.token, "secret");
        assert_eq!(config.base_path, "/custom/");
        assert!(config.retry_server_errors);
        assert!(config.retry_hook.is_some());
        assert_eq!(config.request_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let result = ClientConfig::default().header("bad header", "x");
        assert!(matches!(result, Err(TfeError::Config(_))));
    }

    #[test]
    fn test_retry_wait_max_never_below_min() {
        let config = ClientConfig::default()
            .retry_wait(Duration::from_millis(50), Duration::from_millis(10));
        assert_eq!(config.retry_wait.1, Duration::from_millis(50));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::new(defaults::ADDRESS, "super-secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://app.terraform.io").unwrap(), "app.terraform.io");
        assert_eq!(host_of("http://127.0.0.1:8080").unwrap(), "127.0.0.1:8080");
        assert!(host_of("not a url").is_err());
    }
}
