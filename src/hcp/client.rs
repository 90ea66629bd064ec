//! TFE HTTP client for API interactions

use std::fmt;
use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{redirect, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::{api, defaults, retry, ClientConfig};
use crate::error::{error_from_response, Result, TfeError};
use crate::hcp::jsonapi::{self, Payload};
use crate::hcp::retry::{RetryHook, RetryPolicy};
use crate::hcp::traits::ListResponse;

const OCTET_STREAM: &str = "application/octet-stream";

/// Metadata the API reports about itself in `/ping` response headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteMeta {
    /// `TFP-API-Version`
    pub api_version: Option<String>,
    /// `X-TFE-Version`, only sent by Terraform Enterprise
    pub tfe_version: Option<String>,
    /// `TFP-AppName`
    pub app_name: Option<String>,
    /// `X-RateLimit-Limit`
    pub rate_limit: Option<u32>,
}

impl RemoteMeta {
    fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            api_version: text("tfp-api-version"),
            tfe_version: text("x-tfe-version"),
            app_name: text("tfp-appname"),
            rate_limit: text("x-ratelimit-limit").and_then(|v| v.trim().parse().ok()),
        }
    }

    /// True when talking to Terraform Enterprise rather than HCP Terraform
    pub fn is_enterprise(&self) -> bool {
        self.tfe_version.is_some()
    }
}

/// TFE API client
///
/// Cheap to clone; clones share the connection pool. Nothing on the client
/// changes after construction, so one instance can serve any number of
/// concurrent calls.
#[derive(Clone)]
pub struct TfeClient {
    client: Client,
    token: String,
    base_url: Url,
    headers: HeaderMap,
    retry: RetryPolicy,
    retry_hook: Option<RetryHook>,
    request_timeout: Option<Duration>,
}

impl fmt::Debug for TfeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfeClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl TfeClient {
    /// Create a new TFE client from a configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(TfeError::Config("API token is required".to_string()));
        }

        let address = Url::parse(&config.address).map_err(|e| {
            TfeError::Config(format!("Invalid address '{}': {}", config.address, e))
        })?;
        if address.cannot_be_a_base() {
            return Err(TfeError::Config(format!(
                "Address '{}' cannot be used as a base URL",
                config.address
            )));
        }
        let base_url = address
            .join(&normalize_base_path(&config.base_path))
            .map_err(|e| TfeError::Config(format!("Invalid base path: {}", e)))?;

        let client = match config.http_client {
            Some(client) => client,
            None => Client::builder()
                // Connection pool settings - reuse connections
                .pool_max_idle_per_host(20)
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .connect_timeout(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS))
                .timeout(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS))
                .redirect(redirect::Policy::limited(retry::MAX_REDIRECTS))
                .user_agent(defaults::USER_AGENT)
                .build()?,
        };

        debug!("Created TFE client for {}", base_url);

        Ok(Self {
            client,
            token: config.token,
            base_url,
            headers: config.headers,
            retry: RetryPolicy {
                retry_server_errors: config.retry_server_errors,
                wait: config.retry_wait,
                server_error_wait: config.server_error_wait,
            },
            retry_hook: config.retry_hook,
            request_timeout: config.request_timeout,
        })
    }

    /// Create a client from the environment, see [`ClientConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Base URL every relative path is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Retry policy in effect for this client
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Read the remote API metadata headers
    pub async fn ping(&self) -> Result<RemoteMeta> {
        let builder = self.request(Method::GET, api::PING)?;
        self.with_deadline(async {
            let response = self.send(builder).await?;
            Ok(RemoteMeta::from_headers(response.headers()))
        })
        .await
    }

    /// Resolve a path against the base URL; absolute URLs are kept as-is
    pub(crate) fn url_for(&self, path: &str) -> Result<Url> {
        if path.starts_with("https://") || path.starts_with("http://") {
            return Url::parse(path)
                .map_err(|e| TfeError::Config(format!("Invalid URL '{}': {}", path, e)));
        }
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TfeError::Config(format!("Invalid path '{}': {}", path, e)))
    }

    /// Whether a URL points at the configured API origin
    pub(crate) fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }

    /// Request with static headers and, for same-origin URLs, the bearer token
    pub(crate) fn raw_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url_for(path)?;
        let same_origin = self.is_same_origin(&url);
        let mut builder = self.client.request(method, url).headers(self.headers.clone());
        if same_origin {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", self.token));
        }
        Ok(builder)
    }

    /// Request builder with standard JSON:API headers
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self
            .raw_request(method, path)?
            .header(ACCEPT, api::CONTENT_TYPE)
            .header(CONTENT_TYPE, api::CONTENT_TYPE))
    }

    /// Request builder carrying a JSON:API document built from `payload`
    pub(crate) fn payload_request<P: Payload>(
        &self,
        method: Method,
        path: &str,
        payload: &P,
    ) -> Result<RequestBuilder> {
        let document = jsonapi::encode(payload)?;
        self.json_request(method, path, &document)
    }

    /// Request builder carrying an arbitrary JSON body
    pub(crate) fn json_request(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> Result<RequestBuilder> {
        let bytes = serde_json::to_vec(body)?;
        debug!("{} {} body: {}", method, path, body);
        Ok(self.request(method, path)?.body(bytes))
    }

    /// Run `fut` under the configured overall deadline
    pub(crate) async fn with_deadline<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| TfeError::Timeout)?,
            None => fut.await,
        }
    }

    /// Execute with retries, then map any non-2xx status to an error
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.execute(builder).await?;
        check_status(response).await
    }

    /// Send a request, retrying rate limits and (optionally) server errors
    ///
    /// Returns the last response whatever its status; at most
    /// `MAX_RETRIES` retries follow the first attempt. A request whose body
    /// cannot be cloned (a stream) is sent exactly once.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let mut request = builder.build()?;
        let mut attempt: u32 = 0;

        loop {
            let retry_copy = if attempt < self.retry.max_retries() {
                request.try_clone()
            } else {
                None
            };
            let method = request.method().clone();
            let url = request.url().clone();

            debug!("{} {} (attempt {})", method, url, attempt + 1);
            let outcome = self.client.execute(request).await;

            let retryable = match &outcome {
                Ok(response) => self.retry.should_retry_status(response.status()),
                Err(err) => self.retry.should_retry_error(err),
            };
            let next = match retry_copy {
                Some(next) if retryable => next,
                _ => return Ok(outcome?),
            };

            attempt += 1;
            let response = outcome.as_ref().ok();
            if let Some(hook) = &self.retry_hook {
                hook(attempt, response);
            }
            let delay = self.retry.backoff(attempt, response);
            match &outcome {
                Ok(response) => warn!(
                    "{} {} returned {}, retry {}/{} in {:?}",
                    method,
                    url,
                    response.status(),
                    attempt,
                    self.retry.max_retries(),
                    delay
                ),
                Err(err) => warn!(
                    "{} {} failed: {}, retry {}/{} in {:?}",
                    method,
                    url,
                    err,
                    attempt,
                    self.retry.max_retries(),
                    delay
                ),
            }
            drop(outcome);

            tokio::time::sleep(delay).await;
            request = next;
        }
    }

    /// Send and decode a single resource document
    pub(crate) async fn read<T>(&self, builder: RequestBuilder, required: &[String]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.with_deadline(async {
            let response = self.send(builder).await?;
            let body = response.bytes().await?;
            jsonapi::decode_one(&body, required)
        })
        .await
    }

    /// Send and decode a list document with its pagination envelope
    pub(crate) async fn read_list<T>(
        &self,
        builder: RequestBuilder,
        required: &[String],
    ) -> Result<ListResponse<T>>
    where
        T: DeserializeOwned,
    {
        self.with_deadline(async {
            let response = self.send(builder).await?;
            let body = response.bytes().await?;
            jsonapi::decode_list(&body, required)
        })
        .await
    }

    /// Send a request whose response body is ignored (204 and friends)
    pub(crate) async fn send_no_content(&self, builder: RequestBuilder) -> Result<()> {
        self.with_deadline(async {
            self.send(builder).await?;
            Ok(())
        })
        .await
    }

    /// PUT raw bytes read from `reader` to `path` (relative or absolute)
    ///
    /// The reader is drained up front so the body can be replayed on retry;
    /// it is dropped before the request is sent.
    pub(crate) async fn upload<R>(&self, path: &str, mut reader: R) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;
        drop(reader);
        debug!("Uploading {} bytes to {}", body.len(), path);

        let builder = self
            .raw_request(Method::PUT, path)?
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(body);
        self.send_no_content(builder).await
    }

    /// Stream a response body into `writer`, returning the byte count
    pub(crate) async fn download<W>(&self, builder: RequestBuilder, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.with_deadline(async {
            let mut response = self.send(builder).await?;
            let mut written: u64 = 0;
            while let Some(chunk) = response.chunk().await? {
                writer.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            writer.flush().await?;
            debug!("Downloaded {} bytes", written);
            Ok(written)
        })
        .await
    }
}

/// Pass 2xx responses through; read the body of anything else into an error
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    debug!("{} returned {}: {}", url, status, body);
    Err(error_from_response(status.as_u16(), &body))
}

/// `"api/v2"` and `"/api/v2/"` both become `"/api/v2/"`
fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
impl TfeClient {
    /// Create a test client pointed at a mock server, with no retry delays
    pub fn test_client(base_url: &str) -> Self {
        let config = ClientConfig::new(base_url, "test-token")
            .retry_wait(Duration::ZERO, Duration::ZERO)
            .server_error_wait(Duration::ZERO, Duration::ZERO);
        match Self::new(config) {
            Ok(client) => client,
            Err(e) => panic!("failed to build test client: {}", e),
        }
    }
}
