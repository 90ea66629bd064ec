//! Retry policy and backoff for the request executor

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::{Response, StatusCode};

use crate::config::retry;

/// Called before every retry with the retry number (1-based) and the
/// response that triggered it. Transport failures pass `None`.
pub type RetryHook = Arc<dyn Fn(u32, Option<&Response>) + Send + Sync>;

/// Decides which outcomes are retried and how long to wait in between
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry 5xx responses and failed connection attempts
    pub retry_server_errors: bool,
    /// Backoff window for 429/425
    pub wait: (Duration, Duration),
    /// Backoff window for server errors, scaled by the retry number
    pub server_error_wait: (Duration, Duration),
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_server_errors: false,
            wait: (retry::WAIT_MIN, retry::WAIT_MAX),
            server_error_wait: (retry::SERVER_ERROR_WAIT_MIN, retry::SERVER_ERROR_WAIT_MAX),
        }
    }
}

impl RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub fn max_retries(&self) -> u32 {
        retry::MAX_RETRIES
    }

    /// Whether a response with this status should be retried
    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        match status.as_u16() {
            429 | 425 => true,
            s if s >= 500 => self.retry_server_errors,
            _ => false,
        }
    }

    /// Whether a failed attempt (no response at all) should be retried
    pub fn should_retry_error(&self, err: &reqwest::Error) -> bool {
        self.retry_server_errors && (err.is_connect() || err.is_timeout())
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32, response: Option<&Response>) -> Duration {
        let status = response.map(|r| r.status().as_u16());
        match status {
            Some(429) | Some(425) => {
                let reset = response.and_then(rate_limit_reset);
                rate_limit_backoff(self.wait.0, self.wait.1, reset)
            }
            _ => linear_jitter_backoff(self.server_error_wait.0, self.server_error_wait.1, attempt),
        }
    }
}

/// Seconds until the rate limit resets, from `X-RateLimit-Reset`
fn rate_limit_reset(response: &Response) -> Option<Duration> {
    let value = response
        .headers()
        .get(retry::RATE_LIMIT_RESET_HEADER)?
        .to_str()
        .ok()?;
    let seconds: f64 = value.trim().parse().ok()?;
    if seconds.is_finite() && seconds > 0.0 {
        Some(Duration::from_secs_f64(seconds.min(retry::MAX_BACKOFF.as_secs_f64())))
    } else {
        None
    }
}

/// `min + jitter(max - min)`, where `min` is raised to the server's reset hint
pub(crate) fn rate_limit_backoff(min: Duration, max: Duration, reset: Option<Duration>) -> Duration {
    let jitter = jitter(max.saturating_sub(min));
    let floor = match reset {
        Some(reset) if reset > min => reset,
        _ => min,
    };
    (floor + jitter).min(retry::MAX_BACKOFF)
}

/// Uniformly random delay in `[min * attempt, max * attempt]`
pub(crate) fn linear_jitter_backoff(min: Duration, max: Duration, attempt: u32) -> Duration {
    let attempt = attempt.max(1);
    let low = min.saturating_mul(attempt);
    let high = max.saturating_mul(attempt);
    (low + jitter(high.saturating_sub(low))).min(retry::MAX_BACKOFF)
}

fn jitter(span: Duration) -> Duration {
    if span.is_zero() {
        return Duration::ZERO;
    }
    let factor: f64 = rand::thread_rng().gen_range(0.0..=1.0);
    span.mul_f64(factor)
}
