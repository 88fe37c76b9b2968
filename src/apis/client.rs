/// Base HTTP client with fixed request pacing
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::errors::FetchError;

/// Enforces a fixed pause between consecutive requests
///
/// The pause is measured from the end of the previous request, so a slow
/// response never eats into it. The first request goes out immediately.
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until `min_interval` has passed since the last request finished
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if !self.min_interval.is_zero() {
            if let Some(last_time) = *last {
                let elapsed = last_time.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
        }

        *last = Some(Instant::now());
    }

    /// Record that the request started by the last [`acquire`](Self::acquire) has finished
    pub async fn mark_done(&self) {
        *self.last_request.lock().await = Some(Instant::now());
    }

    /// Run one request inside the pacing window
    pub async fn paced<F>(&self, request: F) -> F::Output
    where
        F: Future,
    {
        self.acquire().await;
        let output = request.await;
        self.mark_done().await;
        output
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// HTTP client wrapper with timeout and default headers
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Build a client that sends `api_key` under `header` when the key is set
    pub fn with_api_key(timeout_secs: u64, header: &'static str, api_key: &str) -> Result<Self, FetchError> {
        if timeout_secs == 0 {
            return Err(FetchError::Config(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        if !api_key.is_empty() {
            let value = HeaderValue::from_str(api_key)
                .map_err(|e| FetchError::Config(format!("Invalid API key header value: {}", e)))?;
            headers.insert(HeaderName::from_static(header), value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_second_acquire_waits_for_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(80));
        limiter.acquire().await;
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(70));
    }

    #[tokio::test]
    async fn test_pause_counts_from_request_end() {
        let limiter = RateLimiter::new(Duration::from_millis(60));

        let finished = limiter
            .paced(async {
                tokio::time::sleep(Duration::from_millis(80)).await;
                Instant::now()
            })
            .await;
        let started = limiter.paced(async { Instant::now() }).await;

        assert!(started.duration_since(finished) >= Duration::from_millis(55));
    }

    #[test]
    fn test_api_key_header_value_must_be_visible_ascii() {
        assert!(matches!(
            HttpClient::with_api_key(5, "x-cw-api-key", "bad\nkey"),
            Err(FetchError::Config(_))
        ));
    }

    #[test]
    fn test_zero_interval_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        assert!(limiter.min_interval().is_zero());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(matches!(
            HttpClient::with_api_key(0, "x-cw-api-key", ""),
            Err(FetchError::Config(_))
        ));
    }

    #[test]
    fn test_api_key_header_is_optional() {
        assert!(HttpClient::with_api_key(5, "x-cw-api-key", "").is_ok());
        assert!(HttpClient::with_api_key(5, "x-cw-api-key", "secret").is_ok());
    }
}
