/// Cryptowatch-style OHLC candle API client
///
/// Endpoint implemented:
/// 1. /markets/{exchange}/{market}/ohlc[?periods={seconds}] - OHLC rows per granularity
pub mod types;

pub use self::types::{AllowanceBody, OhlcResponse};

use async_trait::async_trait;
use std::time::Instant;

use super::client::HttpClient;
use super::CandleProvider;
use crate::config::CryptowatchConfig;
use crate::errors::FetchError;
use crate::logger::{self, LogTag};

const API_KEY_HEADER: &str = "x-cw-api-key";

pub struct CryptowatchClient {
    http_client: HttpClient,
    base_url: String,
}

impl CryptowatchClient {
    pub fn new(config: &CryptowatchConfig) -> Result<Self, FetchError> {
        let http_client =
            HttpClient::with_api_key(config.timeout_seconds, API_KEY_HEADER, &config.api_key)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Path for one market's candles; exchange and market are lower-cased
    pub fn ohlc_endpoint(exchange: &str, market: &str) -> String {
        format!(
            "markets/{}/{}/ohlc",
            exchange.to_lowercase(),
            market.to_lowercase()
        )
    }

    /// Build the OHLC request without sending it
    pub fn build_ohlc_request(
        &self,
        exchange: &str,
        market: &str,
        periods: Option<u32>,
    ) -> Result<reqwest::Request, FetchError> {
        let url = format!("{}/{}", self.base_url, Self::ohlc_endpoint(exchange, market));

        let mut builder = self.http_client.client().get(&url);
        if let Some(periods) = periods {
            builder = builder.query(&[("periods", periods.to_string())]);
        }

        builder
            .build()
            .map_err(|e| FetchError::InvalidInput(format!("Invalid OHLC request URL {}: {}", url, e)))
    }
}

#[async_trait]
impl CandleProvider for CryptowatchClient {
    async fn ohlc(
        &self,
        exchange: &str,
        market: &str,
        periods: Option<u32>,
    ) -> Result<OhlcResponse, FetchError> {
        let request = self.build_ohlc_request(exchange, market, periods)?;
        let endpoint = request.url().path().to_string();

        logger::debug(
            LogTag::Api,
            &format!(
                "[CRYPTOWATCH] Fetching OHLC: exchange={}, market={}, periods={:?}",
                exchange, market, periods
            ),
        );

        let start = Instant::now();
        let response = self
            .http_client
            .client()
            .execute(request)
            .await
            .map_err(|e| FetchError::Transport(format!("Request to {} failed: {}", endpoint, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("Reading {} body failed: {}", endpoint, e)))?;

        logger::debug(
            LogTag::Api,
            &format!(
                "[CRYPTOWATCH] GET {} -> {} in {}ms ({} bytes)",
                endpoint,
                status,
                start.elapsed().as_millis(),
                body.len()
            ),
        );

        parse_ohlc_body(status, &body)
    }
}

/// Decode an OHLC body
///
/// Error envelopes are returned as data (even on non-2xx statuses) so the
/// caller can inspect `error`; only undecodable bodies become errors.
pub fn parse_ohlc_body(status: reqwest::StatusCode, body: &str) -> Result<OhlcResponse, FetchError> {
    match serde_json::from_str::<OhlcResponse>(body) {
        Ok(mut parsed) => {
            if !status.is_success() && parsed.error.is_none() {
                parsed.error = Some(format!("HTTP {}", status));
            }
            Ok(parsed)
        }
        Err(e) if status.is_success() => Err(FetchError::Parse(format!(
            "Failed to parse OHLC response: {}",
            e
        ))),
        Err(_) => Err(FetchError::Upstream(format!(
            "Cryptowatch API error {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn client() -> CryptowatchClient {
        CryptowatchClient::new(&CryptowatchConfig::default()).unwrap()
    }

    #[test]
    fn test_no_interval_omits_periods() {
        let request = client().build_ohlc_request("Binance", "BTCUSDT", None).unwrap();
        assert_eq!(request.url().path(), "/markets/binance/btcusdt/ohlc");
        assert_eq!(request.url().query(), None);
    }

    #[test]
    fn test_interval_sets_periods() {
        let request = client().build_ohlc_request("kraken", "ethusd", Some(3600)).unwrap();
        assert_eq!(request.url().query(), Some("periods=3600"));
    }

    #[test]
    fn test_parse_good_body() {
        let body = r#"{"result":{"3600":[[1000,10,11,9,10.5,500]]},"allowance":{"remaining":100,"cost":1}}"#;
        let parsed = parse_ohlc_body(StatusCode::OK, body).unwrap();
        assert_eq!(parsed.result.unwrap()["3600"][0][1], 10.0);
        assert_eq!(parsed.allowance.unwrap().remaining, 100.0);
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_error_envelope_returned_as_data() {
        let parsed =
            parse_ohlc_body(StatusCode::TOO_MANY_REQUESTS, r#"{"error":"Out of allowance"}"#).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("Out of allowance"));
        assert!(parsed.result.is_none());
    }

    #[test]
    fn test_status_recorded_when_envelope_is_silent() {
        let parsed = parse_ohlc_body(StatusCode::BAD_GATEWAY, "{}").unwrap();
        assert_eq!(parsed.error.as_deref(), Some("HTTP 502 Bad Gateway"));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let err = parse_ohlc_body(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        let err = parse_ohlc_body(StatusCode::INTERNAL_SERVER_ERROR, "<html>").unwrap_err();
        assert!(matches!(err, FetchError::Upstream(_)));
    }
}
