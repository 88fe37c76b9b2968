/// CoinMarketCap-style ranking API client
///
/// Endpoints implemented (relative to the configured base URL):
/// 1. /gainers-losers - Top gainers and losers per window (1h, 24h, 7d)
/// 2. /currencies/{slug}/markets - Exchange listings for one asset
/// 3. /ticker/{slug}/?convert={QUOTE} - Price/volume quote in a given currency
pub mod types;

pub use self::types::{MarketsResponse, RanksResponse, TickerResponse};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;

use self::types::ProviderErrorBody;
use super::client::HttpClient;
use super::RankingProvider;
use crate::config::CoinMarketCapConfig;
use crate::errors::FetchError;
use crate::fetcher::types::MarketListing;
use crate::logger::{self, LogTag};

const API_KEY_HEADER: &str = "x-cmc_pro_api_key";

pub struct CoinMarketCapClient {
    http_client: HttpClient,
    base_url: String,
}

impl CoinMarketCapClient {
    pub fn new(config: &CoinMarketCapConfig) -> Result<Self, FetchError> {
        let http_client =
            HttpClient::with_api_key(config.timeout_seconds, API_KEY_HEADER, &config.api_key)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let start = Instant::now();

        let response = self
            .http_client
            .client()
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .send()
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
                "[COINMARKETCAP] GET {} -> {} in {}ms ({} bytes)",
                endpoint,
                status,
                start.elapsed().as_millis(),
                body.len()
            ),
        );

        if !status.is_success() {
            let message = provider_error_message(&body)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(FetchError::Upstream(format!(
                "CoinMarketCap API error {} on {}: {}",
                status, endpoint, message
            )));
        }

        serde_json::from_str::<T>(&body).map_err(|e| match provider_error_message(&body) {
            Some(message) => FetchError::Upstream(format!(
                "CoinMarketCap reported an error on {}: {}",
                endpoint, message
            )),
            None => FetchError::Parse(format!("Failed to parse {} response: {}", endpoint, e)),
        })
    }
}

fn provider_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|envelope| envelope.message())
}

#[async_trait]
impl RankingProvider for CoinMarketCapClient {
    async fn ranks(&self) -> Result<RanksResponse, FetchError> {
        logger::debug(LogTag::Api, "[COINMARKETCAP] Fetching gainers/losers");
        self.get_json("gainers-losers", &[]).await
    }

    async fn markets(&self, website_slug: &str) -> Result<Vec<MarketListing>, FetchError> {
        let endpoint = format!("currencies/{}/markets", website_slug);
        let response: MarketsResponse = self.get_json(&endpoint, &[]).await?;
        Ok(response.markets)
    }

    async fn ticker(&self, website_slug: &str, convert: &str) -> Result<Value, FetchError> {
        let endpoint = format!("ticker/{}/", website_slug);
        let response: TickerResponse = self.get_json(&endpoint, &[("convert", convert)]).await?;

        response.data.quote(convert).cloned().ok_or_else(|| {
            FetchError::Upstream(format!(
                "Ticker for {} has no {} quote",
                website_slug, convert
            ))
        })
    }
}
