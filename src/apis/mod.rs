/// External market-data providers
///
/// The fetcher talks to providers only through the traits below, so the
/// HTTP clients can be swapped for in-memory doubles.
pub mod client;
pub mod coinmarketcap;
pub mod cryptowatch;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::FetchError;
use crate::fetcher::types::MarketListing;

pub use coinmarketcap::{CoinMarketCapClient, RanksResponse};
pub use cryptowatch::{CryptowatchClient, OhlcResponse};

/// Ranking service: gainers/losers, per-asset listings, priced quotes
#[async_trait]
pub trait RankingProvider: Send + Sync {
    /// Gainers and losers for every window the provider reports
    async fn ranks(&self) -> Result<RanksResponse, FetchError>;

    /// Exchange listings for one asset
    async fn markets(&self, website_slug: &str) -> Result<Vec<MarketListing>, FetchError>;

    /// Quote object for `website_slug` converted to `convert`
    async fn ticker(&self, website_slug: &str, convert: &str) -> Result<Value, FetchError>;
}

/// Candle service: OHLC rows per granularity
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// `periods = None` omits the query parameter entirely
    async fn ohlc(
        &self,
        exchange: &str,
        market: &str,
        periods: Option<u32>,
    ) -> Result<OhlcResponse, FetchError>;
}
