/// Market-data fetcher
///
/// Three independent operations over two providers:
/// - [`MarketDataFetcher::filter_markets`]: gainers/losers narrowed to allowed exchanges
/// - [`MarketDataFetcher::get_best_pairs`]: one priced quote per (asset, quote currency)
/// - [`MarketDataFetcher::get_candles`]: OHLC rows reshaped into columns
///
/// Every call is awaited before the next one starts; the fetcher holds only
/// read-only configuration and provider handles.
pub mod candles;
pub mod pairs;
pub mod ranks;
pub mod types;

pub use types::{
    Allowance, BestPairsResult, CandleInterval, CandleSeries, Candles, FailedProducts,
    FilteredPairs, MarketListing, QuoteTable, RankBuckets, RankFilterResult, RankType,
    RankedAsset, TimeWindow, VALID_INTERVALS,
};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::apis::client::RateLimiter;
use crate::apis::{CandleProvider, CoinMarketCapClient, CryptowatchClient, RankingProvider};
use crate::config::{Config, FetcherConfig};
use crate::errors::FetchError;
use crate::logger::{self, LogTag};

pub struct MarketDataFetcher {
    allowed_exchanges: HashSet<String>,
    ranking: Arc<dyn RankingProvider>,
    candles: Arc<dyn CandleProvider>,
    /// Fixed spacing between priced-quote and candle requests
    pacer: RateLimiter,
}

impl MarketDataFetcher {
    pub fn new(
        config: &FetcherConfig,
        ranking: Arc<dyn RankingProvider>,
        candles: Arc<dyn CandleProvider>,
    ) -> Self {
        let allowed_exchanges = config
            .allowed_exchanges
            .iter()
            .map(|exchange| exchange.trim().to_lowercase())
            .filter(|exchange| !exchange.is_empty())
            .collect();

        Self {
            allowed_exchanges,
            ranking,
            candles,
            pacer: RateLimiter::new(Duration::from_millis(config.request_delay_ms)),
        }
    }

    /// Build a fetcher backed by the real HTTP clients
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let ranking = Arc::new(CoinMarketCapClient::new(&config.coinmarketcap)?);
        let candles = Arc::new(CryptowatchClient::new(&config.cryptowatch)?);

        let fetcher = Self::new(&config.fetcher, ranking, candles);
        logger::info(
            LogTag::System,
            &format!(
                "Market data fetcher ready (allowed exchanges: {})",
                fetcher.allowed_exchanges_sorted().join(", ")
            ),
        );
        Ok(fetcher)
    }

    /// Case-insensitive membership test against the allowed exchange set
    pub fn is_allowed_exchange(&self, source: &str) -> bool {
        self.allowed_exchanges.contains(&source.trim().to_lowercase())
    }

    pub fn allowed_exchanges_sorted(&self) -> Vec<String> {
        let mut exchanges: Vec<String> = self.allowed_exchanges.iter().cloned().collect();
        exchanges.sort();
        exchanges
    }

    pub fn request_delay(&self) -> Duration {
        self.pacer.min_interval()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory provider doubles shared by the fetcher tests

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Instant;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::apis::{OhlcResponse, RanksResponse};

    #[derive(Default)]
    pub struct MockRanking {
        pub ranks: Option<RanksResponse>,
        /// slug -> listings; a missing slug fails like an unknown asset
        pub markets: HashMap<String, Vec<MarketListing>>,
        /// (slug, quote) pairs whose ticker call fails
        pub failing_tickers: Vec<(String, String)>,
        /// How long each ticker call takes to answer
        pub ticker_latency: Duration,
        pub market_calls: Mutex<Vec<String>>,
        pub ticker_calls: Mutex<Vec<(String, String)>>,
        /// (start, end) of every ticker call
        pub ticker_spans: Mutex<Vec<(Instant, Instant)>>,
    }

    impl MockRanking {
        pub fn ticker_call_count(&self) -> usize {
            self.ticker_calls.lock().unwrap().len()
        }

        /// Idle time between the end of each ticker call and the start of the next
        pub fn ticker_pauses(&self) -> Vec<Duration> {
            let spans = self.ticker_spans.lock().unwrap();
            spans
                .windows(2)
                .map(|pair| pair[1].0.duration_since(pair[0].1))
                .collect()
        }
    }

    #[async_trait]
    impl RankingProvider for MockRanking {
        async fn ranks(&self) -> Result<RanksResponse, FetchError> {
            self.ranks
                .clone()
                .ok_or_else(|| FetchError::Transport("connection refused".to_string()))
        }

        async fn markets(&self, website_slug: &str) -> Result<Vec<MarketListing>, FetchError> {
            self.market_calls.lock().unwrap().push(website_slug.to_string());
            self.markets
                .get(website_slug)
                .cloned()
                .ok_or_else(|| FetchError::Upstream(format!("id not found: {}", website_slug)))
        }

        async fn ticker(&self, website_slug: &str, convert: &str) -> Result<Value, FetchError> {
            let started = Instant::now();
            if !self.ticker_latency.is_zero() {
                tokio::time::sleep(self.ticker_latency).await;
            }
            self.ticker_spans.lock().unwrap().push((started, Instant::now()));
            self.ticker_calls
                .lock()
                .unwrap()
                .push((website_slug.to_string(), convert.to_string()));
            let key = (website_slug.to_string(), convert.to_string());
            if self.failing_tickers.contains(&key) {
                return Err(FetchError::Transport("read timed out".to_string()));
            }
            Ok(json!({"price": 1.5, "volume_24h": 1000.0, "quote": convert}))
        }
    }

    #[derive(Default)]
    pub struct MockCandles {
        pub response: Option<Result<OhlcResponse, String>>,
        pub calls: Mutex<Vec<(String, String, Option<u32>)>>,
        pub call_times: Mutex<Vec<Instant>>,
    }

    impl MockCandles {
        pub fn with_body(body: Value) -> Self {
            Self {
                response: Some(Ok(serde_json::from_value(body).unwrap())),
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CandleProvider for MockCandles {
        async fn ohlc(
            &self,
            exchange: &str,
            market: &str,
            periods: Option<u32>,
        ) -> Result<OhlcResponse, FetchError> {
            self.call_times.lock().unwrap().push(Instant::now());
            self.calls
                .lock()
                .unwrap()
                .push((exchange.to_string(), market.to_string(), periods));
            match &self.response {
                Some(Ok(response)) => Ok(response.clone()),
                Some(Err(message)) => Err(FetchError::Transport(message.clone())),
                None => Err(FetchError::Parse("expected value at line 1 column 1".to_string())),
            }
        }
    }

    pub fn fetcher_with(
        exchanges: &[&str],
        ranking: Arc<MockRanking>,
        candles: Arc<MockCandles>,
    ) -> MarketDataFetcher {
        paced_fetcher_with(exchanges, 0, ranking, candles)
    }

    pub fn paced_fetcher_with(
        exchanges: &[&str],
        request_delay_ms: u64,
        ranking: Arc<MockRanking>,
        candles: Arc<MockCandles>,
    ) -> MarketDataFetcher {
        let config = FetcherConfig {
            allowed_exchanges: exchanges.iter().map(|e| e.to_string()).collect(),
            request_delay_ms,
        };
        MarketDataFetcher::new(&config, ranking, candles)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_allowed_exchanges_are_case_insensitive() {
        let fetcher = fetcher_with(
            &["Binance", " GDAX ", ""],
            Arc::new(MockRanking::default()),
            Arc::new(MockCandles::default()),
        );
        assert!(fetcher.is_allowed_exchange("binance"));
        assert!(fetcher.is_allowed_exchange("BINANCE"));
        assert!(fetcher.is_allowed_exchange("gdax"));
        assert!(!fetcher.is_allowed_exchange("kraken"));
        assert_eq!(fetcher.allowed_exchanges_sorted(), vec!["binance", "gdax"]);
    }

    #[test]
    fn test_default_delay_from_config() {
        let config = Config::default();
        let fetcher = MarketDataFetcher::new(
            &config.fetcher,
            Arc::new(MockRanking::default()),
            Arc::new(MockCandles::default()),
        );
        assert_eq!(fetcher.request_delay(), Duration::from_secs(2));
    }
}
