/// OHLC candle fetcher
use super::types::{Allowance, CandleInterval, CandleSeries, Candles};
use super::MarketDataFetcher;
use crate::errors::FetchError;
use crate::logger::{self, LogTag};

/// Provider message sent once the request quota is used up
const OUT_OF_ALLOWANCE: &str = "Out of allowance";

impl MarketDataFetcher {
    /// Fetch candles for one market; `interval` is in seconds, 0 for every granularity
    ///
    /// An interval outside [`super::VALID_INTERVALS`] fails with
    /// `InvalidInput` without touching the network.
    pub async fn get_candles(&self, exchange: &str, market: &str, interval: u64) -> Candles {
        match CandleInterval::from_seconds(interval) {
            Ok(interval) => self.fetch_candles(exchange, market, interval).await,
            Err(e) => rejected(exchange, market, e),
        }
    }

    /// Same as [`Self::get_candles`] with the interval given as text, e.g. from argv
    pub async fn get_candles_str(&self, exchange: &str, market: &str, interval: &str) -> Candles {
        match CandleInterval::parse(interval) {
            Ok(interval) => self.fetch_candles(exchange, market, interval).await,
            Err(e) => rejected(exchange, market, e),
        }
    }

    async fn fetch_candles(&self, exchange: &str, market: &str, interval: CandleInterval) -> Candles {
        let mut candles = Candles::new();

        let request = self.candles.ohlc(exchange, market, interval.periods());
        let response = match self.pacer.paced(request).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    FetchError::Transport(_) => logger::error(
                        LogTag::Candles,
                        &format!("Network failure fetching {}/{}: {}", exchange, market, e),
                    ),
                    _ => logger::error(
                        LogTag::Candles,
                        &format!("Failed to fetch {}/{}: {}", exchange, market, e),
                    ),
                }
                candles.fail(&e);
                return candles;
            }
        };

        let (result, allowance) = match (response.result, response.allowance) {
            (Some(result), Some(allowance)) => (result, allowance),
            (_, allowance) => {
                let reason = response
                    .error
                    .unwrap_or_else(|| "response has no result/allowance".to_string());
                logger::error(
                    LogTag::Candles,
                    &format!("Cryptowatch rejected {}/{}: {}", exchange, market, reason),
                );

                candles.fail(&FetchError::Upstream(reason.clone()));
                candles.allowance = if reason == OUT_OF_ALLOWANCE {
                    Some(Allowance {
                        remaining: 0.0,
                        cost: None,
                    })
                } else {
                    allowance.map(|body| Allowance {
                        remaining: body.remaining,
                        cost: body.cost,
                    })
                };
                return candles;
            }
        };

        candles.allowance = Some(Allowance {
            remaining: allowance.remaining,
            cost: allowance.cost,
        });

        for (granularity, rows) in &result {
            match CandleSeries::from_rows(rows) {
                Ok(series) => {
                    logger::debug(
                        LogTag::Candles,
                        &format!("{}/{} [{}s]: {} candles", exchange, market, granularity, series.len()),
                    );
                    candles.series.insert(granularity.clone(), series);
                }
                Err(e) => {
                    logger::error(
                        LogTag::Candles,
                        &format!("Bad {}s candles for {}/{}: {}", granularity, exchange, market, e),
                    );
                    candles.fail(&e);
                    return candles;
                }
            }
        }

        logger::info(
            LogTag::Candles,
            &format!(
                "Fetched {}/{}: {} granularities, allowance remaining {}",
                exchange,
                market,
                candles.series.len(),
                allowance.remaining
            ),
        );
        candles
    }
}

fn rejected(exchange: &str, market: &str, err: FetchError) -> Candles {
    logger::error(
        LogTag::Candles,
        &format!("Rejected candle request for {}/{}: {}", exchange, market, err),
    );
    let mut candles = Candles::new();
    candles.fail(&err);
    candles
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use serde_json::json;

    use super::super::testing::*;
    use super::*;
    use crate::errors::ErrorKind;

    fn fetcher(candles: Arc<MockCandles>) -> MarketDataFetcher {
        fetcher_with(&["binance"], Arc::new(MockRanking::default()), candles)
    }

    #[tokio::test]
    async fn test_example_response_reshaped() {
        let provider = Arc::new(MockCandles::with_body(json!({
            "result": {"3600": [[1000, 10, 11, 9, 10.5, 500]]},
            "allowance": {"remaining": 100, "cost": 1}
        })));
        let candles = fetcher(provider.clone()).get_candles("Binance", "BTCUSDT", 3600).await;

        assert!(candles.success);
        assert_eq!(candles.get("3600").unwrap().open, vec![10.0]);
        assert_eq!(candles.get("3600").unwrap().close, vec![10.5]);
        assert_eq!(candles.allowance.unwrap().remaining, 100.0);
        assert_eq!(candles.allowance.unwrap().cost, Some(1.0));
        assert_eq!(
            *provider.calls.lock().unwrap(),
            vec![("Binance".to_string(), "BTCUSDT".to_string(), Some(3600))]
        );
    }

    #[tokio::test]
    async fn test_zero_interval_sends_no_periods() {
        let provider = Arc::new(MockCandles::with_body(json!({
            "result": {"60": [], "3600": []},
            "allowance": {"remaining": 99}
        })));
        let candles = fetcher(provider.clone()).get_candles("kraken", "ethusd", 0).await;

        assert!(candles.success);
        assert_eq!(provider.calls.lock().unwrap()[0].2, None);
        assert_eq!(candles.series.len(), 2);
    }

    #[tokio::test]
    async fn test_unlisted_interval_rejected_before_request() {
        let provider = Arc::new(MockCandles::default());
        let candles = fetcher(provider.clone()).get_candles("kraken", "ethusd", 42).await;

        assert!(!candles.success);
        assert_eq!(candles.error.unwrap().kind, ErrorKind::InvalidInput);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_interval_text_parsed() {
        let provider = Arc::new(MockCandles::with_body(json!({
            "result": {"300": []},
            "allowance": {"remaining": 5}
        })));
        let fetcher = fetcher(provider.clone());

        assert!(fetcher.get_candles_str("kraken", "ethusd", "300.0").await.success);
        assert!(!fetcher.get_candles_str("kraken", "ethusd", "hourly").await.success);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_result_and_allowance_fails() {
        let provider = Arc::new(MockCandles::with_body(json!({})));
        let candles = fetcher(provider).get_candles("kraken", "ethusd", 60).await;

        assert!(!candles.success);
        assert!(candles.series.is_empty());
        assert!(candles.allowance.is_none());
        assert_eq!(candles.error.unwrap().kind, ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn test_out_of_allowance_records_zero_remaining() {
        let provider = Arc::new(MockCandles::with_body(json!({"error": "Out of allowance"})));
        let candles = fetcher(provider).get_candles("kraken", "ethusd", 60).await;

        assert!(!candles.success);
        assert_eq!(candles.allowance.unwrap().remaining, 0.0);
        assert!(candles.error.unwrap().message.contains("Out of allowance"));
    }

    #[tokio::test]
    async fn test_row_count_preserved() {
        let rows: Vec<_> = (0..25)
            .map(|i| json!([60 * i, i, i + 2, i - 1, i + 1, 1000 + i]))
            .collect();
        let provider = Arc::new(MockCandles::with_body(json!({
            "result": {"60": rows},
            "allowance": {"remaining": 7.5, "cost": 0.01}
        })));
        let candles = fetcher(provider).get_candles("binance", "btcusdt", 60).await;

        let series = candles.get("60").unwrap();
        assert_eq!(series.len(), 25);
        for i in 0..25 {
            assert_eq!(series.open[i], i as f64);
            assert_eq!(series.volume[i], 1000.0 + i as f64);
        }
    }

    #[tokio::test]
    async fn test_short_row_fails_without_partial_series() {
        let provider = Arc::new(MockCandles::with_body(json!({
            "result": {"60": [[60, 1, 2, 0, 1, 10]], "300": [[300, 1, 2]]},
            "allowance": {"remaining": 10}
        })));
        let candles = fetcher(provider).get_candles("binance", "btcusdt", 0).await;

        assert!(!candles.success);
        assert!(candles.series.is_empty());
        assert_eq!(candles.error.unwrap().kind, ErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_consecutive_fetches_are_paced() {
        let provider = Arc::new(MockCandles::with_body(json!({
            "result": {"60": []},
            "allowance": {"remaining": 10}
        })));
        let fetcher = paced_fetcher_with(
            &["binance"],
            120,
            Arc::new(MockRanking::default()),
            provider.clone(),
        );

        assert!(fetcher.get_candles("binance", "btcusdt", 60).await.success);
        assert!(fetcher.get_candles("binance", "btcusdt", 60).await.success);

        let times = provider.call_times.lock().unwrap();
        assert_eq!(times.len(), 2);
        assert!(times[1].duration_since(times[0]) >= Duration::from_millis(115));
    }

    #[tokio::test]
    async fn test_rejected_interval_adds_no_pause() {
        let provider = Arc::new(MockCandles::default());
        let fetcher = paced_fetcher_with(
            &["binance"],
            300,
            Arc::new(MockRanking::default()),
            provider.clone(),
        );

        let start = Instant::now();
        fetcher.get_candles("binance", "btcusdt", 42).await;
        fetcher.get_candles("binance", "btcusdt", 43).await;

        assert_eq!(provider.call_count(), 0);
        assert!(start.elapsed() < Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_transport_and_parse_failures() {
        let provider = Arc::new(MockCandles {
            response: Some(Err("connection reset".to_string())),
            ..Default::default()
        });
        let candles = fetcher(provider).get_candles("binance", "btcusdt", 60).await;
        assert_eq!(candles.error.unwrap().kind, ErrorKind::Transport);

        let candles = fetcher(Arc::new(MockCandles::default()))
            .get_candles("binance", "btcusdt", 60)
            .await;
        assert!(!candles.success);
        assert_eq!(candles.error.unwrap().kind, ErrorKind::Parse);
    }
}
