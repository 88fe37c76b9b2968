/// Ranking filter: gainers/losers narrowed to listings on allowed exchanges
use super::types::{RankFilterResult, RankType, TimeWindow};
use super::MarketDataFetcher;
use crate::errors::FetchError;
use crate::logger::{self, LogTag};

impl MarketDataFetcher {
    /// Fetch gainers/losers for 1h, 24h and 7d and keep every listing whose
    /// exchange is allowed
    ///
    /// A failed market lookup records the asset under `failed` for its
    /// rank/window and the batch carries on. Only a failure of the initial
    /// ranking request is returned as an error.
    pub async fn filter_markets(&self) -> Result<RankFilterResult, FetchError> {
        let ranks = self.ranking.ranks().await.map_err(|e| {
            logger::error(LogTag::Ranks, &format!("Failed to fetch gainers/losers: {}", e));
            e
        })?;

        let mut outcome = RankFilterResult::default();

        for window in TimeWindow::all() {
            logger::debug(LogTag::Ranks, &format!("bin: {}", window));

            for rank in RankType::all() {
                for asset in ranks.window(rank, window) {
                    logger::debug(
                        LogTag::Ranks,
                        &format!("[{}] mkt: {} ({})", rank, asset.symbol, asset.website_slug),
                    );

                    match self.ranking.markets(&asset.website_slug).await {
                        Ok(listings) => {
                            for listing in listings {
                                if self.is_allowed_exchange(&listing.source) {
                                    outcome
                                        .filtered
                                        .push(rank, window, (asset.clone(), listing));
                                }
                            }
                        }
                        Err(e) => {
                            logger::error(
                                LogTag::Ranks,
                                &format!(
                                    "[{}/{}] Market lookup failed for {}: {}",
                                    rank, window, asset.website_slug, e
                                ),
                            );
                            outcome.failed.push(rank, window, asset.clone());
                        }
                    }
                }
            }
        }

        logger::info(
            LogTag::Ranks,
            &format!(
                "Ranking filter done: {} listings kept, {} assets failed",
                outcome.filtered.total_len(),
                outcome.failed.total_len()
            ),
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;

    use super::super::testing::*;
    use super::super::types::{MarketListing, RankedAsset};
    use super::*;
    use crate::apis::RanksResponse;
    use crate::errors::ErrorKind;

    fn ranks(gainers_1h: &[(&str, &str)], losers_24h: &[(&str, &str)]) -> RanksResponse {
        let to_assets = |list: &[(&str, &str)]| {
            list.iter()
                .map(|(slug, symbol)| RankedAsset::new(slug, symbol))
                .collect::<Vec<_>>()
        };
        let mut gainers = BTreeMap::new();
        gainers.insert("1h".to_string(), to_assets(gainers_1h));
        let mut losers = BTreeMap::new();
        losers.insert("24h".to_string(), to_assets(losers_24h));
        RanksResponse { gainers, losers }
    }

    fn listings(entries: &[(&str, &str)]) -> Vec<MarketListing> {
        entries
            .iter()
            .map(|(source, pair)| MarketListing::new(source, pair))
            .collect()
    }

    #[tokio::test]
    async fn test_only_allowed_exchanges_kept() {
        let mut markets = HashMap::new();
        markets.insert(
            "ethereum".to_string(),
            listings(&[
                ("Binance", "ETH/BTC"),
                ("Kraken", "ETH/USD"),
                ("BITTREX", "ETH/USDT"),
                ("HitBTC", "ETH/BTC"),
            ]),
        );
        let ranking = Arc::new(MockRanking {
            ranks: Some(ranks(&[("ethereum", "ETH")], &[])),
            markets,
            ..Default::default()
        });
        let fetcher = fetcher_with(&["binance", "bittrex"], ranking, Arc::new(MockCandles::default()));

        let outcome = fetcher.filter_markets().await.unwrap();
        let kept = outcome.filtered.bucket(RankType::Gainers, TimeWindow::Hour1);

        let sources: Vec<&str> = kept.iter().map(|(_, l)| l.source.as_str()).collect();
        assert_eq!(sources, vec!["Binance", "BITTREX"]);
        for (_, _, entries) in outcome.filtered.iter() {
            for (_, listing) in entries {
                assert!(fetcher.is_allowed_exchange(&listing.source));
            }
        }
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test]
    async fn test_failed_lookup_recorded_once_and_batch_continues() {
        let mut markets = HashMap::new();
        markets.insert("bitcoin".to_string(), listings(&[("Binance", "BTC/USDT")]));
        markets.insert("litecoin".to_string(), listings(&[("Poloniex", "LTC/BTC")]));
        let ranking = Arc::new(MockRanking {
            ranks: Some(ranks(
                &[("ghostcoin", "GHST"), ("bitcoin", "BTC")],
                &[("litecoin", "LTC")],
            )),
            markets,
            ..Default::default()
        });
        let fetcher = fetcher_with(
            &["binance", "poloniex"],
            ranking.clone(),
            Arc::new(MockCandles::default()),
        );

        let outcome = fetcher.filter_markets().await.unwrap();

        let failed = outcome.failed.bucket(RankType::Gainers, TimeWindow::Hour1);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].website_slug, "ghostcoin");
        assert_eq!(outcome.failed.total_len(), 1);

        assert_eq!(outcome.filtered.bucket(RankType::Gainers, TimeWindow::Hour1).len(), 1);
        assert_eq!(outcome.filtered.bucket(RankType::Losers, TimeWindow::Hour24).len(), 1);
        assert_eq!(ranking.market_calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_every_window_present_in_output() {
        let ranking = Arc::new(MockRanking {
            ranks: Some(RanksResponse::default()),
            ..Default::default()
        });
        let fetcher = fetcher_with(&["binance"], ranking, Arc::new(MockCandles::default()));

        let outcome = fetcher.filter_markets().await.unwrap();
        let value = serde_json::to_value(&outcome.filtered).unwrap();
        for rank in ["gainers", "losers"] {
            for window in ["1h", "24h", "7d"] {
                assert_eq!(value[rank][window], serde_json::json!([]));
            }
        }
    }

    #[tokio::test]
    async fn test_ranking_failure_is_returned() {
        let fetcher = fetcher_with(
            &["binance"],
            Arc::new(MockRanking::default()),
            Arc::new(MockCandles::default()),
        );
        let err = fetcher.filter_markets().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
