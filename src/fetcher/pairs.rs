/// Best-pair price resolver
use super::types::{
    BestPairsResult, FilteredPairs, MarketListing, QuoteTable, RankType, RankedAsset, TimeWindow,
};
use super::MarketDataFetcher;
use crate::errors::{ErrorSummary, FetchError};
use crate::logger::{self, LogTag};

impl MarketDataFetcher {
    /// Price every (symbol, quote currency) combination once per rank/window
    ///
    /// The first listing seen for a combination decides its price; later
    /// listings with the same quote currency are skipped. Any failure stops
    /// the run and the result keeps whatever was priced before it, with
    /// `success = false` and the error recorded.
    pub async fn get_best_pairs(&self, ranked: &FilteredPairs) -> BestPairsResult {
        let mut outcome = BestPairsResult::new();

        for (rank, window, entries) in ranked.iter() {
            let table = outcome
                .result
                .entry(rank)
                .or_default()
                .entry(window)
                .or_default();

            if let Err(e) = self.price_bucket(rank, window, entries, table).await {
                logger::error(
                    LogTag::Pairs,
                    &format!("[{}/{}] Pricing aborted: {}", rank, window, e),
                );
                outcome.success = false;
                outcome.error = Some(ErrorSummary::from(&e));
                return outcome;
            }
        }

        logger::info(
            LogTag::Pairs,
            &format!("Priced {} pairs", outcome.priced_count()),
        );
        outcome
    }

    async fn price_bucket(
        &self,
        rank: RankType,
        window: TimeWindow,
        entries: &[(RankedAsset, MarketListing)],
        table: &mut QuoteTable,
    ) -> Result<(), FetchError> {
        for (asset, listing) in entries {
            // Symbol entry exists before any lookup, so an aborted run still lists it
            let quotes = table.entry(asset.symbol.clone()).or_default();
            let quote = listing.quote_currency()?;

            if quotes.contains_key(quote) {
                logger::debug(
                    LogTag::Pairs,
                    &format!(
                        "[{}/{}] {}/{} already priced, skipping {}",
                        rank, window, asset.symbol, quote, listing.source
                    ),
                );
                continue;
            }

            let price = self
                .pacer
                .paced(self.ranking.ticker(&asset.website_slug, quote))
                .await?;

            logger::debug(
                LogTag::Pairs,
                &format!(
                    "[{}/{}] {}/{} priced via {}",
                    rank, window, asset.symbol, quote, listing.source
                ),
            );

            quotes.insert(quote.to_string(), price);
        }

        Ok(())
    }
}
