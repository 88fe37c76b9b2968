// Response types for the ranking provider

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::fetcher::types::{MarketListing, RankType, RankedAsset, TimeWindow};

/// `/gainers-losers`: window name -> assets, for each rank type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RanksResponse {
    #[serde(default)]
    pub gainers: BTreeMap<String, Vec<RankedAsset>>,
    #[serde(default)]
    pub losers: BTreeMap<String, Vec<RankedAsset>>,
}

impl RanksResponse {
    /// Assets for one rank type and window; missing windows read as empty
    pub fn window(&self, rank: RankType, window: TimeWindow) -> &[RankedAsset] {
        let lists = match rank {
            RankType::Gainers => &self.gainers,
            RankType::Losers => &self.losers,
        };
        lists
            .get(window.as_str())
            .map(|assets| assets.as_slice())
            .unwrap_or(&[])
    }
}

/// `/currencies/{slug}/markets`
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
    pub markets: Vec<MarketListing>,
}

/// `/ticker/{slug}/?convert=X`
#[derive(Debug, Clone, Deserialize)]
pub struct TickerResponse {
    pub data: TickerData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerData {
    #[serde(default)]
    pub quotes: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TickerData {
    /// Quote for `currency`, falling back to a case-insensitive match
    pub fn quote(&self, currency: &str) -> Option<&Value> {
        self.quotes.get(currency).or_else(|| {
            self.quotes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(currency))
                .map(|(_, quote)| quote)
        })
    }
}

/// Error envelope some endpoints return instead of data
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<ProviderStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderStatus {
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ProviderErrorBody {
    pub fn message(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        let status = self.status.as_ref()?;
        let message = status.error_message.clone()?;
        Some(match status.error_code {
            Some(code) => format!("{} (code {})", message, code),
            None => message,
        })
    }
}
