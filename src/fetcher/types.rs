// Core types for the market-data fetcher

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{ErrorSummary, FetchError};

/// Rank classification reported by the ranking provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankType {
    Gainers,
    Losers,
}

impl RankType {
    pub fn all() -> [RankType; 2] {
        [RankType::Gainers, RankType::Losers]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankType::Gainers => "gainers",
            RankType::Losers => "losers",
        }
    }
}

impl fmt::Display for RankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price-change windows the ranking provider reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "24h")]
    Hour24,
    #[serde(rename = "7d")]
    Day7,
}

impl TimeWindow {
    /// Windows in processing order
    pub fn all() -> [TimeWindow; 3] {
        [TimeWindow::Hour1, TimeWindow::Hour24, TimeWindow::Day7]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Hour1 => "1h",
            TimeWindow::Hour24 => "24h",
            TimeWindow::Day7 => "7d",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Asset record from a gainers/losers list
///
/// Only `website_slug` and `symbol` are interpreted; every other upstream
/// field is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAsset {
    pub website_slug: String,
    pub symbol: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RankedAsset {
    pub fn new(website_slug: &str, symbol: &str) -> Self {
        Self {
            website_slug: website_slug.to_string(),
            symbol: symbol.to_string(),
            extra: Map::new(),
        }
    }
}

/// One exchange listing of an asset, e.g. `source = "Binance"`, `pair = "ETH/BTC"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketListing {
    pub source: String,
    pub pair: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MarketListing {
    pub fn new(source: &str, pair: &str) -> Self {
        Self {
            source: source.to_string(),
            pair: pair.to_string(),
            extra: Map::new(),
        }
    }

    pub fn base_currency(&self) -> &str {
        self.pair.split('/').next().unwrap_or_default()
    }

    /// Second token of the pair string
    pub fn quote_currency(&self) -> Result<&str, FetchError> {
        self.pair
            .split('/')
            .nth(1)
            .filter(|quote| !quote.is_empty())
            .ok_or_else(|| {
                FetchError::Parse(format!(
                    "Pair '{}' on {} has no quote currency",
                    self.pair, self.source
                ))
            })
    }
}

/// rank type -> time window -> ordered entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankBuckets<T>(pub BTreeMap<RankType, BTreeMap<TimeWindow, Vec<T>>>);

impl<T> RankBuckets<T> {
    /// Every rank type and window present, all empty
    pub fn new() -> Self {
        let mut buckets = BTreeMap::new();
        for rank in RankType::all() {
            let windows = TimeWindow::all()
                .into_iter()
                .map(|window| (window, Vec::new()))
                .collect();
            buckets.insert(rank, windows);
        }
        Self(buckets)
    }

    pub fn bucket(&self, rank: RankType, window: TimeWindow) -> &[T] {
        self.0
            .get(&rank)
            .and_then(|windows| windows.get(&window))
            .map(|entries| entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn push(&mut self, rank: RankType, window: TimeWindow, entry: T) {
        self.0
            .entry(rank)
            .or_default()
            .entry(window)
            .or_default()
            .push(entry);
    }

    /// Iterate buckets in rank/window order
    pub fn iter(&self) -> impl Iterator<Item = (RankType, TimeWindow, &[T])> {
        self.0.iter().flat_map(|(rank, windows)| {
            windows
                .iter()
                .map(move |(window, entries)| (*rank, *window, entries.as_slice()))
        })
    }

    pub fn total_len(&self) -> usize {
        self.iter().map(|(_, _, entries)| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }
}

impl<T> Default for RankBuckets<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Listings kept because their exchange is allowed
pub type FilteredPairs = RankBuckets<(RankedAsset, MarketListing)>;

/// Assets whose market lookup failed
pub type FailedProducts = RankBuckets<RankedAsset>;

/// Output of the ranking filter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankFilterResult {
    pub filtered: FilteredPairs,
    pub failed: FailedProducts,
}

/// asset symbol -> quote currency -> raw quote object
pub type QuoteTable = BTreeMap<String, BTreeMap<String, Value>>;

/// Priced pairs, possibly partial when `success` is false
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPairsResult {
    pub success: bool,
    pub result: BTreeMap<RankType, BTreeMap<TimeWindow, QuoteTable>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
}

impl BestPairsResult {
    pub fn new() -> Self {
        Self {
            success: true,
            result: BTreeMap::new(),
            error: None,
        }
    }

    pub fn quote(&self, rank: RankType, window: TimeWindow, symbol: &str, quote: &str) -> Option<&Value> {
        self.result
            .get(&rank)?
            .get(&window)?
            .get(symbol)?
            .get(quote)
    }

    /// Number of priced (symbol, quote) entries across all buckets
    pub fn priced_count(&self) -> usize {
        self.result
            .values()
            .flat_map(|windows| windows.values())
            .flat_map(|table| table.values())
            .map(|quotes| quotes.len())
            .sum()
    }
}

impl Default for BestPairsResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Granularities accepted by the candle provider, in seconds
pub const VALID_INTERVALS: [u32; 13] = [
    60, 180, 300, 900, 1800, 3600, 7200, 14400, 21600, 43200, 86400, 259200, 604800,
];

/// Candle granularity; `None` asks the provider for every granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandleInterval(Option<u32>);

impl CandleInterval {
    pub const ALL: CandleInterval = CandleInterval(None);

    /// 0 means "no interval"; anything else must be a listed granularity
    pub fn from_seconds(seconds: u64) -> Result<Self, FetchError> {
        if seconds == 0 {
            return Ok(Self::ALL);
        }
        VALID_INTERVALS
            .iter()
            .copied()
            .find(|valid| u64::from(*valid) == seconds)
            .map(|valid| CandleInterval(Some(valid)))
            .ok_or_else(|| {
                FetchError::InvalidInput(format!(
                    "Invalid candle interval {}s, expected 0 or one of {:?}",
                    seconds, VALID_INTERVALS
                ))
            })
    }

    /// Accepts integer or fractional seconds, rounded to the nearest second
    pub fn parse(value: &str) -> Result<Self, FetchError> {
        let seconds: f64 = value.trim().parse().map_err(|_| {
            FetchError::InvalidInput(format!("Candle interval '{}' is not a number", value))
        })?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(FetchError::InvalidInput(format!(
                "Candle interval '{}' must be a non-negative number",
                value
            )));
        }
        Self::from_seconds(seconds.round() as u64)
    }

    /// Value for the `periods` query parameter, if any
    pub fn periods(&self) -> Option<u32> {
        self.0
    }
}

/// Provider quota as reported alongside candle data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allowance {
    pub remaining: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Column-oriented candles for one granularity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandleSeries {
    pub close_time: Vec<f64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl CandleSeries {
    /// Reshape `[close_time, open, high, low, close, volume, ..]` rows into columns
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, FetchError> {
        let mut series = CandleSeries {
            close_time: Vec::with_capacity(rows.len()),
            open: Vec::with_capacity(rows.len()),
            high: Vec::with_capacity(rows.len()),
            low: Vec::with_capacity(rows.len()),
            close: Vec::with_capacity(rows.len()),
            volume: Vec::with_capacity(rows.len()),
        };

        for (index, row) in rows.iter().enumerate() {
            if row.len() < 6 {
                return Err(FetchError::Parse(format!(
                    "Candle row {} has {} columns, expected at least 6",
                    index,
                    row.len()
                )));
            }
            series.close_time.push(row[0]);
            series.open.push(row[1]);
            series.high.push(row[2]);
            series.low.push(row[3]);
            series.close.push(row[4]);
            series.volume.push(row[5]);
        }

        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.close_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close_time.is_empty()
    }
}

/// Candle fetch outcome; granularity keys sit next to `success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candles {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowance: Option<Allowance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
    #[serde(flatten)]
    pub series: BTreeMap<String, CandleSeries>,
}

impl Candles {
    pub fn new() -> Self {
        Self {
            success: true,
            allowance: None,
            error: None,
            series: BTreeMap::new(),
        }
    }

    pub fn get(&self, granularity: &str) -> Option<&CandleSeries> {
        self.series.get(granularity)
    }

    /// Mark failed, dropping any partially parsed series
    pub(crate) fn fail(&mut self, err: &FetchError) {
        self.success = false;
        self.series.clear();
        self.error = Some(ErrorSummary::from(err));
    }
}

impl Default for Candles {
    fn default() -> Self {
        Self::new()
    }
}
