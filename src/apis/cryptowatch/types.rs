// Response types for the candle provider

use serde::Deserialize;
use std::collections::BTreeMap;

/// `/markets/{exchange}/{market}/ohlc`
///
/// A good response carries `result` and `allowance`; a rejected one carries
/// only `error`. Every field is optional so both shapes deserialize.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OhlcResponse {
    /// granularity in seconds -> rows of `[close_time, open, high, low, close, volume, ..]`
    #[serde(default)]
    pub result: Option<BTreeMap<String, Vec<Vec<f64>>>>,
    #[serde(default)]
    pub allowance: Option<AllowanceBody>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AllowanceBody {
    pub remaining: f64,
    #[serde(default)]
    pub cost: Option<f64>,
}
