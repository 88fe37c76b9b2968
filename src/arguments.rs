/// Centralized argument handling for the fetcher binary
///
/// The entry point has no required flags; everything here is optional:
/// - `--config <path>` selects the TOML configuration file
/// - `--ranks` runs the live ranking filter before pricing pairs
/// - `--candles <exchange> <market> [interval]` fetches one candle set
/// - `--debug-<tag>` / `--verbose` / `--quiet` drive the logger
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

use crate::errors::FetchError;

/// Global command-line arguments storage
/// Tests override it through [`set_cmd_args`]
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value following a flag, if any
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .filter(|value| !value.starts_with("--"))
        .cloned()
}

/// Gets up to `count` positional values following a flag
pub fn get_arg_values(flag: &str, count: usize) -> Vec<String> {
    let args = get_cmd_args();
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .iter()
            .skip(i + 1)
            .take_while(|value| !value.starts_with("--"))
            .take(count)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

pub fn config_path() -> String {
    get_arg_value("--config").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

/// Run the live ranking filter instead of reading the local ranks file
pub fn is_ranks_enabled() -> bool {
    has_arg("--ranks")
}

/// Candle request given as `--candles <exchange> <market> [interval]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandlesRequest {
    pub exchange: String,
    pub market: String,
    pub interval: String,
}

/// `Ok(None)` without `--candles`; `InvalidInput` when exchange or market is missing
pub fn candles_request() -> Result<Option<CandlesRequest>, FetchError> {
    if !has_arg("--candles") {
        return Ok(None);
    }
    let mut values = get_arg_values("--candles", 3).into_iter();
    match (values.next(), values.next()) {
        (Some(exchange), Some(market)) => Ok(Some(CandlesRequest {
            exchange,
            market,
            interval: values.next().unwrap_or_else(|| "0".to_string()),
        })),
        _ => Err(FetchError::InvalidInput(
            "--candles expects <exchange> <market> [interval]".to_string(),
        )),
    }
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// =============================================================================

pub fn is_debug_api_enabled() -> bool {
    has_arg("--debug-api")
}

pub fn is_debug_ranks_enabled() -> bool {
    has_arg("--debug-ranks")
}

pub fn is_debug_pairs_enabled() -> bool {
    has_arg("--debug-pairs")
}

pub fn is_debug_candles_enabled() -> bool {
    has_arg("--debug-candles")
}

/// Print the usage text
pub fn print_help() {
    println!("cryptobacktester - market data snapshot fetcher");
    println!();
    println!("USAGE:");
    println!("    cryptobacktester [OPTIONS]");
    println!();
    println!("With no options, prices the pairs listed in the local ranks file");
    println!("(output.test_json_path) and writes <MMDDYYYY-HHMMSS>_pairs.json.");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>                        Configuration file (default: config.toml)");
    println!("    --ranks                                Fetch live gainers/losers and dump ranks first");
    println!("    --candles <exchange> <market> [secs]   Fetch one OHLC candle set and dump it");
    println!("    --debug-<tag>                          Debug output for api|ranks|pairs|candles|snapshot|config");
    println!("    --verbose                              Show everything");
    println!("    --quiet                                Errors only");
    println!("    --no-color                             Plain console output");
    println!("    -h, --help                             Print this help");
}

/// Log which debug modes are active
pub fn print_debug_info() {
    use crate::logger::{self, LogTag};

    let enabled: Vec<&str> = [
        ("api", is_debug_api_enabled()),
        ("ranks", is_debug_ranks_enabled()),
        ("pairs", is_debug_pairs_enabled()),
        ("candles", is_debug_candles_enabled()),
    ]
    .iter()
    .filter(|(_, on)| *on)
    .map(|(name, _)| *name)
    .collect();

    if !enabled.is_empty() {
        logger::info(
            LogTag::System,
            &format!("Debug modes enabled: {}", enabled.join(", ")),
        );
    }
}
