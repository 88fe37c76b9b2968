//! Structured logging for the market-data fetcher
//!
//! - Standard levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug control via `--debug-<tag>` flags
//! - Colored console output, optional file mirror
//!
//! ```rust,ignore
//! use cryptobacktester::logger::{self, LogTag};
//!
//! logger::info(LogTag::Ranks, "Filtering 1h gainers");
//! logger::debug(LogTag::Api, "GET /markets/binance/btcusdt/ohlc"); // only with --debug-api
//! ```
//!
//! Call [`init`] once at startup before anything logs.

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{
    get_logger_config, init_from_args, set_logger_config, update_logger_config, LoggerConfig,
};
pub use levels::LogLevel;
pub use tags::LogTag;

use std::path::{Path, PathBuf};

/// Initialize the logger from command-line flags
pub fn init() {
    config::init_from_args();
}

/// Mirror log output into a dated file inside `dir`
pub fn enable_file_logging(dir: &Path) -> std::io::Result<PathBuf> {
    file::init_file_logging(dir)
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (shown by default)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level, only shown when `--debug-<tag>` is set
///
/// ```rust,ignore
/// // Only shown with --debug-candles
/// logger::debug(LogTag::Candles, "periods=3600");
/// ```
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level, only shown with `--verbose` or `--verbose-<tag>`
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Flush pending file writes; call during shutdown
pub fn flush() {
    file::flush_file_logging();
}
