/// Configuration schemas - every section declared once with its defaults
use crate::config_struct;

// ============================================================================
// FETCHER
// ============================================================================

config_struct! {
    /// Ranking filter and pair resolver settings
    pub struct FetcherConfig {
        /// Exchanges whose listings are kept (matched case-insensitively)
        allowed_exchanges: Vec<String> = vec![
            "binance".to_string(),
            "bittrex".to_string(),
            "gdax".to_string(),
            "poloniex".to_string(),
        ],
        /// Fixed pause between consecutive provider calls
        request_delay_ms: u64 = 2000,
    }
}

// ============================================================================
// PROVIDERS
// ============================================================================

config_struct! {
    /// Ranking provider (gainers/losers, market listings, ticker quotes)
    pub struct CoinMarketCapConfig {
        base_url: String = "https://api.coinmarketcap.com/v2".to_string(),
        /// Sent as X-CMC_PRO_API_KEY when non-empty
        api_key: String = String::new(),
        timeout_seconds: u64 = 20,
    }
}

config_struct! {
    /// Candle provider (OHLC time series)
    pub struct CryptowatchConfig {
        base_url: String = "https://api.cryptowat.ch".to_string(),
        /// Sent as X-CW-API-Key when non-empty
        api_key: String = String::new(),
        timeout_seconds: u64 = 10,
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

config_struct! {
    /// Snapshot output settings
    pub struct OutputConfig {
        /// Directory receiving the timestamped JSON snapshots
        json_dir: String = "json".to_string(),
        /// Previously dumped ranks file priced by the default run
        test_json_path: String = "test.json".to_string(),
        /// Mirror log lines into json_dir/fetcher_<date>.log
        write_log_file: bool = false,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration passed to the fetcher at construction
    pub struct Config {
        fetcher: FetcherConfig = FetcherConfig::default(),
        coinmarketcap: CoinMarketCapConfig = CoinMarketCapConfig::default(),
        cryptowatch: CryptowatchConfig = CryptowatchConfig::default(),
        output: OutputConfig = OutputConfig::default(),
    }
}
