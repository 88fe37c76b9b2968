/// Configuration loading and validation
///
/// The loaded [`Config`] is returned to the caller and handed to the fetcher
/// explicitly; nothing here keeps global state.
use std::path::Path;

use super::schemas::Config;
use crate::errors::FetchError;
use crate::logger::{self, LogTag};

/// Load configuration from a TOML file
///
/// A missing file yields the defaults; a file that exists but does not parse
/// or validate is an error.
pub fn load_config_from_path(path: &str) -> Result<Config, FetchError> {
    let config = if Path::new(path).exists() {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FetchError::Config(format!("Failed to read config file '{}': {}", path, e)))?;
        let config = parse_config(&contents)
            .map_err(|e| FetchError::Config(format!("Failed to parse config file '{}': {}", path, e)))?;
        logger::debug(LogTag::Config, &format!("Loaded configuration from {}", path));
        config
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        Config::default()
    };

    validate_config(&config)?;
    Ok(config)
}

/// Parse TOML contents; absent sections and keys take their defaults
pub fn parse_config(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(contents)
}

pub fn validate_config(config: &Config) -> Result<(), FetchError> {
    if config.fetcher.allowed_exchanges.iter().all(|e| e.trim().is_empty()) {
        return Err(FetchError::Config(
            "fetcher.allowed_exchanges must name at least one exchange".to_string(),
        ));
    }
    if config.coinmarketcap.timeout_seconds == 0 || config.cryptowatch.timeout_seconds == 0 {
        return Err(FetchError::Config(
            "Timeout must be greater than zero".to_string(),
        ));
    }
    if config.output.json_dir.trim().is_empty() {
        return Err(FetchError::Config("output.json_dir must not be empty".to_string()));
    }
    Ok(())
}

/// Serialize a configuration back to TOML
pub fn save_config(config: &Config, path: &str) -> Result<(), FetchError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| FetchError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
