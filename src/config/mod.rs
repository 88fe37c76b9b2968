/// Configuration: TOML schemas with embedded defaults plus a loader
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{Config, CoinMarketCapConfig, CryptowatchConfig, FetcherConfig, OutputConfig};
pub use utils::{load_config_from_path, parse_config, save_config, validate_config};
