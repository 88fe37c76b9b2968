use std::path::Path;

use anyhow::{Context, Result};

use cryptobacktester::{
    arguments::{self, candles_request, is_help_requested, is_ranks_enabled, print_debug_info, print_help},
    config::{self, Config},
    errors::ErrorKind,
    fetcher::{FilteredPairs, MarketDataFetcher},
    logger::{self, LogTag},
    paths,
    snapshot::{self, SnapshotKind},
};

/// Entry point for the snapshot fetcher
///
/// Modes, checked in order:
/// - `--candles <exchange> <market> [interval]`: one candle set -> `_candles.json`
/// - `--ranks`: live ranking filter -> `_ranks.json` + `_failed.json`, then price them
/// - default: price the pairs in the local ranks file -> `_pairs.json`
#[tokio::main]
async fn main() {
    logger::init();

    if is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, "cryptobacktester starting up");
    print_debug_info();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            logger::error(LogTag::System, &format!("{:#}", e));
            1
        }
    };

    logger::info(LogTag::System, "Exiting.");
    logger::flush();
    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let config_path = arguments::config_path();
    let config = config::load_config_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let json_dir = Path::new(&config.output.json_dir);
    paths::ensure_directory(json_dir)
        .with_context(|| format!("Failed to create output directory {}", json_dir.display()))?;

    if config.output.write_log_file {
        match logger::enable_file_logging(json_dir) {
            Ok(path) => logger::info(LogTag::System, &format!("Logging to {}", path.display())),
            Err(e) => logger::warning(LogTag::System, &format!("File logging disabled: {}", e)),
        }
    }

    let fetcher = MarketDataFetcher::from_config(&config).context("Failed to build market data fetcher")?;
    let timestamp = paths::snapshot_timestamp();

    let candles = match candles_request() {
        Ok(request) => request,
        Err(e) => {
            logger::error(LogTag::System, &e.to_string());
            return Ok(1);
        }
    };

    if let Some(request) = candles {
        let candles = fetcher
            .get_candles_str(&request.exchange, &request.market, &request.interval)
            .await;

        if let Some(error) = candles.error.as_ref().filter(|e| e.kind == ErrorKind::InvalidInput) {
            logger::error(LogTag::Candles, &error.message);
            return Ok(1);
        }

        snapshot::write_snapshot(json_dir, &timestamp, SnapshotKind::Candles, &candles)
            .await
            .context("Failed to write candles snapshot")?;
        logger::info(LogTag::System, "Done.");
        return Ok(0);
    }

    let ranked = if is_ranks_enabled() {
        fetch_ranks(&fetcher, json_dir, &timestamp).await?
    } else {
        load_ranks(&config).await?
    };

    let best_pairs = fetcher.get_best_pairs(&ranked).await;
    if !best_pairs.success {
        logger::warning(
            LogTag::Pairs,
            &format!(
                "Best pairs incomplete, writing {} priced pairs",
                best_pairs.priced_count()
            ),
        );
    }

    logger::info(LogTag::System, "Dumping best pairs data to json file.");
    snapshot::write_snapshot(json_dir, &timestamp, SnapshotKind::Pairs, &best_pairs)
        .await
        .context("Failed to write pairs snapshot")?;

    logger::info(LogTag::System, "Done.");
    Ok(0)
}

async fn fetch_ranks(fetcher: &MarketDataFetcher, json_dir: &Path, timestamp: &str) -> Result<FilteredPairs> {
    let outcome = fetcher
        .filter_markets()
        .await
        .context("Failed to fetch gainers/losers")?;

    snapshot::write_snapshot(json_dir, timestamp, SnapshotKind::Ranks, &outcome.filtered)
        .await
        .context("Failed to write ranks snapshot")?;
    snapshot::write_snapshot(json_dir, timestamp, SnapshotKind::Failed, &outcome.failed)
        .await
        .context("Failed to write failed-products snapshot")?;

    Ok(outcome.filtered)
}

async fn load_ranks(config: &Config) -> Result<FilteredPairs> {
    let path = Path::new(&config.output.test_json_path);
    snapshot::read_ranked_products(path)
        .await
        .with_context(|| format!("Failed to read ranked products from {}", path.display()))
}
