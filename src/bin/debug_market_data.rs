/// Market data debug tool
///
/// Hits the live ranking and candle endpoints through the crate's own clients
/// and prints timings and response shapes.
use clap::Parser;
use colored::Colorize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use cryptobacktester::apis::{
    CandleProvider, CoinMarketCapClient, CryptowatchClient, RankingProvider,
};
use cryptobacktester::config::{self, Config};
use cryptobacktester::fetcher::{CandleInterval, CandleSeries, MarketDataFetcher, RankType, TimeWindow};
use cryptobacktester::logger;
use cryptobacktester::snapshot;

#[derive(Parser, Debug)]
#[command(name = "debug_market_data")]
#[command(about = "Debug and test the ranking and candle provider endpoints")]
struct Args {
    /// Test all endpoints
    #[arg(long)]
    all: bool,

    /// Test the gainers/losers endpoint
    #[arg(long)]
    ranks: bool,

    /// Test the per-asset markets endpoint
    #[arg(long)]
    markets: bool,

    /// Test the ticker endpoint
    #[arg(long)]
    ticker: bool,

    /// Test the OHLC endpoint
    #[arg(long)]
    candles: bool,

    /// Run the full ranking filter (slow: one request per ranked asset)
    #[arg(long)]
    filter: bool,

    /// Verbose output (show response bodies)
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Asset slug for markets/ticker
    #[arg(long, default_value = "ethereum")]
    slug: String,

    /// Quote currency for the ticker
    #[arg(long, default_value = "BTC")]
    convert: String,

    /// Exchange for candles
    #[arg(long, default_value = "binance")]
    exchange: String,

    /// Market for candles
    #[arg(long, default_value = "btcusdt")]
    market: String,

    /// Candle interval in seconds (0 = all granularities)
    #[arg(long, default_value = "3600")]
    interval: u64,

    /// Print the structure of an existing snapshot file and exit
    #[arg(long)]
    inspect: Option<PathBuf>,

    /// Write the default configuration to this path and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    logger::init();
    if args.verbose {
        logger::update_logger_config(|config| {
            config.debug_tags.insert("api".to_string());
            config.min_level = config.min_level.max(logger::LogLevel::Debug);
        });
    }

    println!("\n{}", "Market Data Debug Tool".bold().green());
    println!("{}", "=".repeat(60).green());

    if let Some(path) = &args.write_default_config {
        match config::save_config(&Config::default(), &path.to_string_lossy()) {
            Ok(()) => println!("  {} Wrote {}", "✓".green(), path.display()),
            Err(e) => println!("  {} {}", "❌".red(), e),
        }
        return;
    }

    if let Some(path) = &args.inspect {
        inspect_snapshot(path, &args).await;
        return;
    }

    let config = match config::load_config_from_path(&args.config) {
        Ok(config) => config,
        Err(e) => {
            println!("  {} {}", "❌".red(), e);
            return;
        }
    };

    println!("Ranking API: {}", config.coinmarketcap.base_url.yellow());
    println!("Candle API:  {}\n", config.cryptowatch.base_url.yellow());

    let test_all = args.all || (!args.ranks && !args.markets && !args.ticker && !args.candles && !args.filter);

    let ranking = match CoinMarketCapClient::new(&config.coinmarketcap) {
        Ok(client) => client,
        Err(e) => {
            println!("  {} {}", "❌".red(), e);
            return;
        }
    };

    if test_all || args.ranks {
        test_ranks(&ranking, &args).await;
    }

    if test_all || args.markets {
        test_markets(&ranking, &args).await;
    }

    if test_all || args.ticker {
        test_ticker(&ranking, &args).await;
    }

    if test_all || args.candles {
        match CryptowatchClient::new(&config.cryptowatch) {
            Ok(client) => test_candles(&client, &args).await,
            Err(e) => println!("  {} {}", "❌".red(), e),
        }
    }

    if args.filter {
        test_filter(&config).await;
    }

    println!("\n{}", "✅ Debug session complete".bold().green());
}

/// GET /gainers-losers
async fn test_ranks(client: &CoinMarketCapClient, args: &Args) {
    print_test_header("Gainers/Losers", "/gainers-losers");

    let start = Instant::now();
    match client.ranks().await {
        Ok(ranks) => {
            print_timing(start.elapsed());
            for rank in RankType::all() {
                for window in TimeWindow::all() {
                    let assets = ranks.window(rank, window);
                    println!(
                        "  {} {}",
                        format!("{} {}:", rank, window).cyan(),
                        assets.len().to_string().green().bold()
                    );
                    if args.verbose {
                        for asset in assets.iter().take(5) {
                            println!("    {} ({})", asset.symbol, asset.website_slug.bright_black());
                        }
                    }
                }
            }
        }
        Err(e) => print_failure(start.elapsed(), &e.to_string()),
    }
    println!();
}

/// GET /currencies/{slug}/markets
async fn test_markets(client: &CoinMarketCapClient, args: &Args) {
    print_test_header("Markets", &format!("/currencies/{}/markets", args.slug));

    let start = Instant::now();
    match client.markets(&args.slug).await {
        Ok(listings) => {
            print_timing(start.elapsed());
            println!("  {} {}", "Listings:".cyan(), listings.len().to_string().green().bold());
            let shown = if args.verbose { listings.len() } else { 10 };
            for listing in listings.iter().take(shown) {
                let quote = listing.quote_currency().unwrap_or("?");
                println!(
                    "    {:<16} {:<14} base={} quote={}",
                    listing.source,
                    listing.pair,
                    listing.base_currency(),
                    quote.yellow()
                );
            }
        }
        Err(e) => print_failure(start.elapsed(), &e.to_string()),
    }
    println!();
}

/// GET /ticker/{slug}/?convert={QUOTE}
async fn test_ticker(client: &CoinMarketCapClient, args: &Args) {
    print_test_header(
        "Ticker",
        &format!("/ticker/{}/?convert={}", args.slug, args.convert),
    );

    let start = Instant::now();
    match client.ticker(&args.slug, &args.convert).await {
        Ok(quote) => {
            print_timing(start.elapsed());
            print_json_structure(&quote, 2);
            if args.verbose {
                println!("  {}", quote);
            }
        }
        Err(e) => print_failure(start.elapsed(), &e.to_string()),
    }
    println!();
}

/// GET /markets/{exchange}/{market}/ohlc
async fn test_candles(client: &CryptowatchClient, args: &Args) {
    let endpoint = format!("/{}", CryptowatchClient::ohlc_endpoint(&args.exchange, &args.market));
    print_test_header("OHLC", &endpoint);

    let interval = match CandleInterval::from_seconds(args.interval) {
        Ok(interval) => interval,
        Err(e) => {
            println!("  {} {}", "❌".red(), e);
            return;
        }
    };

    let start = Instant::now();
    match client.ohlc(&args.exchange, &args.market, interval.periods()).await {
        Ok(response) => {
            print_timing(start.elapsed());
            if let Some(allowance) = response.allowance {
                println!(
                    "  {} remaining={} cost={:?}",
                    "Allowance:".cyan(),
                    allowance.remaining,
                    allowance.cost
                );
            }
            if let Some(error) = &response.error {
                println!("  {} {}", "Provider error:".red(), error);
            }
            for (granularity, rows) in response.result.iter().flatten() {
                match CandleSeries::from_rows(rows) {
                    Ok(series) => {
                        println!(
                            "  {} {} candles",
                            format!("{:>7}s:", granularity).cyan(),
                            series.len().to_string().green()
                        );
                        if args.verbose && !series.is_empty() {
                            let last = series.len() - 1;
                            println!(
                                "    last: t={} o={} h={} l={} c={} v={}",
                                series.close_time[last],
                                series.open[last],
                                series.high[last],
                                series.low[last],
                                series.close[last],
                                series.volume[last]
                            );
                        }
                    }
                    Err(e) => println!("  {} {}s: {}", "⚠️".yellow(), granularity, e),
                }
            }
        }
        Err(e) => print_failure(start.elapsed(), &e.to_string()),
    }
    println!();
}

async fn test_filter(config: &Config) {
    print_test_header("Ranking filter", "/gainers-losers + /currencies/{slug}/markets");

    let fetcher = match MarketDataFetcher::from_config(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            println!("  {} {}", "❌".red(), e);
            return;
        }
    };

    let start = Instant::now();
    match fetcher.filter_markets().await {
        Ok(outcome) => {
            print_timing(start.elapsed());
            for (rank, window, entries) in outcome.filtered.iter() {
                println!(
                    "  {} {} kept, {} failed",
                    format!("{} {}:", rank, window).cyan(),
                    entries.len().to_string().green(),
                    outcome.failed.bucket(rank, window).len().to_string().red()
                );
            }
        }
        Err(e) => print_failure(start.elapsed(), &e.to_string()),
    }
    println!();
}

async fn inspect_snapshot(path: &Path, args: &Args) {
    print_test_header("Snapshot", &path.display().to_string());

    match snapshot::read_snapshot_value(path).await {
        Ok(value) => {
            print_json_structure(&value, 2);
            if args.verbose {
                println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            }
        }
        Err(e) => println!("  {} {}", "❌".red(), e),
    }
}

fn print_test_header(name: &str, endpoint: &str) {
    println!("{}", "─".repeat(60).bright_black());
    println!("{} {}", "Testing:".bold(), name.bold().white());
    println!("{} {}", "Endpoint:".cyan(), endpoint.yellow());
}

fn print_timing(duration: Duration) {
    println!(
        "  {} {} ({:.2}ms)",
        "Status:".cyan(),
        "OK".green().bold(),
        duration.as_secs_f64() * 1000.0
    );
}

fn print_failure(duration: Duration, message: &str) {
    println!(
        "  {} {} ({:.2}ms)",
        "Status:".cyan(),
        "FAILED".red().bold(),
        duration.as_secs_f64() * 1000.0
    );
    println!("  {} {}", "Error:".red(), message);
}

fn print_json_structure(value: &Value, indent: usize) {
    let prefix = " ".repeat(indent);

    match value {
        Value::Object(map) => {
            for (key, val) in map.iter().take(15) {
                let type_str = match val {
                    Value::Null => "null",
                    Value::Bool(_) => "bool",
                    Value::Number(_) => "number",
                    Value::String(_) => "string",
                    Value::Array(_) => "array",
                    Value::Object(_) => "object",
                };
                println!("{}{}: {}", prefix, key.cyan(), type_str.bright_black());
                if let Value::Object(_) = val {
                    if indent < 6 {
                        print_json_structure(val, indent + 2);
                    }
                }
            }
            if map.len() > 15 {
                println!("{}... and {} more fields", prefix, map.len() - 15);
            }
        }
        Value::Array(items) => {
            println!("{}[{} items]", prefix, items.len());
        }
        other => println!("{}{}", prefix, other),
    }
}
