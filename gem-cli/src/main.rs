//! GEM CLI: momentum recommendation from the command line.
//!
//! Commands:
//! - `recommend`: compute the GEM pick for a reference date
//! - `return`: trailing return of a single ticker
//! - `instruments`: list the configured universe and benchmark
//! - `parameters`: show strategy and cache parameters

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gem_core::domain::{AssetClass, DATE_FORMAT};
use gem_runner::{init_logging, GemConfig, RecommendationService, ReportView};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gem", about = "GEM CLI: Global Equities Momentum recommender")]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the GEM recommendation for a reference date.
    Recommend {
        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Trailing return of one quote-source ticker (e.g. iwda.uk).
    Return {
        #[arg(long)]
        ticker: String,

        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Print the result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the instrument universe and the benchmark.
    Instruments {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show strategy, benchmark and cache parameters.
    Parameters {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GemConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.log_config()).context("initializing logging")?;
    tracing::debug!(path = ?cli.config, instruments = config.instruments.len(), "configuration loaded");

    match cli.command {
        Commands::Recommend { date, json } => run_recommend(&config, date, json),
        Commands::Return { ticker, date, json } => run_return(&config, &ticker, date, json),
        Commands::Instruments { json } => run_instruments(&config, json),
        Commands::Parameters { json } => run_parameters(&config, json),
    }
}

fn today() -> String {
    chrono::Local::now().date_naive().format(DATE_FORMAT).to_string()
}

fn run_recommend(config: &GemConfig, date: Option<String>, as_json: bool) -> Result<()> {
    let date = date.unwrap_or_else(today);
    let service = RecommendationService::from_config(config)?;
    let report = service
        .compute_recommendation(&date)
        .with_context(|| format!("computing recommendation for {date}"))?;
    let view = ReportView::assemble(&report, service.universe());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.render_text());
    }
    Ok(())
}

fn run_return(config: &GemConfig, ticker: &str, date: Option<String>, as_json: bool) -> Result<()> {
    let date = date.unwrap_or_else(today);
    let service = RecommendationService::from_config(config)?;
    let result = service.instrument_return(ticker, &date);

    if as_json {
        let out = json!({ "ticker": ticker, "reference_date": date, "result": result });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match result.window() {
        Some(w) => println!(
            "{ticker}: {:+.2}% ({} .. {}, {} prices)",
            w.percentage_return,
            w.window_start,
            w.window_end,
            w.history.len()
        ),
        None => println!("{ticker}: no data for {date}"),
    }
    Ok(())
}

fn run_instruments(config: &GemConfig, as_json: bool) -> Result<()> {
    let universe = config.universe()?;
    let equity = universe.equity_names();
    let bonds = universe.bond_names();

    if as_json {
        let out = json!({
            "instruments": universe.instruments(),
            "benchmark": { "name": config.benchmark.name, "symbol": config.benchmark.symbol },
            "equity_count": equity.len(),
            "bond_count": bonds.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for class in [AssetClass::Equity, AssetClass::Bond] {
        println!("{}:", class.as_str());
        for i in universe.instruments().iter().filter(|i| i.class == class) {
            println!("  {:<8} {}", i.name, i.symbol);
        }
    }
    println!("benchmark:");
    println!("  {:<8} {}", config.benchmark.name, config.benchmark.symbol);
    println!("\n{} equity, {} bond", equity.len(), bonds.len());
    Ok(())
}

fn run_parameters(config: &GemConfig, as_json: bool) -> Result<()> {
    let universe = config.universe()?;
    let out = json!({
        "lookback_months": config.strategy.lookback_months,
        "skip_months": config.strategy.skip_months,
        "equity": universe.equity_names(),
        "bonds": universe.bond_names(),
        "benchmark": config.benchmark.symbol,
        "cache_ttl_hours": config.data.cache_ttl_hours,
        "cache_capacity": config.data.cache_capacity,
        "fetch_timeout_secs": config.data.fetch_timeout_secs,
        "source": config.data.base_url,
    });

    if as_json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let sample = NaiveDate::from_ymd_opt(2024, 6, 15)
        .and_then(|d| config.window().bounds(d).map(|b| (d, b)));
    println!("lookback:      {} months", config.strategy.lookback_months);
    println!("skip:          {} months", config.strategy.skip_months);
    if let Some((d, (start, end))) = sample {
        println!("example:       {d} -> window {start} .. {end}");
    }
    println!("equity:        {}", universe.equity_names().join(", "));
    println!("bonds:         {}", universe.bond_names().join(", "));
    println!("benchmark:     {} ({})", config.benchmark.name, config.benchmark.symbol);
    println!("cache ttl:     {} h", config.data.cache_ttl_hours);
    println!("cache size:    {}", config.data.cache_capacity);
    println!("fetch timeout: {} s", config.data.fetch_timeout_secs);
    println!("source:        {}", config.data.base_url);
    Ok(())
}
