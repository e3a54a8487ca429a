//! Stacking Sats command-line calculator
//!
//! Loads a daily BTC close series, builds the 200-day features, and prints
//! the month's allocation weights and the dollar amounts for a budget.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use sats_core::chart::chart_data::{read_chart_points, weight_color, ChartSeries};
use sats_core::common::time::{parse_date, parse_month};
use sats_core::price::source::{
    CsvPriceSource, FallbackPriceSource, PriceSource, SyntheticPriceSource,
};
use sats_core::{build_features, Allocation, DcaPlan, PricePoint, WeightAllocator, WeightConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "stacking-sats")]
#[command(about = "Bitcoin DCA weight calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the month's allocation weights
    Weights {
        /// CSV with date and close columns; synthetic prices are used if it cannot be read
        #[arg(short, long)]
        prices: Option<PathBuf>,

        /// Target month (YYYY-MM), defaults to the month of --today
        #[arg(short, long)]
        month: Option<String>,

        /// Last day allowed to be adjusted (YYYY-MM-DD), defaults to the local date
        #[arg(short, long)]
        today: Option<String>,

        /// Monthly budget in USD
        #[arg(short, long)]
        budget: Option<f64>,

        /// JSON file with roll_n / alpha / min_weight overrides
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for the synthetic fallback series
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the most recent feature records
    Features {
        /// CSV with date and close columns
        #[arg(short, long)]
        prices: PathBuf,

        /// JSON file with roll_n / alpha / min_weight overrides
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of trailing records to print
        #[arg(long, default_value = "10")]
        tail: usize,
    },

    /// Summarize a model weight CSV for charting
    Chart {
        /// CSV with date,model_weight,weight_percent,bitcoin_price columns
        #[arg(short, long)]
        weights: PathBuf,
    },
}

fn parse_level(s: &str) -> Level {
    match s {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn load_config(path: Option<&Path>) -> Result<WeightConfig> {
    match path {
        Some(path) => WeightConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(WeightConfig::default()),
    }
}

fn load_prices(path: Option<&Path>, today: NaiveDate, seed: Option<u64>) -> Result<Vec<PricePoint>> {
    let mut synthetic = SyntheticPriceSource::new(today);
    synthetic.seed = seed;

    let prices = match path {
        Some(path) => FallbackPriceSource::new(
            Box::new(CsvPriceSource::new(path)),
            Box::new(synthetic),
        )
        .load()?,
        None => {
            info!("no price file given, using synthetic prices");
            synthetic.load()?
        }
    };
    info!(
        count = prices.len(),
        first = %prices.first().map(|p| p.date.to_string()).unwrap_or_default(),
        last = %prices.last().map(|p| p.date.to_string()).unwrap_or_default(),
        "loaded prices"
    );
    Ok(prices)
}

fn print_allocation(alloc: &Allocation, plan: Option<&DcaPlan>) {
    println!(
        "\n{:>10} {:>10} {:>12} {:>12} {:>14} {:>8}",
        "Date", "Weight", "Close", "200d MA", "USD", "Status"
    );
    println!("{:-<72}", "");

    for (i, row) in alloc.weights.rows().iter().enumerate() {
        let fmt_opt = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "-".into());
        let usd = plan
            .map(|p| format!("{:.2}", p.rows[i].usd_amount))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:>10} {:>9.4}% {:>12} {:>12} {:>14} {:>8}",
            row.date,
            row.weight * 100.0,
            fmt_opt(row.close),
            fmt_opt(row.moving_average),
            usd,
            row.status()
        );
    }

    println!("\nBoosted days: {}", alloc.boosted_days());
    println!("Floor-guarded days: {}", alloc.guarded_days());

    if let Some(plan) = plan {
        println!("\nBudget: ${:.2}", plan.total_budget);
        println!("  Spent so far: ${:.2}", plan.spent_usd());
        println!("  Remaining: ${:.2}", plan.remaining_usd());
        println!("  BTC accumulated: {:.8}", plan.total_btc());
        if let Some(pct) = plan.excess_btc_pct() {
            println!("  vs uniform DCA: {:+.2}%", pct);
        }
    }
}

fn run_weights(
    prices: Option<PathBuf>,
    month: Option<String>,
    today: Option<String>,
    budget: Option<f64>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let today = match today {
        Some(s) => parse_date(&s)?,
        None => Local::now().date_naive(),
    };
    let (year, month) = match month {
        Some(s) => parse_month(&s)?,
        None => (today.year(), today.month()),
    };

    let config = load_config(config.as_deref())?;
    let prices = load_prices(prices.as_deref(), today, seed)?;
    let features = build_features(&prices, &config);

    let allocator = WeightAllocator::new(config)?;
    let alloc = allocator.allocate_month(&features, year, month, today)?;
    let plan = budget.map(|b| DcaPlan::new(&alloc.weights, b)).transpose()?;

    if json {
        let out = serde_json::json!({
            "config": allocator.config(),
            "allocation": alloc,
            "plan": plan,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Allocation for {:04}-{:02} (today = {})", year, month, today);
        print_allocation(&alloc, plan.as_ref());
    }
    Ok(())
}

fn run_features(prices: &Path, config: Option<PathBuf>, tail: usize) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let prices = CsvPriceSource::new(prices).load()?;
    let features = build_features(&prices, &config);

    println!(
        "\n{:>10} {:>12} {:>12} {:>12} {:>8}",
        "Date", "Close", "MA", "Std", "Z"
    );
    println!("{:-<58}", "");
    for f in features.iter().skip(features.len().saturating_sub(tail)) {
        match f.stats() {
            Some((ma, sd)) if sd > 0.0 => println!(
                "{:>10} {:>12.2} {:>12.2} {:>12.2} {:>8.3}",
                f.date,
                f.close,
                ma,
                sd,
                (ma - f.close) / sd
            ),
            _ => println!("{:>10} {:>12.2} {:>12} {:>12} {:>8}", f.date, f.close, "-", "-", "-"),
        }
    }
    println!("\n{} records, window {}", features.len(), config.roll_n);
    Ok(())
}

fn run_chart(weights: &Path) -> Result<()> {
    let file = File::open(weights).with_context(|| format!("opening {}", weights.display()))?;
    let series = ChartSeries::new(read_chart_points(file)?)?;

    println!("75th percentile weight: {:.6}", series.threshold);
    for (tier, count) in series.tier_counts() {
        println!("  {} allocation days: {}", tier, count);
    }
    println!("{:-<60}", "");
    for (point, tier) in &series.points {
        println!(
            "{:>10} {:>10.6} {:>12.2} {:>9} {}",
            point.date,
            point.model_weight,
            point.bitcoin_price,
            tier,
            weight_color(point.model_weight, 1.0)
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Weights {
            prices,
            month,
            today,
            budget,
            config,
            seed,
            json,
        } => run_weights(prices, month, today, budget, config, seed, json),
        Commands::Features { prices, config, tail } => run_features(&prices, config, tail),
        Commands::Chart { weights } => run_chart(&weights),
    }
}
