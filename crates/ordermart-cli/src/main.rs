mod logging;
mod pipeline;

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::{info, warn};

use ordermart_core::{Error as CoreError, WarehouseConfig};
use ordermart_generate::engine::{DEFAULT_ROWS, DEFAULT_SEED};
use ordermart_generate::{
    GenerationError, GeneratorOptions, OrderGenerator, read_orders_csv, snapshot_path,
    write_orders_csv,
};
use ordermart_warehouse::{
    WarehouseError, build_marts, build_staging, ensure_warehouse, load_raw, run_quality_checks,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("quality checks failed: {0}")]
    QualityFailed(String),
}

#[derive(Parser, Debug)]
#[command(name = "ordermart", version, about = "Ordermart ELT pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic order snapshot CSV.
    Generate(GenerateArgs),
    /// Load a snapshot CSV into the raw layer.
    Load(LoadArgs),
    /// Rebuild the staging table from raw history.
    Staging,
    /// Rebuild the four mart tables from staging.
    Mart,
    /// Run post-pipeline data quality checks.
    Verify(WindowArgs),
    /// Run the full pipeline: generate, load, staging, marts.
    Run(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
struct WindowArgs {
    /// First day of the historical order window.
    #[arg(long, default_value = "2023-01-01")]
    window_start: NaiveDate,
    /// Last day of the historical order window.
    #[arg(long, default_value = "2025-11-01")]
    window_end: NaiveDate,
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    /// Number of orders to generate.
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: u64,
    /// Seed for the deterministic random source.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Directory where snapshot files are written.
    #[arg(long, default_value = "data/raw")]
    out_dir: PathBuf,
    #[command(flatten)]
    window: WindowArgs,
}

impl GenerateArgs {
    fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            rows: self.rows,
            window_start: self.window.window_start,
            window_end: self.window.window_end,
            seed: self.seed,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct LoadArgs {
    /// Snapshot file to load; defaults to today's dated file under --out-dir.
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Directory where snapshot files live.
    #[arg(long, default_value = "data/raw")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    logging::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => run_generate(&args),
        Command::Load(args) => run_load(&args).await,
        Command::Staging => run_staging().await,
        Command::Mart => run_mart().await,
        Command::Verify(args) => run_verify(&args).await,
        Command::Run(args) => pipeline::run(&args).await,
    }
}

async fn connect(config: &WarehouseConfig) -> Result<PgPool, CliError> {
    // The store is a single exclusively-owned resource for the run.
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.connection_string())
        .await?;
    info!(store = %config.redacted(), "connected to warehouse");
    Ok(pool)
}

fn run_generate(args: &GenerateArgs) -> Result<(), CliError> {
    let run_date = Local::now().date_naive();
    let orders = OrderGenerator::new(args.generator_options()).generate()?;
    let path = snapshot_path(&args.out_dir, run_date);
    let bytes = write_orders_csv(&path, &orders)?;
    info!(rows = orders.len(), bytes, path = %path.display(), "snapshot written");
    Ok(())
}

async fn run_load(args: &LoadArgs) -> Result<(), CliError> {
    let run_date = Local::now().date_naive();
    let path = args
        .csv
        .clone()
        .unwrap_or_else(|| snapshot_path(&args.out_dir, run_date));
    let orders = read_orders_csv(&path)?;

    let config = WarehouseConfig::from_env()?;
    let pool = connect(&config).await?;
    let outcome = async {
        ensure_warehouse(&pool).await?;
        load_raw(&pool, &orders, run_date).await
    }
    .await;
    pool.close().await;

    let report = outcome?;
    info!(rows = report.rows_loaded, load_date = %report.load_date, "raw layer loaded");
    Ok(())
}

async fn run_staging() -> Result<(), CliError> {
    let config = WarehouseConfig::from_env()?;
    let pool = connect(&config).await?;
    let outcome = build_staging(&pool).await;
    pool.close().await;

    let report = outcome?;
    info!(rows = report.rows_staged, "staging rebuilt");
    Ok(())
}

async fn run_mart() -> Result<(), CliError> {
    let config = WarehouseConfig::from_env()?;
    let pool = connect(&config).await?;
    let outcome = build_marts(&pool).await;
    pool.close().await;

    let report = outcome?;
    info!(
        daily_revenue = report.daily_revenue_rows,
        customer_ltv = report.customer_ltv_rows,
        product_revenue = report.product_revenue_rows,
        customer_segments = report.customer_segments_rows,
        "marts rebuilt"
    );
    Ok(())
}

async fn run_verify(args: &WindowArgs) -> Result<(), CliError> {
    let config = WarehouseConfig::from_env()?;
    let pool = connect(&config).await?;
    let outcome = run_quality_checks(&pool, args.window_start, args.window_end).await;
    pool.close().await;

    let report = outcome?;
    for check in &report.checks {
        if check.passed {
            info!(check = check.name, detail = %check.detail, "check passed");
        } else {
            warn!(check = check.name, detail = %check.detail, "check failed");
        }
    }
    if !report.passed() {
        return Err(CliError::QualityFailed(report.failures().join(", ")));
    }
    info!(checks = report.checks.len(), "all quality checks passed");
    Ok(())
}
