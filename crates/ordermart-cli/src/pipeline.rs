use std::path::Path;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use ordermart_core::{OrderRecord, WarehouseConfig};
use ordermart_generate::{OrderGenerator, snapshot_path, write_orders_csv};
use ordermart_warehouse::{
    LoadReport, MartReport, StagingReport, build_marts, build_staging, ensure_warehouse, load_raw,
};

use crate::{CliError, GenerateArgs, connect};

/// Summary of a full pipeline run, written next to the snapshot file.
#[derive(Debug, Clone, Serialize)]
struct RunSummary {
    run_id: String,
    run_date: NaiveDate,
    rows_generated: u64,
    snapshot_bytes: u64,
    rows_loaded: u64,
    rows_staged: u64,
    daily_revenue_rows: u64,
    customer_ltv_rows: u64,
    product_revenue_rows: u64,
    customer_segments_rows: u64,
    duration_ms: u64,
}

/// Sequence the four stages synchronously, aborting on the first error.
///
/// The pool is closed on every exit path, normal or failing.
pub async fn run(args: &GenerateArgs) -> Result<(), CliError> {
    let started = Instant::now();
    let run_id = Uuid::new_v4().to_string();
    let run_date = Local::now().date_naive();
    info!(run_id = %run_id, run_date = %run_date, "pipeline started");

    let orders = OrderGenerator::new(args.generator_options()).generate()?;
    let path = snapshot_path(&args.out_dir, run_date);
    let bytes = write_orders_csv(&path, &orders)?;
    info!(
        rows = orders.len(),
        bytes,
        path = %path.display(),
        "stage 1/4: snapshot generated"
    );

    let config = WarehouseConfig::from_env()?;
    let pool = connect(&config).await?;
    let outcome = store_stages(&pool, &orders, run_date).await;
    pool.close().await;
    let (load, staging, marts) = outcome?;

    let summary = RunSummary {
        run_id: run_id.clone(),
        run_date,
        rows_generated: orders.len() as u64,
        snapshot_bytes: bytes,
        rows_loaded: load.rows_loaded,
        rows_staged: staging.rows_staged,
        daily_revenue_rows: marts.daily_revenue_rows,
        customer_ltv_rows: marts.customer_ltv_rows,
        product_revenue_rows: marts.product_revenue_rows,
        customer_segments_rows: marts.customer_segments_rows,
        duration_ms: started.elapsed().as_millis() as u64,
    };
    write_summary(&args.out_dir, &summary)?;

    info!(run_id = %run_id, duration_ms = summary.duration_ms, "pipeline completed");
    Ok(())
}

async fn store_stages(
    pool: &PgPool,
    orders: &[OrderRecord],
    run_date: NaiveDate,
) -> Result<(LoadReport, StagingReport, MartReport), CliError> {
    ensure_warehouse(pool).await?;

    let load = load_raw(pool, orders, run_date).await?;
    info!(rows = load.rows_loaded, "stage 2/4: raw layer loaded");

    let staging = build_staging(pool).await?;
    info!(rows = staging.rows_staged, "stage 3/4: staging rebuilt");

    let marts = build_marts(pool).await?;
    info!(
        daily_revenue = marts.daily_revenue_rows,
        customer_ltv = marts.customer_ltv_rows,
        product_revenue = marts.product_revenue_rows,
        customer_segments = marts.customer_segments_rows,
        "stage 4/4: marts rebuilt"
    );

    Ok((load, staging, marts))
}

fn write_summary(out_dir: &Path, summary: &RunSummary) -> Result<(), CliError> {
    let path = out_dir.join(format!(
        "run_summary_{}.json",
        summary.run_date.format("%Y%m%d")
    ));
    std::fs::write(&path, serde_json::to_vec_pretty(summary)?)?;
    info!(path = %path.display(), "run summary written");
    Ok(())
}
