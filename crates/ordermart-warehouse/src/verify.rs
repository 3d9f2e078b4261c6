use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::PgPool;

use ordermart_core::Segment;

use crate::errors::WarehouseError;

/// Outcome of one post-run data quality check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

/// Results of the post-run verification suite.
///
/// The suite runs after the pipeline, never inline with it; every check
/// executes even when an earlier one fails.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub checks: Vec<CheckOutcome>,
}

impl QualityReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    /// Names of the failing checks, for error reporting.
    pub fn failures(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|check| !check.passed)
            .map(|check| check.name)
            .collect()
    }
}

/// Run every data quality check against the warehouse.
///
/// `window_start`/`window_end` are the generation window the staging
/// timestamps are expected to fall into.
pub async fn run_quality_checks(
    pool: &PgPool,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<QualityReport, WarehouseError> {
    let mut checks = vec![
        raw_snapshot_not_empty(pool).await?,
        order_ids_not_null(pool).await?,
        history_covers_snapshot(pool).await?,
        staging_values_valid(pool).await?,
        staging_window(pool, window_start, window_end).await?,
        revenue_reconciles(pool).await?,
        segments_match_thresholds(pool).await?,
    ];
    for table in [
        "daily_revenue",
        "customer_ltv",
        "product_revenue",
        "customer_segments",
    ] {
        checks.push(mart_not_empty(pool, table).await?);
    }

    Ok(QualityReport { checks })
}

async fn count(pool: &PgPool, sql: &str) -> Result<i64, WarehouseError> {
    let value: i64 = sqlx::query_scalar(sql).fetch_one(pool).await?;
    Ok(value)
}

async fn raw_snapshot_not_empty(pool: &PgPool) -> Result<CheckOutcome, WarehouseError> {
    let rows = count(pool, "select count(*) from raw.orders_raw").await?;
    Ok(CheckOutcome {
        name: "raw_snapshot_not_empty",
        passed: rows > 0,
        detail: format!("{rows} rows in raw.orders_raw"),
    })
}

async fn order_ids_not_null(pool: &PgPool) -> Result<CheckOutcome, WarehouseError> {
    let nulls = count(
        pool,
        "select count(*) from raw.orders_raw where order_id is null",
    )
    .await?;
    Ok(CheckOutcome {
        name: "order_ids_not_null",
        passed: nulls == 0,
        detail: format!("{nulls} null order ids"),
    })
}

async fn history_covers_snapshot(pool: &PgPool) -> Result<CheckOutcome, WarehouseError> {
    let snapshot = count(pool, "select count(*) from raw.orders_raw").await?;
    let history = count(pool, "select count(*) from raw.orders_all").await?;
    Ok(CheckOutcome {
        name: "history_covers_snapshot",
        passed: history > 0 && history >= snapshot,
        detail: format!("history {history} rows, snapshot {snapshot} rows"),
    })
}

async fn staging_values_valid(pool: &PgPool) -> Result<CheckOutcome, WarehouseError> {
    let rows = count(pool, "select count(*) from staging.orders_stg").await?;
    let invalid = count(
        pool,
        "select count(*) from staging.orders_stg \
         where price <= 0 or quantity <= 0 or total_amount < 0",
    )
    .await?;
    Ok(CheckOutcome {
        name: "staging_values_valid",
        passed: rows > 0 && invalid == 0,
        detail: format!("{rows} staged rows, {invalid} with invalid values"),
    })
}

async fn staging_window(
    pool: &PgPool,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<CheckOutcome, WarehouseError> {
    let bounds: (Option<NaiveDateTime>, Option<NaiveDateTime>) = sqlx::query_as(
        "select min(order_timestamp), max(order_timestamp) from staging.orders_stg",
    )
    .fetch_one(pool)
    .await?;

    let (passed, detail) = match bounds {
        (Some(min), Some(max)) => (
            min.date() >= window_start && max.date() <= window_end,
            format!("timestamps span {min} to {max}"),
        ),
        _ => (false, "staging is empty".to_string()),
    };
    Ok(CheckOutcome {
        name: "staging_window",
        passed,
        detail,
    })
}

async fn revenue_reconciles(pool: &PgPool) -> Result<CheckOutcome, WarehouseError> {
    let staging_total: f64 =
        sqlx::query_scalar("select coalesce(sum(total_amount), 0) from staging.orders_stg")
            .fetch_one(pool)
            .await?;
    let mart_total: f64 =
        sqlx::query_scalar("select coalesce(sum(revenue), 0) from mart.daily_revenue")
            .fetch_one(pool)
            .await?;

    // Both sides sum the same doubles; allow only accumulation-order noise.
    let tolerance = 1e-6 * staging_total.abs().max(1.0);
    Ok(CheckOutcome {
        name: "revenue_reconciles",
        passed: (staging_total - mart_total).abs() <= tolerance,
        detail: format!("staging total {staging_total}, mart total {mart_total}"),
    })
}

async fn segments_match_thresholds(pool: &PgPool) -> Result<CheckOutcome, WarehouseError> {
    let rows: Vec<(i64, f64, String)> =
        sqlx::query_as("select customer_id, lifetime_value, segment from mart.customer_segments")
            .fetch_all(pool)
            .await?;

    let mut mismatches = 0_u64;
    for (customer_id, lifetime_value, segment) in &rows {
        let expected = Segment::from_lifetime_value(*lifetime_value);
        if Segment::parse(segment) != Some(expected) {
            mismatches += 1;
            tracing::warn!(
                customer_id,
                lifetime_value,
                segment = %segment,
                expected = expected.as_str(),
                "segment does not match threshold rule"
            );
        }
    }
    Ok(CheckOutcome {
        name: "segments_match_thresholds",
        passed: mismatches == 0,
        detail: format!("{} customers checked, {mismatches} mismatched", rows.len()),
    })
}

async fn mart_not_empty(pool: &PgPool, table: &str) -> Result<CheckOutcome, WarehouseError> {
    let sql = format!("select count(*) from mart.{table}");
    let rows = count(pool, &sql).await?;
    let name = match table {
        "daily_revenue" => "mart_daily_revenue_not_empty",
        "customer_ltv" => "mart_customer_ltv_not_empty",
        "product_revenue" => "mart_product_revenue_not_empty",
        _ => "mart_customer_segments_not_empty",
    };
    Ok(CheckOutcome {
        name,
        passed: rows > 0,
        detail: format!("{rows} rows in mart.{table}"),
    })
}
