use std::time::Instant;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use ordermart_core::Segment;

use crate::errors::WarehouseError;

/// Row counts for the four reporting tables after a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MartReport {
    pub daily_revenue_rows: u64,
    pub customer_ltv_rows: u64,
    pub product_revenue_rows: u64,
    pub customer_segments_rows: u64,
    pub duration_ms: u64,
}

const DAILY_REVENUE_SQL: &str = "\
    create table mart.daily_revenue as \
    select \
        date_trunc('day', order_timestamp) as order_date, \
        sum(total_amount) as revenue \
    from staging.orders_stg \
    group by order_date \
    order by order_date";

const CUSTOMER_LTV_SQL: &str = "\
    create table mart.customer_ltv as \
    select \
        customer_id, \
        sum(total_amount) as lifetime_value \
    from staging.orders_stg \
    group by customer_id";

const PRODUCT_REVENUE_SQL: &str = "\
    create table mart.product_revenue as \
    select \
        product_id, \
        category, \
        sum(total_amount) as total_revenue, \
        sum(quantity) as total_quantity, \
        count(*) as order_count, \
        avg(total_amount) as avg_order_value \
    from staging.orders_stg \
    group by product_id, category";

/// Recompute the four mart tables from current staging contents.
///
/// Segments derive from `customer_ltv`, so the four rebuilds run in
/// order inside one transaction; a failure anywhere leaves the previous
/// marts in place.
pub async fn build_marts(pool: &PgPool) -> Result<MartReport, WarehouseError> {
    let start = Instant::now();
    let mut tx = pool.begin().await?;

    sqlx::query("create schema if not exists mart")
        .execute(&mut *tx)
        .await?;

    let segments_sql = customer_segments_sql();
    let rebuilds: [(&str, &str); 4] = [
        ("daily_revenue", DAILY_REVENUE_SQL),
        ("customer_ltv", CUSTOMER_LTV_SQL),
        ("product_revenue", PRODUCT_REVENUE_SQL),
        ("customer_segments", &segments_sql),
    ];

    let mut counts = [0_u64; 4];
    for (index, (table, create)) in rebuilds.into_iter().enumerate() {
        let drop = format!("drop table if exists mart.{table}");
        sqlx::query(&drop).execute(&mut *tx).await?;
        sqlx::query(create).execute(&mut *tx).await?;

        let count_sql = format!("select count(*) from mart.{table}");
        let count: i64 = sqlx::query_scalar(&count_sql).fetch_one(&mut *tx).await?;
        counts[index] = count as u64;
    }

    tx.commit().await?;

    let report = MartReport {
        daily_revenue_rows: counts[0],
        customer_ltv_rows: counts[1],
        product_revenue_rows: counts[2],
        customer_segments_rows: counts[3],
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        daily_revenue = report.daily_revenue_rows,
        customer_ltv = report.customer_ltv_rows,
        product_revenue = report.product_revenue_rows,
        customer_segments = report.customer_segments_rows,
        duration_ms = report.duration_ms,
        "marts rebuilt from staging"
    );
    Ok(report)
}

// The CASE thresholds are rendered from the segment rule's constants so
// the SQL and the Rust rule cannot drift.
fn customer_segments_sql() -> String {
    format!(
        "create table mart.customer_segments as \
         select \
             customer_id, \
             lifetime_value, \
             case \
                 when lifetime_value >= {vip} then '{vip_label}' \
                 when lifetime_value >= {high} then '{high_label}' \
                 when lifetime_value >= {medium} then '{medium_label}' \
                 else '{low_label}' \
             end as segment \
         from mart.customer_ltv",
        vip = Segment::VIP_THRESHOLD,
        high = Segment::HIGH_THRESHOLD,
        medium = Segment::MEDIUM_THRESHOLD,
        vip_label = Segment::Vip.as_str(),
        high_label = Segment::High.as_str(),
        medium_label = Segment::Medium.as_str(),
        low_label = Segment::Low.as_str(),
    )
}
