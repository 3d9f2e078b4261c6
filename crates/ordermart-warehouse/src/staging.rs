use std::time::Instant;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use ordermart_core::OrderStatus;

use crate::errors::WarehouseError;

/// Summary of a staging rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingReport {
    pub rows_staged: u64,
    pub duration_ms: u64,
}

/// Rebuild `staging.orders_stg` from the entire raw history.
///
/// Keeps only rows passing the validity predicates, derives
/// `total_amount`, and recreates the lookup indexes the mart
/// aggregations lean on. Idempotent for unchanged history.
pub async fn build_staging(pool: &PgPool) -> Result<StagingReport, WarehouseError> {
    let start = Instant::now();
    let mut tx = pool.begin().await?;

    sqlx::query("drop table if exists staging.orders_stg")
        .execute(&mut *tx)
        .await?;

    let create = staging_create_sql();
    sqlx::query(&create).execute(&mut *tx).await?;

    sqlx::query("create index idx_orders_stg_order_ts on staging.orders_stg (order_timestamp)")
        .execute(&mut *tx)
        .await?;
    sqlx::query("create index idx_orders_stg_customer on staging.orders_stg (customer_id)")
        .execute(&mut *tx)
        .await?;

    let rows_staged: i64 = sqlx::query_scalar("select count(*) from staging.orders_stg")
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        rows = rows_staged,
        duration_ms = start.elapsed().as_millis() as u64,
        "staging rebuilt from raw history"
    );
    Ok(StagingReport {
        rows_staged: rows_staged as u64,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

// The status filter is rendered from the closed set so the SQL cannot
// drift from the domain model.
fn staging_create_sql() -> String {
    let statuses = OrderStatus::ALL
        .iter()
        .map(|status| format!("'{}'", status.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "create table staging.orders_stg as \
         select \
             order_id, \
             order_timestamp, \
             customer_id, \
             product_id, \
             category, \
             price, \
             quantity, \
             status, \
             price * quantity as total_amount \
         from raw.orders_all \
         where price > 0 \
           and quantity > 0 \
           and order_timestamp is not null \
           and status in ({statuses})"
    )
}
