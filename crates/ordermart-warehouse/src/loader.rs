use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use ordermart_core::OrderRecord;

use crate::errors::WarehouseError;

// Postgres caps bind parameters at 65535 per statement; eight columns per
// row keeps this batch size comfortably below the limit.
const INSERT_BATCH_ROWS: usize = 1_000;

/// Summary of one raw load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows_loaded: u64,
    pub load_date: NaiveDate,
    pub duration_ms: u64,
}

/// Replace the raw snapshot with `orders` and append the same rows to the
/// history table tagged with `load_date`.
///
/// Runs inside a single transaction: a failure partway rolls everything
/// back, so no partial snapshot is ever visible.
pub async fn load_raw(
    pool: &PgPool,
    orders: &[OrderRecord],
    load_date: NaiveDate,
) -> Result<LoadReport, WarehouseError> {
    let start = Instant::now();
    let mut tx = pool.begin().await?;

    sqlx::query("truncate table raw.orders_raw")
        .execute(&mut *tx)
        .await?;

    for batch in orders.chunks(INSERT_BATCH_ROWS) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "insert into raw.orders_raw \
             (order_id, order_timestamp, customer_id, product_id, category, price, quantity, status) ",
        );
        builder.push_values(batch, |mut row, order| {
            row.push_bind(order.order_id)
                .push_bind(order.order_timestamp)
                .push_bind(order.customer_id)
                .push_bind(order.product_id)
                .push_bind(order.category.as_str())
                .push_bind(order.price)
                .push_bind(order.quantity)
                .push_bind(order.status.as_str());
        });
        builder.build().execute(&mut *tx).await?;
    }

    sqlx::query(
        "insert into raw.orders_all \
         (order_id, order_timestamp, customer_id, product_id, category, price, quantity, status, load_date) \
         select order_id, order_timestamp, customer_id, product_id, category, price, quantity, status, $1 \
         from raw.orders_raw",
    )
    .bind(load_date)
    .execute(&mut *tx)
    .await?;

    let rows_loaded: i64 = sqlx::query_scalar("select count(*) from raw.orders_raw")
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        rows = rows_loaded,
        load_date = %load_date,
        duration_ms = start.elapsed().as_millis() as u64,
        "raw snapshot replaced and appended to history"
    );
    Ok(LoadReport {
        rows_loaded: rows_loaded as u64,
        load_date,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}
