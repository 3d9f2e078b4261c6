use sqlx::PgPool;
use tracing::info;

use crate::errors::WarehouseError;

// Column list shared by the snapshot table and the history table; history
// additionally carries the load date.
const RAW_ORDER_COLUMNS: &str = "\
    order_id bigint not null, \
    order_timestamp timestamp, \
    customer_id bigint, \
    product_id bigint, \
    category text, \
    price double precision, \
    quantity integer, \
    status text";

/// Create the three layer schemas and the two raw tables when missing.
///
/// Staging and mart tables are not created here: those layers drop and
/// recreate their own tables on every rebuild.
pub async fn ensure_warehouse(pool: &PgPool) -> Result<(), WarehouseError> {
    for schema in ["raw", "staging", "mart"] {
        let sql = format!("create schema if not exists {schema}");
        sqlx::query(&sql).execute(pool).await?;
    }

    let snapshot = format!("create table if not exists raw.orders_raw ({RAW_ORDER_COLUMNS})");
    sqlx::query(&snapshot).execute(pool).await?;

    let history = format!(
        "create table if not exists raw.orders_all ({RAW_ORDER_COLUMNS}, load_date date not null)"
    );
    sqlx::query(&history).execute(pool).await?;

    info!("warehouse schemas ready");
    Ok(())
}
