//! Warehouse layer for the Ordermart pipeline.
//!
//! Everything that talks to Postgres lives here: schema bootstrap, the
//! raw loader, the staging rebuild, the mart aggregations, and the
//! post-run quality checks. Each write path runs inside a single
//! transaction so a failed step leaves prior state intact.

pub mod errors;
pub mod loader;
pub mod mart;
pub mod schema;
pub mod staging;
pub mod verify;

pub use errors::WarehouseError;
pub use loader::{LoadReport, load_raw};
pub use mart::{MartReport, build_marts};
pub use schema::ensure_warehouse;
pub use staging::{StagingReport, build_staging};
pub use verify::{CheckOutcome, QualityReport, run_quality_checks};
