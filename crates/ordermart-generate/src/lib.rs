//! Synthetic order generation for the Ordermart pipeline.
//!
//! Produces deterministic, distributionally-shaped order batches and
//! handles the CSV snapshot files the raw loader consumes.

pub mod engine;
pub mod errors;
pub mod output;

pub use engine::{GeneratorOptions, OrderGenerator};
pub use errors::GenerationError;
pub use output::csv::{CSV_HEADER, read_orders_csv, snapshot_path, write_orders_csv};
