//! Core contracts shared across the Ordermart pipeline crates.
//!
//! This crate defines the order domain model, the warehouse configuration,
//! and the error type used by the generator, loader, and transform layers.

pub mod config;
pub mod error;
pub mod model;

pub use config::WarehouseConfig;
pub use error::{Error, Result};
pub use model::{Category, OrderRecord, OrderStatus, Segment};
