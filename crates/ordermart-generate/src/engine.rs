use std::time::Instant;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use ordermart_core::{Category, OrderRecord, OrderStatus};

use crate::errors::GenerationError;

pub const DEFAULT_ROWS: u64 = 10_000;
pub const DEFAULT_SEED: u64 = 42;
const CUSTOMER_POPULATION: i64 = 5_000;
const PRODUCT_POPULATION: i64 = 300;
const MAX_QUANTITY: i32 = 10;
const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Number of orders to produce.
    pub rows: u64,
    /// First day of the historical window (inclusive).
    pub window_start: NaiveDate,
    /// Last day of the historical window (inclusive).
    pub window_end: NaiveDate,
    /// Seed for the deterministic random source.
    pub seed: u64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            window_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            window_end: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap_or_default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl GeneratorOptions {
    fn validate(&self) -> Result<(), GenerationError> {
        if self.rows == 0 {
            return Err(GenerationError::InvalidOptions(
                "row count must be positive".to_string(),
            ));
        }
        if self.window_end < self.window_start {
            return Err(GenerationError::InvalidOptions(format!(
                "window end {} is before window start {}",
                self.window_end, self.window_start
            )));
        }
        Ok(())
    }
}

/// Deterministic synthetic order source.
///
/// Persistence is a collaborator concern: `generate` has no side effects
/// beyond the returned batch.
#[derive(Debug, Clone)]
pub struct OrderGenerator {
    options: GeneratorOptions,
}

impl OrderGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    /// Produce the configured number of orders.
    ///
    /// Order ids are assigned sequentially from 1, so a batch always covers
    /// the contiguous range `1..=rows`.
    pub fn generate(&self) -> Result<Vec<OrderRecord>, GenerationError> {
        self.options.validate()?;

        let start = Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(self.options.seed);
        let total_days = (self.options.window_end - self.options.window_start).num_days();

        let mut orders = Vec::with_capacity(self.options.rows as usize);
        for order_id in 1..=self.options.rows {
            orders.push(self.generate_order(order_id as i64, total_days, &mut rng));
        }

        info!(
            rows = orders.len(),
            seed = self.options.seed,
            duration_ms = start.elapsed().as_millis() as u64,
            "orders generated"
        );
        Ok(orders)
    }

    fn generate_order(&self, order_id: i64, total_days: i64, rng: &mut ChaCha8Rng) -> OrderRecord {
        let offset_days = rng.random_range(0..=total_days);
        let offset_seconds = rng.random_range(0..SECONDS_PER_DAY);
        let day = self.options.window_start + Duration::days(offset_days);
        let time = NaiveTime::from_num_seconds_from_midnight_opt(offset_seconds, 0)
            .unwrap_or_default();
        let order_timestamp = NaiveDateTime::new(day, time);

        let customer_id = rng.random_range(1..=CUSTOMER_POPULATION);
        let category = Category::ALL[rng.random_range(0..Category::ALL.len())];
        let product_id = rng.random_range(1..=PRODUCT_POPULATION);

        let (min_price, max_price) = category.price_range();
        let price = round_to_cents(rng.random_range(min_price..=max_price));

        let quantity = rng.random_range(1..=MAX_QUANTITY);
        let status = OrderStatus::from_uniform(rng.random::<f64>());

        OrderRecord {
            order_id,
            order_timestamp,
            customer_id,
            product_id,
            category,
            price,
            quantity,
            status,
        }
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
