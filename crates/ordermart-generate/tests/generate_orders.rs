use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ordermart_core::{Category, OrderStatus};
use ordermart_generate::{GenerationError, GeneratorOptions, OrderGenerator};

fn options(rows: u64, seed: u64) -> GeneratorOptions {
    GeneratorOptions {
        rows,
        seed,
        ..GeneratorOptions::default()
    }
}

#[test]
fn batch_covers_contiguous_ids_exactly_once() {
    let orders = OrderGenerator::new(options(100, 7))
        .generate()
        .expect("generate batch");

    assert_eq!(orders.len(), 100);
    let ids: HashSet<i64> = orders.iter().map(|order| order.order_id).collect();
    assert_eq!(ids.len(), 100, "order ids must be unique");
    for id in 1..=100 {
        assert!(ids.contains(&id), "missing order id {id}");
    }
    for order in &orders {
        assert!(order.price > 0.0, "price must be positive");
        assert!(order.quantity > 0, "quantity must be positive");
    }
}

#[test]
fn generation_is_deterministic_for_a_seed() {
    let first = OrderGenerator::new(options(250, 42))
        .generate()
        .expect("first run");
    let second = OrderGenerator::new(options(250, 42))
        .generate()
        .expect("second run");
    assert_eq!(first, second, "same seed must produce the same batch");

    let other = OrderGenerator::new(options(250, 43))
        .generate()
        .expect("other seed");
    assert_ne!(first, other, "a different seed should shift the batch");
}

#[test]
fn timestamps_stay_inside_the_window() {
    let opts = GeneratorOptions {
        rows: 500,
        window_start: NaiveDate::from_ymd_opt(2024, 3, 1).expect("start"),
        window_end: NaiveDate::from_ymd_opt(2024, 3, 31).expect("end"),
        seed: 11,
    };
    let lower = NaiveDateTime::new(opts.window_start, NaiveTime::MIN);
    let upper = NaiveDateTime::new(
        opts.window_end,
        NaiveTime::from_hms_opt(23, 59, 59).expect("end of day"),
    );

    let orders = OrderGenerator::new(opts).generate().expect("generate");
    for order in &orders {
        assert!(
            order.order_timestamp >= lower && order.order_timestamp <= upper,
            "timestamp {} outside window",
            order.order_timestamp
        );
    }
}

#[test]
fn prices_follow_category_ranges() {
    let orders = OrderGenerator::new(options(1_000, 3))
        .generate()
        .expect("generate");
    for order in &orders {
        let (min, max) = order.category.price_range();
        assert!(
            order.price >= min && order.price <= max,
            "price {} outside {:?} range",
            order.price,
            order.category
        );
        let cents = order.price * 100.0;
        assert!(
            (cents - cents.round()).abs() < 1e-6,
            "price {} not rounded to cents",
            order.price
        );
    }
}

#[test]
fn status_distribution_is_shaped() {
    let orders = OrderGenerator::new(options(10_000, 5))
        .generate()
        .expect("generate");

    let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
    let delivered = count(OrderStatus::Delivered);
    let shipped = count(OrderStatus::Shipped);
    let pending = count(OrderStatus::Pending);
    let cancelled = count(OrderStatus::Cancelled);

    assert_eq!(delivered + shipped + pending + cancelled, 10_000);
    assert!(delivered > 7_000, "delivered should dominate: {delivered}");
    assert!(shipped > 1_000, "shipped share too small: {shipped}");
    assert!(cancelled < 500, "cancelled share too large: {cancelled}");

    let categories: HashSet<Category> = orders.iter().map(|order| order.category).collect();
    assert_eq!(categories.len(), Category::ALL.len());
}

#[test]
fn rejects_invalid_options_before_generating() {
    let err = OrderGenerator::new(options(0, 1))
        .generate()
        .expect_err("zero rows must fail");
    assert!(matches!(err, GenerationError::InvalidOptions(_)));

    let inverted = GeneratorOptions {
        rows: 10,
        window_start: NaiveDate::from_ymd_opt(2024, 6, 1).expect("start"),
        window_end: NaiveDate::from_ymd_opt(2024, 5, 1).expect("end"),
        seed: 1,
    };
    let err = OrderGenerator::new(inverted)
        .generate()
        .expect_err("inverted window must fail");
    assert!(matches!(err, GenerationError::InvalidOptions(_)));
}

#[test]
fn single_day_window_is_accepted() {
    let day = NaiveDate::from_ymd_opt(2024, 7, 15).expect("day");
    let opts = GeneratorOptions {
        rows: 50,
        window_start: day,
        window_end: day,
        seed: 9,
    };
    let orders = OrderGenerator::new(opts).generate().expect("generate");
    for order in &orders {
        assert_eq!(order.order_timestamp.date(), day);
    }
}
