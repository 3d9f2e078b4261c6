use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use ordermart_core::{Category, OrderRecord, OrderStatus};
use ordermart_generate::{
    GenerationError, GeneratorOptions, OrderGenerator, read_orders_csv, snapshot_path,
    write_orders_csv,
};

fn temp_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("ordermart_snapshot_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn sample_order() -> OrderRecord {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).expect("date");
    OrderRecord {
        order_id: 1,
        order_timestamp: date.and_hms_opt(8, 5, 9).expect("timestamp"),
        customer_id: 42,
        product_id: 7,
        category: Category::Electronics,
        price: 199.9,
        quantity: 2,
        status: OrderStatus::Shipped,
    }
}

#[test]
fn header_and_row_format_are_stable() {
    let dir = temp_dir("format");
    let path = dir.join("orders.csv");
    write_orders_csv(&path, &[sample_order()]).expect("write snapshot");

    let contents = fs::read_to_string(&path).expect("read snapshot");
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("order_id,order_timestamp,customer_id,product_id,category,price,quantity,status")
    );
    assert_eq!(
        lines.next(),
        Some("1,2024-02-29 08:05:09,42,7,electronics,199.90,2,shipped")
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn snapshot_path_is_keyed_by_run_date() {
    let run_date = NaiveDate::from_ymd_opt(2026, 8, 4).expect("run date");
    let path = snapshot_path(&PathBuf::from("data/raw"), run_date);
    assert_eq!(path, PathBuf::from("data/raw/orders_20260804.csv"));
}

#[test]
fn bytes_written_matches_file_size() {
    let dir = temp_dir("bytes");
    let path = dir.join("orders.csv");
    let orders = OrderGenerator::new(GeneratorOptions {
        rows: 20,
        seed: 17,
        ..GeneratorOptions::default()
    })
    .generate()
    .expect("generate");

    let bytes = write_orders_csv(&path, &orders).expect("write snapshot");
    let metadata = fs::metadata(&path).expect("stat snapshot");
    assert_eq!(bytes, metadata.len());
}

#[test]
fn written_snapshot_reads_back_identically() {
    let dir = temp_dir("round");
    let path = dir.join("orders.csv");
    let orders = OrderGenerator::new(GeneratorOptions {
        rows: 100,
        seed: 23,
        ..GeneratorOptions::default()
    })
    .generate()
    .expect("generate");

    write_orders_csv(&path, &orders).expect("write snapshot");
    let loaded = read_orders_csv(&path).expect("read snapshot");
    assert_eq!(loaded, orders);
}

#[test]
fn missing_snapshot_is_a_configuration_error() {
    let dir = temp_dir("missing");
    let err = read_orders_csv(&dir.join("orders_19700101.csv")).expect_err("must fail");
    assert!(matches!(err, GenerationError::InvalidOptions(_)));
}

#[test]
fn malformed_rows_name_the_offending_column() {
    let dir = temp_dir("malformed");
    let path = dir.join("orders.csv");
    fs::write(
        &path,
        "order_id,order_timestamp,customer_id,product_id,category,price,quantity,status\n\
         1,2024-02-29 08:05:09,42,7,groceries,19.90,2,shipped\n",
    )
    .expect("write csv");

    let err = read_orders_csv(&path).expect_err("unknown category must fail");
    match err {
        GenerationError::InvalidSnapshot(message) => {
            assert!(message.contains("category"), "unexpected message: {message}");
            assert!(message.contains("line 2"), "unexpected message: {message}");
        }
        other => panic!("expected InvalidSnapshot, got {other:?}"),
    }
}
