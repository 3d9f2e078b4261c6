use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use ordermart_core::{Category, OrderRecord, OrderStatus};

use crate::errors::GenerationError;

/// Column order shared by the snapshot file and the raw tables.
pub const CSV_HEADER: [&str; 8] = [
    "order_id",
    "order_timestamp",
    "customer_id",
    "product_id",
    "category",
    "price",
    "quantity",
    "status",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Path of the snapshot file for a given run date.
pub fn snapshot_path(out_dir: &Path, run_date: NaiveDate) -> PathBuf {
    out_dir.join(format!("orders_{}.csv", run_date.format("%Y%m%d")))
}

/// Write a batch of orders as CSV with a fixed header row.
///
/// Returns the number of bytes written.
pub fn write_orders_csv(path: &Path, orders: &[OrderRecord]) -> Result<u64, GenerationError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(path)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(CSV_HEADER)?;
    for order in orders {
        writer.write_record(&[
            order.order_id.to_string(),
            order.order_timestamp.format(TIMESTAMP_FORMAT).to_string(),
            order.customer_id.to_string(),
            order.product_id.to_string(),
            order.category.as_str().to_string(),
            format!("{:.2}", order.price),
            order.quantity.to_string(),
            order.status.as_str().to_string(),
        ])?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

/// Read a snapshot file back into order records.
///
/// A missing file is a configuration error surfaced before any store
/// mutation; malformed rows name the offending column.
pub fn read_orders_csv(path: &Path) -> Result<Vec<OrderRecord>, GenerationError> {
    if !path.exists() {
        return Err(GenerationError::InvalidOptions(format!(
            "snapshot not found at {}; run generate first",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut orders = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = index + 2;
        orders.push(parse_record(&record, line)?);
    }
    Ok(orders)
}

fn parse_record(record: &csv::StringRecord, line: usize) -> Result<OrderRecord, GenerationError> {
    let order_id: i64 = parse_field(record, 0, "order_id", line)?;

    let timestamp = raw_field(record, 1, "order_timestamp", line)?;
    let order_timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .map_err(|_| invalid_value("order_timestamp", timestamp, line))?;

    let customer_id: i64 = parse_field(record, 2, "customer_id", line)?;
    let product_id: i64 = parse_field(record, 3, "product_id", line)?;

    let category = raw_field(record, 4, "category", line)?;
    let category =
        Category::parse(category).ok_or_else(|| invalid_value("category", category, line))?;

    let price: f64 = parse_field(record, 5, "price", line)?;
    let quantity: i32 = parse_field(record, 6, "quantity", line)?;

    let status = raw_field(record, 7, "status", line)?;
    let status =
        OrderStatus::parse(status).ok_or_else(|| invalid_value("status", status, line))?;

    Ok(OrderRecord {
        order_id,
        order_timestamp,
        customer_id,
        product_id,
        category,
        price,
        quantity,
        status,
    })
}

fn raw_field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<&'a str, GenerationError> {
    record.get(index).ok_or_else(|| {
        GenerationError::InvalidSnapshot(format!("line {line}: missing column '{name}'"))
    })
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<T, GenerationError> {
    let raw = raw_field(record, index, name, line)?;
    raw.parse::<T>().map_err(|_| invalid_value(name, raw, line))
}

fn invalid_value(name: &str, value: &str, line: usize) -> GenerationError {
    GenerationError::InvalidSnapshot(format!("line {line}: invalid {name} '{value}'"))
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
