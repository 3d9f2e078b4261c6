use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Product category carried by every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Fashion,
    Home,
    Books,
}

impl Category {
    /// The closed set of categories, in generation order.
    pub const ALL: [Category; 4] = [
        Category::Electronics,
        Category::Fashion,
        Category::Home,
        Category::Books,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Fashion => "fashion",
            Category::Home => "home",
            Category::Books => "books",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "electronics" => Some(Category::Electronics),
            "fashion" => Some(Category::Fashion),
            "home" => Some(Category::Home),
            "books" => Some(Category::Books),
            _ => None,
        }
    }

    /// Inclusive unit-price range for this category.
    pub fn price_range(&self) -> (f64, f64) {
        match self {
            Category::Electronics => (50.0, 1000.0),
            Category::Fashion => (10.0, 400.0),
            Category::Home => (40.0, 3000.0),
            Category::Books => (6.0, 70.0),
        }
    }
}

/// Fulfilment status; staging only admits values from this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Map a uniform draw in `[0, 1)` onto the weighted status
    /// distribution: delivered 75%, shipped 15%, pending 8%, cancelled 2%.
    pub fn from_uniform(draw: f64) -> Self {
        if draw < 0.75 {
            OrderStatus::Delivered
        } else if draw < 0.90 {
            OrderStatus::Shipped
        } else if draw < 0.98 {
            OrderStatus::Pending
        } else {
            OrderStatus::Cancelled
        }
    }
}

/// One synthetic order, as generated and as loaded into the raw layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: i64,
    pub order_timestamp: NaiveDateTime,
    pub customer_id: i64,
    pub product_id: i64,
    pub category: Category,
    pub price: f64,
    pub quantity: i32,
    pub status: OrderStatus,
}

impl OrderRecord {
    /// Revenue for this order line, as derived in staging.
    pub fn total_amount(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Customer segment derived from lifetime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "VIP")]
    Vip,
    High,
    Medium,
    Low,
}

impl Segment {
    /// Inclusive lifetime-value lower bound for VIP.
    pub const VIP_THRESHOLD: f64 = 10_000.0;
    /// Inclusive lifetime-value lower bound for High.
    pub const HIGH_THRESHOLD: f64 = 3_000.0;
    /// Inclusive lifetime-value lower bound for Medium.
    pub const MEDIUM_THRESHOLD: f64 = 500.0;

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Vip => "VIP",
            Segment::High => "High",
            Segment::Medium => "Medium",
            Segment::Low => "Low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "VIP" => Some(Segment::Vip),
            "High" => Some(Segment::High),
            "Medium" => Some(Segment::Medium),
            "Low" => Some(Segment::Low),
            _ => None,
        }
    }

    /// Apply the fixed threshold rule. The mart builder renders its SQL
    /// CASE from the same constants so the two cannot drift.
    pub fn from_lifetime_value(value: f64) -> Self {
        if value >= Self::VIP_THRESHOLD {
            Segment::Vip
        } else if value >= Self::HIGH_THRESHOLD {
            Segment::High
        } else if value >= Self::MEDIUM_THRESHOLD {
            Segment::Medium
        } else {
            Segment::Low
        }
    }
}
