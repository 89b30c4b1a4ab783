//! Order data model.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};

use super::package::PackageType;

/// A parcel stored at the pickup point.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    /// Last day the order is kept for the client.
    pub storage_until: NaiveDate,
    pub issued: bool,
    pub issued_at: Option<DateTime<Utc>>,
    pub returned: bool,
    /// Order price including packaging once accepted.
    pub order_price: f64,
    pub weight: f64,
    pub package_type: Option<PackageType>,
    pub package_price: f64,
    pub hash: String,
}

impl Order {
    /// Creates a fresh, not yet packaged order.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        storage_until: NaiveDate,
        order_price: f64,
        weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            storage_until,
            issued: false,
            issued_at: None,
            returned: false,
            order_price,
            weight,
            package_type: None,
            package_price: 0.0,
            hash: String::new(),
        }
    }
}

/// Offset/limit window for list commands. `limit == 0` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    /// Applies the window to an already ordered list.
    pub fn slice<T>(self, items: Vec<T>) -> Vec<T> {
        let it = items.into_iter().skip(self.offset);
        if self.limit == 0 {
            it.collect()
        } else {
            it.take(self.limit).collect()
        }
    }
}

/// Orders ids numerically when both are numbers, lexically otherwise.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Renders orders as the fixed-width listing shown to the operator.
pub fn render_orders(orders: &[Order]) -> String {
    let mut out = format!(
        "{:<5}{:<10}{:<15}{:<15}{:<10}{:<13}{:<10}{:<13}{:<13}\n",
        "id",
        "user_id",
        "storage_until",
        "issued_at",
        "returned",
        "order_price",
        "weight",
        "package_type",
        "package_price"
    );
    out.push_str(&"-".repeat(100));
    out.push('\n');
    for o in orders {
        let issued_at = o
            .issued_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let package = o.package_type.map(|p| p.as_str()).unwrap_or("-");
        out.push_str(&format!(
            "{:<5}{:<10}{:<15}{:<15}{:<10}{:<13}{:<10}{:<13}{:<13}\n",
            o.id,
            o.user_id,
            o.storage_until.format("%Y-%m-%d").to_string(),
            issued_at,
            o.returned,
            o.order_price,
            o.weight,
            package,
            o.package_price
        ));
    }
    out
}
