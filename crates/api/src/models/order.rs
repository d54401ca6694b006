//! Order domain types and the snapshot-total computation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{OrderId, ProductId};

/// A placed order (domain type). Immutable once created.
#[derive(Debug, Clone)]
pub struct Order {
    /// Store-assigned identifier.
    pub id: OrderId,
    /// Opaque foreign key; no referential integrity is enforced.
    pub user_id: String,
    /// Line items in submission order.
    pub items: Vec<OrderItem>,
    /// Snapshot total: fixed at creation time from the prices current then,
    /// never recomputed when catalog prices change.
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line item of an order.
///
/// Also the stored JSON shape of an element of the `items` column. The unit
/// `price` is the snapshot taken at creation; display enrichment at read time
/// deliberately goes back to the catalog instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub qty: u32,
    pub price: Decimal,
}

/// Input for creating an order, with per-item prices already resolved.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
}

/// Sum of `price * qty` over all items, in exact decimal arithmetic.
#[must_use]
pub fn order_total(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.price * Decimal::from(item.qty))
        .sum()
}
