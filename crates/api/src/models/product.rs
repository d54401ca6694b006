//! Product domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::ProductId;

/// A catalog product (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price. Non-negative.
    pub price: Decimal,
    /// Available sizes, in the order they were submitted. Labels are unique
    /// within one product.
    pub sizes: Vec<ProductSize>,
}

/// One size entry of a product.
///
/// Also the stored JSON shape of an element of the `sizes` column, so the
/// wire field names are part of the storage format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSize {
    /// Size label, e.g. "S", "M", "XL".
    pub size: String,
    /// Units on hand for this size.
    pub quantity: u32,
}

/// Listing projection: everything but the `sizes` detail.
#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
}

/// Input for creating a product. Validation happens at the route boundary;
/// by the time this exists the fields satisfy the product invariants.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub sizes: Vec<ProductSize>,
}

/// Optional listing filters.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the product name.
    pub name: Option<String>,
    /// Exact match against any size label of the product.
    pub size: Option<String>,
}
