//! Domain types.
//!
//! These types represent validated domain objects separate from database row
//! shapes and wire DTOs. Row decoding happens in [`crate::db`]; wire shapes
//! live next to their handlers in [`crate::routes`].

pub mod order;
pub mod product;

pub use order::{NewOrder, Order, OrderItem, order_total};
pub use product::{NewProduct, Product, ProductFilter, ProductSize, ProductSummary};
