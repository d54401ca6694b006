//! Order handlers.
//!
//! Order creation resolves every referenced product, snapshots its current
//! price into the line item, and writes the order in a single insert. Reads
//! re-join line items against the catalog for display, so product details
//! reflect the catalog as it is now, not as it was at purchase time.

use std::collections::HashSet;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{OrderId, Page, ProductId};

use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, FieldError, Result};
use crate::models::{NewOrder, Order, OrderItem, order_total};
use crate::state::AppState;

/// Display name used when an item's product no longer resolves.
const MISSING_PRODUCT_NAME: &str = "Product Not Available";

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/order/{order_id}", get(get_order))
        .route("/{user_id}", get(list_orders))
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CreateOrderItem>,
}

/// One requested line item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub product_id: String,
    pub qty: u32,
}

impl CreateOrderRequest {
    /// Check the order invariants that do not require catalog lookups.
    fn validate(&self) -> std::result::Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.user_id.trim().is_empty() {
            errors.push(FieldError::new("userId", "must not be empty"));
        }
        if self.items.is_empty() {
            errors.push(FieldError::new("items", "must contain at least one item"));
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.qty == 0 {
                errors.push(FieldError::new(
                    format!("items[{index}].qty"),
                    "must be at least 1",
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Response for a created order.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: OrderId,
}

/// Query parameters for the order listing.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Product details joined in at read time.
#[derive(Debug, Serialize)]
pub struct ProductDetails {
    pub id: ProductId,
    pub name: String,
}

/// One order line item with its display enrichment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOrderItem {
    pub product_details: ProductDetails,
    pub qty: u32,
}

/// Full order response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<EnrichedOrderItem>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full order listing response.
#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    pub data: Vec<OrderResponse>,
    pub page: Page,
}

/// Create a new order.
///
/// Every referenced product must exist; the current catalog price is
/// snapshotted into each line item and the total is fixed at creation time.
/// Nothing is persisted unless every item resolves. The price lookup and the
/// insert are not guarded against a concurrent price change.
///
/// # Errors
///
/// Returns 422 for invariant violations and 404 if any `productId` is
/// malformed or unknown.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    body.validate().map_err(AppError::Validation)?;

    let products = ProductRepository::new(state.pool());
    let mut items = Vec::with_capacity(body.items.len());

    for item in &body.items {
        let not_found = || AppError::NotFound(format!("Product {} not found", item.product_id));

        // A malformed id cannot reference anything, so it reads as missing.
        let product_id = item.product_id.parse::<ProductId>().map_err(|_| not_found())?;
        let product = products
            .find_by_id(product_id)
            .await?
            .ok_or_else(not_found)?;

        items.push(OrderItem {
            product_id,
            qty: item.qty,
            price: product.price,
        });
    }

    let total = order_total(&items);
    let order = OrderRepository::new(state.pool())
        .insert(NewOrder {
            user_id: body.user_id,
            items,
            total,
        })
        .await?;

    tracing::info!(order_id = %order.id, total = %order.total, "Order created");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: order.id })))
}

/// List a user's orders with pagination and per-item enrichment.
///
/// A user with no orders gets an empty page, not a 404.
///
/// # Errors
///
/// Returns 500 if the store query fails.
pub async fn list_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ListOrdersResponse>> {
    let limit = state.config().page_limits.resolve(query.limit);
    let offset = query.offset.unwrap_or(0);

    let orders = OrderRepository::new(state.pool())
        .list_for_user(&user_id, limit, offset)
        .await?;
    let data = enrich_orders(&state, orders).await?;

    Ok(Json(ListOrdersResponse {
        data,
        page: Page::from_offsets(limit, offset),
    }))
}

/// Get a single order by ID, with the same enrichment as the listing.
///
/// # Errors
///
/// Returns 404 if the id is malformed or no order matches it.
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>> {
    let not_found = || AppError::NotFound(format!("Order {order_id} not found"));

    let id = order_id.parse::<OrderId>().map_err(|_| not_found())?;
    let order = OrderRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(&not_found)?;

    let mut enriched = enrich_orders(&state, vec![order]).await?;
    enriched.pop().map(Json).ok_or_else(not_found)
}

/// Join order items against current catalog names, one batched query per
/// call. Items whose product no longer resolves keep their stored id and get
/// a placeholder name; a stale order never fails to render.
async fn enrich_orders(state: &AppState, orders: Vec<Order>) -> Result<Vec<OrderResponse>> {
    let ids: Vec<ProductId> = orders
        .iter()
        .flat_map(|order| order.items.iter().map(|item| item.product_id))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let names = ProductRepository::new(state.pool()).find_names(&ids).await?;

    Ok(orders
        .into_iter()
        .map(|order| OrderResponse {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: order
                .items
                .into_iter()
                .map(|item| {
                    let name = names
                        .get(&item.product_id)
                        .cloned()
                        .unwrap_or_else(|| MISSING_PRODUCT_NAME.to_string());
                    if name == MISSING_PRODUCT_NAME {
                        tracing::warn!(
                            product_id = %item.product_id,
                            "Order references a product that no longer resolves"
                        );
                    }
                    EnrichedOrderItem {
                        product_details: ProductDetails {
                            id: item.product_id,
                            name,
                        },
                        qty: item.qty,
                    }
                })
                .collect(),
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(user_id: &str, items: &[(&str, u32)]) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: user_id.to_string(),
            items: items
                .iter()
                .map(|(product_id, qty)| CreateOrderItem {
                    product_id: (*product_id).to_string(),
                    qty: *qty,
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let id = ProductId::generate().to_string();
        assert!(request("u1", &[(id.as_str(), 2)]).validate().is_ok());
    }

    #[test]
    fn test_blank_user_id_is_rejected() {
        let errors = request("  ", &[("x", 1)]).validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "userId"));
    }

    #[test]
    fn test_empty_items_are_rejected() {
        let errors = request("u1", &[]).validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "items"));
    }

    #[test]
    fn test_zero_qty_is_rejected() {
        let errors = request("u1", &[("a", 1), ("b", 0)]).validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().any(|e| e.field == "items[1].qty"));
    }
}
