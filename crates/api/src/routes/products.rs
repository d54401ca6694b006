//! Product catalog handlers.

use std::collections::HashSet;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{Page, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, FieldError, Result};
use crate::models::{NewProduct, ProductFilter, ProductSize};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/{id}", get(get_product))
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub sizes: Vec<ProductSize>,
}

impl CreateProductRequest {
    /// Check the product invariants and convert into a validated input.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint as a field-level error.
    fn into_validated(self) -> std::result::Result<NewProduct, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "must not be empty"));
        }
        if self.price < Decimal::ZERO {
            errors.push(FieldError::new("price", "must be non-negative"));
        }
        if self.sizes.is_empty() {
            errors.push(FieldError::new("sizes", "must contain at least one entry"));
        }

        let mut seen_labels = HashSet::new();
        for (index, entry) in self.sizes.iter().enumerate() {
            if entry.size.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("sizes[{index}].size"),
                    "must not be empty",
                ));
            } else if !seen_labels.insert(entry.size.as_str()) {
                errors.push(FieldError::new(
                    format!("sizes[{index}].size"),
                    format!("duplicate size label `{}`", entry.size),
                ));
            }
        }

        if errors.is_empty() {
            Ok(NewProduct {
                name: self.name,
                price: self.price,
                sizes: self.sizes,
            })
        } else {
            Err(errors)
        }
    }
}

/// Response for a created product.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: ProductId,
}

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub name: Option<String>,
    pub size: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// One listing entry; the `sizes` detail is deliberately excluded.
#[derive(Debug, Serialize)]
pub struct ProductListItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
}

/// Full listing response.
#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub data: Vec<ProductListItem>,
    pub page: Page,
}

/// Full product detail, including sizes.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub sizes: Vec<ProductSize>,
}

/// Create a new product.
///
/// # Errors
///
/// Returns 422 with field-level detail if any product invariant is violated.
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let new = body.into_validated().map_err(AppError::Validation)?;

    let id = ProductRepository::new(state.pool()).insert(&new).await?;
    tracing::info!(product_id = %id, "Product created");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// List products with optional filters and offset pagination.
///
/// An empty result is a valid page, never a 404. The `next` hint is plain
/// offset arithmetic and may point past the end of the catalog.
///
/// # Errors
///
/// Returns 500 if the store query fails.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ListProductsResponse>> {
    let limit = state.config().page_limits.resolve(query.limit);
    let offset = query.offset.unwrap_or(0);

    let filter = ProductFilter {
        name: query.name.filter(|name| !name.is_empty()),
        size: query.size.filter(|size| !size.is_empty()),
    };

    let data = ProductRepository::new(state.pool())
        .list(&filter, limit, offset)
        .await?
        .into_iter()
        .map(|summary| ProductListItem {
            id: summary.id,
            name: summary.name,
            price: summary.price,
        })
        .collect();

    Ok(Json(ListProductsResponse {
        data,
        page: Page::from_offsets(limit, offset),
    }))
}

/// Get a full product by ID.
///
/// # Errors
///
/// Returns 404 if the id is malformed or no product matches it.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let not_found = || AppError::NotFound(format!("Product {id} not found"));

    let product_id = id.parse::<ProductId>().map_err(|_| not_found())?;
    let product = ProductRepository::new(state.pool())
        .find_by_id(product_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ProductResponse {
        id: product.id,
        name: product.name,
        price: product.price,
        sizes: product.sizes,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(name: &str, price: &str, sizes: &[(&str, u32)]) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            price: price.parse().unwrap(),
            sizes: sizes
                .iter()
                .map(|(size, quantity)| ProductSize {
                    size: (*size).to_string(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let new = request("Tee", "10.0", &[("M", 5)]).into_validated().unwrap();
        assert_eq!(new.name, "Tee");
        assert_eq!(new.sizes.len(), 1);
    }

    #[test]
    fn test_zero_price_is_allowed() {
        assert!(request("Freebie", "0", &[("M", 1)]).into_validated().is_ok());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let errors = request("   ", "10.0", &[("M", 5)])
            .into_validated()
            .unwrap_err();
        assert!(errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let errors = request("Tee", "-1.00", &[("M", 5)])
            .into_validated()
            .unwrap_err();
        assert!(errors.iter().any(|e| e.field == "price"));
    }

    #[test]
    fn test_empty_sizes_are_rejected() {
        let errors = request("Tee", "10.0", &[]).into_validated().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "sizes"));
    }

    #[test]
    fn test_duplicate_size_labels_are_rejected() {
        let errors = request("Tee", "10.0", &[("M", 5), ("L", 2), ("M", 1)])
            .into_validated()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().field, "sizes[2].size");
    }

    #[test]
    fn test_blank_size_label_is_rejected() {
        let errors = request("Tee", "10.0", &[("", 5)])
            .into_validated()
            .unwrap_err();
        assert!(errors.iter().any(|e| e.field == "sizes[0].size"));
    }

    #[test]
    fn test_all_violations_are_reported_together() {
        let errors = request("", "-5", &[]).into_validated().unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
