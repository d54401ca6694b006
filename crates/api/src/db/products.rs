//! Product repository.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Row, Sqlite, sqlite::SqliteRow};

use stockroom_core::ProductId;

use super::{DbPool, RepositoryError, decode_decimal};
use crate::models::{NewProduct, Product, ProductFilter, ProductSize, ProductSummary};

/// Repository for the `products` collection.
pub struct ProductRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new product and return its store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, new: &NewProduct) -> Result<ProductId, RepositoryError> {
        let id = ProductId::generate();
        let sizes = serde_json::to_string(&new.sizes)
            .map_err(|e| RepositoryError::Decode(format!("failed to encode sizes: {e}")))?;

        sqlx::query("INSERT INTO products (id, name, price, sizes) VALUES (?, ?, ?, ?)")
            .bind(id.to_string())
            .bind(&new.name)
            .bind(new.price.to_string())
            .bind(sizes)
            .execute(self.pool)
            .await?;

        Ok(id)
    }

    /// Get a full product (including sizes) by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::Decode` if the stored row is malformed.
    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, price, sizes FROM products WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    /// List products matching `filter`, in insertion order.
    ///
    /// The name filter is a case-insensitive substring match; the size filter
    /// matches products containing a size entry whose label equals it
    /// exactly. Only the listing projection (id, name, price) is fetched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::Decode` if a stored row is malformed.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name, price FROM products");
        let mut keyword = " WHERE";

        if let Some(name) = &filter.name {
            // SQLite LIKE folds case for ASCII, matching the original
            // case-insensitive substring semantics.
            query.push(keyword).push(" name LIKE ");
            query.push_bind(format!("%{}%", escape_like(name)));
            query.push(" ESCAPE '\\'");
            keyword = " AND";
        }

        if let Some(size) = &filter.size {
            query.push(keyword).push(
                " EXISTS (SELECT 1 FROM json_each(products.sizes)
                   WHERE json_extract(json_each.value, '$.size') = ",
            );
            query.push_bind(size);
            query.push(")");
        }

        query.push(" ORDER BY rowid LIMIT ");
        query.push_bind(i64::from(limit));
        query.push(" OFFSET ");
        query.push_bind(i64::from(offset));

        let rows = query.build().fetch_all(self.pool).await?;
        rows.iter().map(row_to_summary).collect()
    }

    /// Fetch display names for a batch of products in a single query.
    ///
    /// Products that do not exist are simply absent from the result map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::Decode` if a stored row is malformed.
    pub async fn find_names(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, String>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name FROM products WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        query.push(")");

        let rows = query.build().fetch_all(self.pool).await?;

        let mut names = HashMap::with_capacity(rows.len());
        for row in &rows {
            names.insert(decode_id(row)?, row.try_get::<String, _>("name")?);
        }
        Ok(names)
    }
}

/// Escape `LIKE` metacharacters in user input (used with `ESCAPE '\'`).
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn decode_id(row: &SqliteRow) -> Result<ProductId, RepositoryError> {
    let raw: String = row.try_get("id")?;
    raw.parse::<ProductId>()
        .map_err(|e| RepositoryError::Decode(format!("invalid product id `{raw}`: {e}")))
}

fn row_to_summary(row: &SqliteRow) -> Result<ProductSummary, RepositoryError> {
    let price: String = row.try_get("price")?;

    Ok(ProductSummary {
        id: decode_id(row)?,
        name: row.try_get("name")?,
        price: decode_decimal("price", &price)?,
    })
}

fn row_to_product(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let summary = row_to_summary(row)?;
    let sizes: String = row.try_get("sizes")?;
    let sizes: Vec<ProductSize> = serde_json::from_str(&sizes)
        .map_err(|e| RepositoryError::Decode(format!("invalid sizes document: {e}")))?;

    Ok(Product {
        id: summary.id,
        name: summary.name,
        price: summary.price,
        sizes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::memory_pool;
    use super::*;

    fn new_product(name: &str, price: &str, sizes: &[(&str, u32)]) -> NewProduct {
        NewProduct {
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

    #[tokio::test]
    async fn insert_then_find_round_trips_all_fields() {
        let pool = memory_pool().await;
        let repo = ProductRepository::new(&pool);

        let input = new_product("Classic T-Shirt", "19.99", &[("S", 3), ("M", 5)]);
        let id = repo.insert(&input).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.name, "Classic T-Shirt");
        assert_eq!(found.price, input.price);
        assert_eq!(found.sizes, input.sizes);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let pool = memory_pool().await;
        let repo = ProductRepository::new(&pool);

        let missing = repo.find_by_id(ProductId::generate()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order_and_projects_summary() {
        let pool = memory_pool().await;
        let repo = ProductRepository::new(&pool);

        for name in ["First", "Second", "Third"] {
            repo.insert(&new_product(name, "1.00", &[("M", 1)]))
                .await
                .unwrap();
        }

        let listed = repo.list(&ProductFilter::default(), 10, 0).await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn list_applies_limit_and_offset() {
        let pool = memory_pool().await;
        let repo = ProductRepository::new(&pool);

        for i in 0..5 {
            repo.insert(&new_product(&format!("P{i}"), "1.00", &[("M", 1)]))
                .await
                .unwrap();
        }

        let page = repo.list(&ProductFilter::default(), 2, 2).await.unwrap();
        let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["P2", "P3"]);
    }

    #[tokio::test]
    async fn name_filter_is_case_insensitive_substring() {
        let pool = memory_pool().await;
        let repo = ProductRepository::new(&pool);

        repo.insert(&new_product("Classic T-Shirt", "19.99", &[("M", 1)]))
            .await
            .unwrap();
        repo.insert(&new_product("Jeans", "39.99", &[("32", 1)]))
            .await
            .unwrap();

        let filter = ProductFilter {
            name: Some("shirt".to_string()),
            size: None,
        };
        let matched = repo.list(&filter, 10, 0).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.first().unwrap().name, "Classic T-Shirt");
    }

    #[tokio::test]
    async fn name_filter_does_not_treat_percent_as_wildcard() {
        let pool = memory_pool().await;
        let repo = ProductRepository::new(&pool);

        repo.insert(&new_product("100% Cotton Tee", "9.99", &[("M", 1)]))
            .await
            .unwrap();
        repo.insert(&new_product("Polyester Tee", "9.99", &[("M", 1)]))
            .await
            .unwrap();

        let filter = ProductFilter {
            name: Some("100%".to_string()),
            size: None,
        };
        let matched = repo.list(&filter, 10, 0).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.first().unwrap().name, "100% Cotton Tee");
    }

    #[tokio::test]
    async fn size_filter_matches_label_exactly() {
        let pool = memory_pool().await;
        let repo = ProductRepository::new(&pool);

        repo.insert(&new_product("Hoodie", "49.99", &[("XL", 2)]))
            .await
            .unwrap();
        repo.insert(&new_product("Cap", "14.99", &[("L", 9)]))
            .await
            .unwrap();

        let filter = ProductFilter {
            name: None,
            size: Some("XL".to_string()),
        };
        let matched = repo.list(&filter, 10, 0).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.first().unwrap().name, "Hoodie");

        // "L" must not match "XL" via substring.
        let filter = ProductFilter {
            name: None,
            size: Some("L".to_string()),
        };
        let matched = repo.list(&filter, 10, 0).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.first().unwrap().name, "Cap");
    }

    #[tokio::test]
    async fn find_names_batches_and_skips_missing() {
        let pool = memory_pool().await;
        let repo = ProductRepository::new(&pool);

        let tee = repo
            .insert(&new_product("Tee", "10.0", &[("M", 5)]))
            .await
            .unwrap();
        let missing = ProductId::generate();

        let names = repo.find_names(&[tee, missing]).await.unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names.get(&tee).map(String::as_str), Some("Tee"));
        assert!(!names.contains_key(&missing));
    }
}
