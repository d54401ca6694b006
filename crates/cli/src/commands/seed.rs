//! Demo data seeding command.

use rust_decimal::Decimal;

use stockroom_api::config::ApiConfig;
use stockroom_api::db::{self, ProductRepository};
use stockroom_api::models::{NewProduct, ProductSize};

/// Seed the catalog with a small demo dataset.
///
/// Runs migrations first so the command works against a fresh store. Seeding
/// is additive; running it twice creates a second copy of each product.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the store is unreachable,
/// or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let products = ProductRepository::new(&pool);
    for product in demo_catalog() {
        let id = products.insert(&product).await?;
        tracing::info!(product_id = %id, name = %product.name, "Seeded product");
    }

    pool.close().await;
    tracing::info!("Seeding complete");
    Ok(())
}

fn demo_catalog() -> Vec<NewProduct> {
    vec![
        demo_product("Classic T-Shirt", "19.99", &[("S", 10), ("M", 15), ("L", 8)]),
        demo_product("Jeans", "49.99", &[("30", 6), ("32", 9), ("34", 4)]),
        demo_product("Hoodie", "39.99", &[("M", 5), ("L", 5), ("XL", 3)]),
        demo_product("Baseball Cap", "14.99", &[("One Size", 25)]),
    ]
}

fn demo_product(name: &str, price: &str, sizes: &[(&str, u32)]) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: price.parse::<Decimal>().unwrap_or(Decimal::ZERO),
        sizes: sizes
            .iter()
            .map(|(size, quantity)| ProductSize {
                size: (*size).to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}
