use sqlx::SqlitePool;
use tracing::info;

use crate::db;
use crate::error::AppResult;
use crate::models::CreateProduct;

/// (nombre, imagen, precio, categoria)
static SAMPLE_PRODUCTS: &[(&str, &str, f64, &str)] = &[
    ("Vela aromática", "vela1.jpg", 1500.0, "velas"),
    ("Sahumerio de lavanda", "sahumerio1.jpg", 700.0, "sahumerios"),
    ("Perfume de auto", "perfume1.jpg", 900.0, "perfumes"),
];

/// Insert the sample catalog when `productos` is empty. Returns how many rows
/// were added; an already populated table is left alone.
pub async fn seed_sample_products(pool: &SqlitePool) -> AppResult<usize> {
    let existing = db::count_products(pool).await?;
    if existing > 0 {
        info!(existing, "Products present, skipping sample seed");
        return Ok(0);
    }

    for (name, image, price, category) in SAMPLE_PRODUCTS {
        let payload = CreateProduct {
            name: name.to_string(),
            price: *price,
            category: category.to_string(),
        };
        db::insert_product(pool, &payload, Some(*image)).await?;
    }

    info!(count = SAMPLE_PRODUCTS.len(), "Seeded sample products");
    Ok(SAMPLE_PRODUCTS.len())
}
