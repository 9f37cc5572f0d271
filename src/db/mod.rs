use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{AppError, AppResult};
use crate::models::*;

/// Outcome of an id-targeted update or delete, with the image reference the
/// row held before the statement ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Replaced {
    pub rows_affected: u64,
    pub previous_image: Option<String>,
}

// ── Pool ──────────────────────────────────────────────────────────────────────

pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create both tables if absent. Safe to run on every start.
pub async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(e.into()))
}

// ── Products ──────────────────────────────────────────────────────────────────

pub async fn fetch_all_products(pool: &SqlitePool) -> AppResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT id, nombre, imagen, precio, categoria FROM productos ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(products)
}

/// Exact, case-sensitive match on `categoria`, in insertion order.
pub async fn fetch_products_by_category(pool: &SqlitePool, category: &str) -> AppResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT id, nombre, imagen, precio, categoria
         FROM productos WHERE categoria = ? ORDER BY id",
    )
    .bind(category)
    .fetch_all(pool)
    .await?;

    Ok(products)
}

pub async fn fetch_product_by_id(pool: &SqlitePool, id: i64) -> AppResult<Product> {
    sqlx::query_as::<_, Product>(
        "SELECT id, nombre, imagen, precio, categoria FROM productos WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
}

pub async fn insert_product(
    pool: &SqlitePool,
    payload: &CreateProduct,
    image: Option<&str>,
) -> AppResult<i64> {
    let result = sqlx::query(
        "INSERT INTO productos (nombre, imagen, precio, categoria) VALUES (?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(image)
    .bind(payload.price)
    .bind(&payload.category)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Merge `changes` over the stored row. Without a new `image` the stored
/// reference is written back unchanged.
pub async fn update_product(
    pool: &SqlitePool,
    id: i64,
    changes: &UpdateProduct,
    image: Option<&str>,
) -> AppResult<Replaced> {
    // Read-before-write; not transactional with the UPDATE below.
    let existing = fetch_product_by_id(pool, id).await?;

    let result = sqlx::query(
        "UPDATE productos
         SET nombre = ?, imagen = ?, precio = ?, categoria = ?
         WHERE id = ?",
    )
    .bind(changes.name.as_deref().or(existing.name.as_deref()))
    .bind(image.or(existing.image.as_deref()))
    .bind(changes.price.or(existing.price))
    .bind(changes.category.as_deref().or(existing.category.as_deref()))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Product {} not found", id)));
    }

    Ok(Replaced {
        rows_affected: result.rows_affected(),
        previous_image: existing.image,
    })
}

pub async fn delete_product(pool: &SqlitePool, id: i64) -> AppResult<Replaced> {
    let removed = sqlx::query_scalar::<_, Option<String>>(
        "DELETE FROM productos WHERE id = ? RETURNING imagen",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .next();

    match removed {
        Some(previous_image) => Ok(Replaced {
            rows_affected: 1,
            previous_image,
        }),
        None => Err(AppError::NotFound(format!("Product {} not found", id))),
    }
}

pub async fn count_products(pool: &SqlitePool) -> AppResult<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM productos")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

// ── Categories ────────────────────────────────────────────────────────────────

pub async fn fetch_all_categories(pool: &SqlitePool) -> AppResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, nombre, imagen FROM categorias ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

pub async fn fetch_category_by_id(pool: &SqlitePool, id: i64) -> AppResult<Category> {
    sqlx::query_as::<_, Category>("SELECT id, nombre, imagen FROM categorias WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
}

pub async fn insert_category(
    pool: &SqlitePool,
    payload: &CategoryPayload,
    image: Option<&str>,
) -> AppResult<i64> {
    let result = sqlx::query("INSERT INTO categorias (nombre, imagen) VALUES (?, ?)")
        .bind(&payload.name)
        .bind(image)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update_category(
    pool: &SqlitePool,
    id: i64,
    payload: &CategoryPayload,
    image: Option<&str>,
) -> AppResult<Replaced> {
    let existing = fetch_category_by_id(pool, id).await?;

    let result = sqlx::query("UPDATE categorias SET nombre = ?, imagen = ? WHERE id = ?")
        .bind(&payload.name)
        .bind(image.or(existing.image.as_deref()))
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Category {} not found", id)));
    }

    Ok(Replaced {
        rows_affected: result.rows_affected(),
        previous_image: existing.image,
    })
}

pub async fn delete_category(pool: &SqlitePool, id: i64) -> AppResult<Replaced> {
    let removed = sqlx::query_scalar::<_, Option<String>>(
        "DELETE FROM categorias WHERE id = ? RETURNING imagen",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .next();

    match removed {
        Some(previous_image) => Ok(Replaced {
            rows_affected: 1,
            previous_image,
        }),
        None => Err(AppError::NotFound(format!("Category {} not found", id))),
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    // One connection: every `:memory:` connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}
