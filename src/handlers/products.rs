use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    db,
    error::AppResult,
    models::{CreateProduct, Product, UpdateProduct},
    upload::{UploadForm, IMAGE_FIELD},
    AppState,
};

// ── Public reads ──────────────────────────────────────────────────────────────

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = db::fetch_all_products(&state.db).await?;
    info!(count = products.len(), "Listed products");
    Ok(Json(products))
}

pub async fn list_products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    let products = db::fetch_products_by_category(&state.db, &category).await?;
    info!(category = %category, count = products.len(), "Listed products by category");
    Ok(Json(products))
}

// ── Admin writes ──────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let form = UploadForm::from_multipart(multipart, IMAGE_FIELD).await?;
    let payload = CreateProduct::from_form(&form)?;

    let image = state.uploads.store(form.file()).await?;
    let inserted = db::insert_product(&state.db, &payload, image.as_deref()).await;
    let id = state.uploads.commit_or_discard(image.as_deref(), inserted).await?;

    info!(id, name = %payload.name, image = ?image, "Created product");

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let form = UploadForm::from_multipart(multipart, IMAGE_FIELD).await?;
    let changes = UpdateProduct::from_form(&form)?;

    let image = state.uploads.store(form.file()).await?;
    let updated = db::update_product(&state.db, id, &changes, image.as_deref()).await;
    let replaced = state.uploads.commit_or_discard(image.as_deref(), updated).await?;

    // Row is committed; the superseded file goes now, best-effort.
    if image.is_some() {
        if let Some(old) = replaced.previous_image.as_deref() {
            state.uploads.discard(old).await;
        }
    }

    info!(id, new_image = image.is_some(), "Updated product");

    Ok((
        StatusCode::OK,
        Json(json!({ "updated": replaced.rows_affected })),
    ))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let removed = db::delete_product(&state.db, id).await?;

    if let Some(old) = removed.previous_image.as_deref() {
        state.uploads.discard(old).await;
    }

    info!(id, "Deleted product");

    Ok((
        StatusCode::OK,
        Json(json!({ "deleted": removed.rows_affected })),
    ))
}
