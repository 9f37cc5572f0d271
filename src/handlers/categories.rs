//! Category routes. Unlike the product writes these carry no admin gate.

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
    models::{Category, CategoryPayload},
    upload::{UploadForm, IMAGE_FIELD},
    AppState,
};

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = db::fetch_all_categories(&state.db).await?;
    info!(count = categories.len(), "Listed categories");
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Category>)> {
    let form = UploadForm::from_multipart(multipart, IMAGE_FIELD).await?;
    let payload = CategoryPayload::from_form(&form)?;

    let image = state.uploads.store(form.file()).await?;
    let inserted = db::insert_category(&state.db, &payload, image.as_deref()).await;
    let id = state.uploads.commit_or_discard(image.as_deref(), inserted).await?;

    info!(id, name = %payload.name, "Created category");

    Ok((
        StatusCode::CREATED,
        Json(Category {
            id,
            name: Some(payload.name),
            image,
        }),
    ))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let form = UploadForm::from_multipart(multipart, IMAGE_FIELD).await?;
    let payload = CategoryPayload::from_form(&form)?;

    let new_image = state.uploads.store(form.file()).await?;
    let updated = db::update_category(&state.db, id, &payload, new_image.as_deref()).await;
    let replaced = state
        .uploads
        .commit_or_discard(new_image.as_deref(), updated)
        .await?;

    let stored_image = match new_image {
        Some(new) => {
            if let Some(old) = replaced.previous_image.as_deref() {
                state.uploads.discard(old).await;
            }
            Some(new)
        }
        None => replaced.previous_image,
    };

    info!(id, name = %payload.name, "Updated category");

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Category updated",
            "id": id,
            "nombre": payload.name,
            "imagen": stored_image,
        })),
    ))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let removed = db::delete_category(&state.db, id).await?;

    if let Some(old) = removed.previous_image.as_deref() {
        state.uploads.discard(old).await;
    }

    info!(id, "Deleted category");

    Ok((StatusCode::OK, Json(json!({ "message": "Category deleted" }))))
}
