use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::upload::UploadForm;

/// One row of `categorias`. `nombre` is `None` only for legacy rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nombre")]
    #[sqlx(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "imagen")]
    #[sqlx(rename = "imagen")]
    pub image: Option<String>,
}

/// Text part of a category write. Create and update both require `nombre`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPayload {
    pub name: String,
}

impl CategoryPayload {
    pub fn from_form(form: &UploadForm) -> AppResult<Self> {
        Ok(Self {
            name: form.require("nombre")?.to_string(),
        })
    }
}
