use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::upload::UploadForm;

/// One row of the `productos` table. Serialized with the column names the
/// storefront reads (`nombre`, `imagen`, `precio`, `categoria`).
///
/// Rows written here always carry name, price and category, but a table
/// created before those columns were `NOT NULL` may hold NULLs; they decode
/// as `None` and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "nombre")]
    #[sqlx(rename = "nombre")]
    pub name: Option<String>,
    /// Generated upload filename, never a path.
    #[serde(rename = "imagen")]
    #[sqlx(rename = "imagen")]
    pub image: Option<String>,
    #[serde(rename = "precio")]
    #[sqlx(rename = "precio")]
    pub price: Option<f64>,
    /// Free-form label; not checked against `categorias`.
    #[serde(rename = "categoria")]
    #[sqlx(rename = "categoria")]
    pub category: Option<String>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProduct {
    pub name: String,
    pub price: f64,
    pub category: String,
}

impl CreateProduct {
    pub fn from_form(form: &UploadForm) -> AppResult<Self> {
        let name = form.require("nombre")?;
        let price = form.require("precio")?;
        let category = form.require("categoria")?;

        Ok(Self {
            name: name.to_string(),
            price: parse_price(price)?,
            category: category.to_string(),
        })
    }
}

/// Partial replace: every `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
}

impl UpdateProduct {
    pub fn from_form(form: &UploadForm) -> AppResult<Self> {
        Ok(Self {
            name: form.text("nombre").map(str::to_string),
            price: form.text("precio").map(parse_price).transpose()?,
            category: form.text("categoria").map(str::to_string),
        })
    }
}

fn parse_price(raw: &str) -> AppResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| AppError::BadRequest(format!("precio must be a number, got {:?}", raw)))
}
