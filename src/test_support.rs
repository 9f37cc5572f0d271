//! Router-level test harness: an in-memory store, a temporary upload root
//! and request builders for the shapes the routes accept.

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
    auth::AdminIdentity, build_router, db, models::Product, upload::UploadStore, AppState,
};

pub const ADMIN_TOKEN: &str = "admin-token-123";
const BOUNDARY: &str = "catalog-test-boundary";

pub struct TestApp {
    router: Router,
    state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path().join("uploads"));
        uploads.ensure_root().await.unwrap();

        let admin = AdminIdentity {
            username: "admin".to_string(),
            password: "1234".to_string(),
            token: ADMIN_TOKEN.to_string(),
        };
        let state = AppState::new(db::memory_pool().await, uploads, admin);

        Self {
            router: build_router(state.clone()),
            state,
            _dir: dir,
        }
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes)
    }

    /// Send and decode the body as JSON (`Null` when the body is not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, bytes) = self.send_raw(request).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    pub fn upload_exists(&self, filename: &str) -> bool {
        self.state.uploads.root().join(filename).is_file()
    }

    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.state.uploads.root()).unwrap().count()
    }

    pub async fn product_count(&self) -> i64 {
        db::count_products(&self.state.db).await.unwrap()
    }

    pub async fn product(&self, id: i64) -> Product {
        db::fetch_product_by_id(&self.state.db, id).await.unwrap()
    }
}

// ── Request builders ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    filename: Option<String>,
    data: Vec<u8>,
}

impl Part {
    pub fn text(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            filename: None,
            data: value.into_bytes(),
        }
    }

    pub fn file(name: &str, filename: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            data: data.to_vec(),
        }
    }
}

pub fn multipart(method: &str, uri: &str, token: Option<&str>, parts: Vec<Part>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match &part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                    .as_bytes(),
            ),
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    match token {
        Some(token) => with_bearer(request, token),
        None => request,
    }
}

pub fn post_json(uri: &str, value: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

pub fn with_bearer(request: Request<Body>, token: &str) -> Request<Body> {
    with_raw_authorization(request, &format!("Bearer {}", token))
}

pub fn with_raw_authorization(mut request: Request<Body>, value: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, value.parse().unwrap());
    request
}
