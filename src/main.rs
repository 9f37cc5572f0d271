use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod seed;
mod upload;

#[cfg(test)]
mod test_support;

use crate::auth::{AdminIdentity, StaticTokenVerifier, TokenVerifier};
use crate::config::Config;
use crate::upload::UploadStore;

/// Shared application state — cheap to clone (all heap behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub uploads: UploadStore,
    pub admin: Arc<AdminIdentity>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    /// Wires the default verifier: the admin's configured token is the only
    /// one accepted.
    pub fn new(db: SqlitePool, uploads: UploadStore, admin: AdminIdentity) -> Self {
        let verifier = StaticTokenVerifier::new(admin.token.clone());
        Self {
            db,
            uploads,
            admin: Arc::new(admin),
            verifier: Arc::new(verifier),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,catalog_service=debug".into()),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Catalog Service  — Rust + Axum      ║");
    info!("║  productos · categorias · uploads    ║");
    info!("╚══════════════════════════════════════╝");

    info!(url = %config.database_url, "Opening SQLite store...");
    let pool = db::connect(&config.database_url, config.db_max_connections).await?;
    db::migrate(&pool).await?;
    info!("Tables ready.");

    if config.seed_sample_data {
        seed::seed_sample_products(&pool).await?;
    }

    let uploads = UploadStore::new(&config.upload_dir);
    uploads.ensure_root().await?;
    info!(dir = %config.upload_dir.display(), "Upload directory ready.");

    let state = AppState::new(pool.clone(), uploads, config.admin.clone());
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing database pool...");
    pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Could not listen for Ctrl-C, shutting down");
    }
}

fn build_router(state: AppState) -> Router {
    // ── Admin (bearer token required) ───────────────────────────────────────
    let admin = Router::new()
        .route("/admin/productos", post(handlers::products::create_product))
        .route(
            "/admin/productos/:id",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .route("/admin/protegido", get(handlers::admin::protected))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Products (public reads) ─────────────────────────────────────────
        .route("/productos", get(handlers::products::list_products))
        .route(
            "/productos/:categoria",
            get(handlers::products::list_products_by_category),
        )

        // ── Categories ──────────────────────────────────────────────────────
        .route(
            "/categorias",
            get(handlers::categories::list_categories)
                .post(handlers::categories::create_category),
        )
        .route(
            "/categorias/:id",
            put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )

        // ── Admin ───────────────────────────────────────────────────────────
        .route("/admin/login", post(handlers::admin::login))
        .merge(admin)

        // ── Uploaded images ─────────────────────────────────────────────────
        .nest_service("/uploads", ServeDir::new(state.uploads.root()))

        // ── Middleware ──────────────────────────────────────────────────────
        // Uploads are not size-capped.
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
