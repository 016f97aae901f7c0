//! HTTP API.
//!
//! Every route is served both at the root and under `/api`:
//! - `GET|POST /books`, `GET|PUT|DELETE /books/{id}`
//! - `POST /login`
//! - `POST /checkout`, `GET /transactions`, `PUT /transactions/{id}/status`
//! - `GET /check-order?code=...`
//! - `POST /upload`
//! - `GET /health`
//!
//! Uploaded files are served statically from `/uploads/{file}`.

pub mod auth;
pub mod books;
pub mod error;
pub mod orders;
pub mod upload;

pub use error::ApiError;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::AuthGate;
use crate::catalog::CatalogService;
use crate::config::{Config, UploadsConfig};
use crate::images::{FilesystemImageStore, ImageStore};
use crate::orders::OrderEngine;
use crate::storage::Stores;
use crate::utils::bootstrap::shutdown_signal;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub orders: Arc<OrderEngine>,
    pub auth: Arc<AuthGate>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Wire services over the given stores.
    pub fn new(stores: &Stores, config: &Config) -> Self {
        let images: Arc<dyn ImageStore> = Arc::new(FilesystemImageStore::new(
            &config.uploads.dir,
            &config.uploads.public_base_url,
        ));

        Self {
            catalog: Arc::new(CatalogService::new(
                stores.catalog.clone(),
                images.clone(),
                config.uploads.placeholder_image_url.clone(),
            )),
            orders: Arc::new(OrderEngine::new(stores.orders.clone(), &config.orders)),
            auth: Arc::new(AuthGate::new(stores.users.clone(), &config.auth)),
            images,
        }
    }
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState, uploads: &UploadsConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let api = Router::new()
        .route("/books", get(books::list).post(books::create))
        .route(
            "/books/:id",
            get(books::get).put(books::update).delete(books::delete),
        )
        .route("/login", post(auth::login))
        .route("/checkout", post(orders::checkout))
        .route("/transactions", get(orders::list))
        .route("/transactions/:id/status", put(orders::update_status))
        .route("/check-order", get(orders::check_order))
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(uploads.max_bytes)),
        )
        .route("/health", get(health));

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&uploads.dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the router until Ctrl+C.
///
/// The actual bound address is logged, so port 0 can be used to let the OS
/// pick one.
pub async fn serve(
    app: Router,
    address: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!(address = %listener.local_addr()?, "bookstore API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("bookstore API stopped");
    Ok(())
}

async fn health() -> StatusCode {
    StatusCode::OK
}
