//! bookstore-server: Bookstore admin HTTP API
//!
//! Serves the book catalog, checkout, order tracking, cover image uploads
//! and the login gate over one SQLite database.
//!
//! ## Configuration
//! - `config.yaml`, `--config <path>` or BOOKSTORE_CONFIG: YAML config file
//! - BOOKSTORE__SECTION__KEY: per-field overrides (e.g. BOOKSTORE__SERVER__PORT)
//! - BOOKSTORE_LOG: tracing filter (default: info)

use tracing::{error, info};

use bookstore::config::Config;
use bookstore::handlers::{self, AppState};
use bookstore::storage::init_storage;
use bookstore::utils::bootstrap::{init_tracing, parse_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        address = %config.server.bind_address(),
        storage = %config.storage.path,
        uploads = %config.uploads.dir,
        "starting bookstore-server"
    );

    let stores = init_storage(&config.storage).await?;
    let state = AppState::new(&stores, &config);

    if let Some(seed) = &config.auth.seed_admin {
        state.auth.seed(seed).await?;
    }

    let app = handlers::router(state, &config.uploads);
    let result = handlers::serve(app, &config.server.bind_address()).await;

    stores.close().await;
    result.map_err(|e| -> Box<dyn std::error::Error> { e })
}
