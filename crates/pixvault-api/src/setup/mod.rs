//! Application setup and initialization
//!
//! All initialization logic lives here, extracted from main.rs so
//! integration tests can build the same router against in-memory backends.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Result;
use pixvault_core::Config;
use pixvault_db::{connect_pool, PgImageRepository};
use pixvault_storage::LocalFileSystem;

use crate::state::AppState;

/// Initialize the application against Postgres and the local filesystem.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let pool = connect_pool(&config).await?;

    let state = Arc::new(AppState::new(
        config,
        Arc::new(PgImageRepository::new(pool)),
        Arc::new(LocalFileSystem::new()),
    ));

    let router = routes::build_router(state.clone())?;
    Ok((state, router))
}
