use anyhow::Result;
use tracing::{debug, error, info, trace};

use super::initdb::apply_migrations;
use super::serve::run_server;
use crate::config::{ServerConfig, initialize_app_state};

pub async fn migrate_and_serve(config: &ServerConfig) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");

    let state = match initialize_app_state(config).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    // Same connection as the server, so an in-memory database keeps its tables
    apply_migrations(&state.db).await?;

    run_server(state, &config.bind_address).await
}
