use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use compute::quote::{DEFAULT_IEX_BASE_URL, IexQuoteProvider};
use sea_orm::Database;
use tracing::{debug, info};

use crate::password::{DEFAULT_ITERATIONS, PasswordHasher};
use crate::schemas::AppState;
use crate::session::SessionStore;

/// Settings shared by the commands that run the web server.
///
/// Every value can come from the environment; a `.env` file in the working
/// directory is loaded before the arguments are parsed.
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Database URL
    ///
    /// For SQLite databases, use:
    ///   - sqlite:///absolute/path/to/database.sqlite (absolute path)
    ///   - sqlite://finance.db?mode=rwc (relative path, created if missing)
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite://finance.db?mode=rwc")]
    pub database_url: String,

    /// Bind address for the web server
    ///
    /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
    #[arg(short, long, env = "BIND_ADDRESS", default_value = "0.0.0.0:3000")]
    pub bind_address: String,

    /// API key of the quote service
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the quote service
    ///
    /// IEX Cloud, the default, was retired in August 2024. Set
    /// QUOTE_API_URL to a service that answers
    /// `GET {base}/stock/{symbol}/quote?token={key}` with the same JSON
    /// (`symbol`, `companyName`, `latestPrice`).
    #[arg(long, env = "QUOTE_API_URL", default_value = DEFAULT_IEX_BASE_URL)]
    pub quote_api_url: String,

    /// Minutes of inactivity after which a session is forgotten
    #[arg(long, env = "SESSION_IDLE_MINUTES", default_value_t = 60)]
    pub session_idle_minutes: u64,

    /// PBKDF2 iterations for newly hashed passwords
    #[arg(long, env = "PASSWORD_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    pub password_iterations: u32,
}

/// Initialize application state from the server configuration
pub async fn initialize_app_state(config: &ServerConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to {}", config.database_url))?;

    debug!("Using quote service at {}", config.quote_api_url);
    let quotes = IexQuoteProvider::new(&config.quote_api_url, config.api_key.clone())
        .context("failed to set up the quote client")?;

    let sessions = SessionStore::new(Duration::from_secs(config.session_idle_minutes * 60));

    Ok(AppState {
        db,
        sessions,
        quotes: Arc::new(quotes),
        passwords: PasswordHasher::new(config.password_iterations),
    })
}
