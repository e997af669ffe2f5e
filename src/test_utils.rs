use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_test::{TestServer, TestServerConfig};
use compute::quote::StaticQuoteProvider;
use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::password::PasswordHasher;
use crate::router::create_router;
use crate::schemas::{AppState, LoginForm, RegisterForm};
use crate::session::SessionStore;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// AAPL at $150.25, MSFT at $300.00 and NFLX at $12.50.
pub fn test_quotes() -> StaticQuoteProvider {
    StaticQuoteProvider::new()
        .with_quote("AAPL", "Apple Inc.", Decimal::new(15_025, 2))
        .with_quote("MSFT", "Microsoft Corporation", Decimal::new(300, 0))
        .with_quote("NFLX", "Netflix, Inc.", Decimal::new(1_250, 2))
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    AppState {
        db: setup_test_db().await,
        sessions: SessionStore::new(Duration::from_secs(600)),
        quotes: Arc::new(test_quotes()),
        // Cheap hashes keep the suite fast
        passwords: PasswordHasher::new(1_000),
    }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is determined by the RUST_LOG environment variable,
/// defaulting to WARN if not set.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub async fn setup_test_app() -> Router {
    let _ = init_test_tracing();
    create_router(setup_test_app_state().await)
}

/// Test server that keeps cookies between requests, like a browser.
pub async fn setup_test_server() -> TestServer {
    let config = TestServerConfig {
        save_cookies: true,
        ..TestServerConfig::default()
    };
    TestServer::new_with_config(setup_test_app().await, config).expect("Failed to start test server")
}

/// Registers `username` and logs in as them.
pub async fn register_and_login(server: &TestServer, username: &str) {
    server
        .post("/register")
        .form(&RegisterForm {
            username: username.to_string(),
            password: "hunter2".to_string(),
            confirmation: "hunter2".to_string(),
        })
        .await;
    server
        .post("/login")
        .form(&LoginForm {
            username: username.to_string(),
            password: "hunter2".to_string(),
        })
        .await;
}
