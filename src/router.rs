use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, StatusCode, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::handlers::{
    assets::stylesheet,
    auth::{login, login_form, logout, register, register_form},
    health::health_check,
    history::history_page,
    portfolio::index,
    quote::{quote, quote_form},
    trade::{buy, buy_form, sell, sell_form},
};
use crate::schemas::AppState;
use crate::views::Apology;

async fn not_found() -> Apology {
    Apology::new("Not Found", StatusCode::NOT_FOUND)
}

fn no_cache(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/static/styles.css", get(stylesheet))
        // Account routes
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_form).post(register))
        // Trading routes
        .route("/", get(index))
        .route("/quote", get(quote_form).post(quote))
        .route("/buy", get(buy_form).post(buy))
        .route("/sell", get(sell_form).post(sell))
        .route("/history", get(history_page))
        .fallback(not_found)
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                // Pages reflect the live balance, never serve them from a cache
                .layer(no_cache(
                    header::CACHE_CONTROL,
                    "no-cache, no-store, must-revalidate",
                ))
                .layer(no_cache(header::EXPIRES, "0"))
                .layer(no_cache(header::PRAGMA, "no-cache")),
        )
        .with_state(state)
}
