use std::sync::Arc;

use compute::quote::QuoteProvider;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::password::PasswordHasher;
use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Logged-in users and flash messages
    pub sessions: SessionStore,
    /// Live price source
    pub quotes: Arc<dyn QuoteProvider>,
    /// Hasher for new passwords
    pub passwords: PasswordHasher,
}

/// Login form
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "must provide username"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must provide password"))]
    pub password: String,
}

impl LoginForm {
    pub const FIELDS: &'static [&'static str] = &["username", "password"];
}

/// Registration form
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "must provide username"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must provide password"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must confirm password"))]
    pub confirmation: String,
}

impl RegisterForm {
    pub const FIELDS: &'static [&'static str] = &["username", "password", "confirmation"];
}

/// Quote lookup form
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct QuoteForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "missing symbol"))]
    pub symbol: String,
}

impl QuoteForm {
    pub const FIELDS: &'static [&'static str] = &["symbol"];
}

/// Buy and sell form. Both fields are passed on raw; the trade functions
/// validate them in order.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TradeForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub shares: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}
