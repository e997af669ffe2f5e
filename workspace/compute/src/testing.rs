//! Fixtures shared by the tests of this crate.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use model::entities::{transaction, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Set};

use crate::quote::StaticQuoteProvider;

/// Migrated in-memory database with foreign keys enforced.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn new_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        hash: Set(String::new()),
        cash: Set(user::DEFAULT_CASH),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create user")
}

/// Inserts a transaction row directly, bypassing cash bookkeeping.
pub async fn record(
    db: &DatabaseConnection,
    user_id: i32,
    symbol: &str,
    shares: i64,
    price: i64,
) -> transaction::Model {
    transaction::ActiveModel {
        user_id: Set(user_id),
        symbol: Set(symbol.to_string()),
        shares: Set(shares),
        price: Set(Decimal::from(price)),
        transacted: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to record transaction")
}

pub async fn cash_of(db: &DatabaseConnection, user_id: i32) -> Decimal {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .expect("Failed to load user")
        .expect("User not found")
        .cash
}

/// AAPL at $150.25, MSFT at $300.00 and NFLX at $12.50.
pub fn quotes() -> StaticQuoteProvider {
    StaticQuoteProvider::new()
        .with_quote("AAPL", "Apple Inc.", Decimal::new(15_025, 2))
        .with_quote("MSFT", "Microsoft Corporation", Decimal::new(300, 0))
        .with_quote("NFLX", "Netflix, Inc.", Decimal::new(1_250, 2))
}
