//! Buying and selling against the simulated cash balance.
//!
//! Input is validated in the order the forms present it, so a request with
//! several problems reports the first one. The balance check, the log insert
//! and the cash update share one database transaction: two concurrent trades
//! of the same user cannot both pass the check against the same balance.

use chrono::Utc;
use model::entities::{transaction, user};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, IntoActiveModel, TransactionTrait,
};
use tracing::{debug, info, instrument, trace};

use crate::error::{ComputeError, Result};
use crate::holdings::shares_held;
use crate::portfolio::load_user;
use crate::quote::{QuoteProvider, normalize_symbol};

/// Buys `shares` of `symbol` for `user_id` at the live price.
///
/// `shares` is the raw form value; it must parse as a positive integer.
#[instrument(skip(db, quotes))]
pub async fn buy(
    db: &DatabaseConnection,
    quotes: &dyn QuoteProvider,
    user_id: i32,
    symbol: &str,
    shares: &str,
) -> Result<transaction::Model> {
    let symbol = normalize_symbol(symbol);
    if symbol.is_empty() {
        return Err(ComputeError::MissingSymbol);
    }

    let quote = quotes
        .lookup(&symbol)
        .await
        .ok_or(ComputeError::InvalidSymbol)?;

    let shares = match shares.trim().parse::<i64>() {
        Ok(n) if n >= 1 => n,
        _ => return Err(ComputeError::InvalidShares),
    };

    let cost = quote.price * Decimal::from(shares);
    trace!("Buying {} x {} at {} = {}", shares, symbol, quote.price, cost);

    let txn = db.begin().await?;

    let user = load_user(&txn, user_id).await?;
    if cost > user.cash {
        debug!("User {} cannot afford {} with {}", user_id, cost, user.cash);
        return Err(ComputeError::CannotAfford);
    }

    let recorded = record(&txn, user_id, &quote.symbol, shares, quote.price).await?;
    adjust_cash(&txn, user, -cost).await?;
    txn.commit().await?;

    info!("User {} bought {} {} at {}", user_id, shares, recorded.symbol, recorded.price);
    Ok(recorded)
}

/// Sells `shares` of `symbol` for `user_id` at the live price.
///
/// `shares` is the raw form value; it must parse as a non-negative integer
/// no larger than the current holding.
#[instrument(skip(db, quotes))]
pub async fn sell(
    db: &DatabaseConnection,
    quotes: &dyn QuoteProvider,
    user_id: i32,
    symbol: &str,
    shares: &str,
) -> Result<transaction::Model> {
    let symbol = normalize_symbol(symbol);
    if symbol.is_empty() {
        return Err(ComputeError::MissingSymbol);
    }

    let shares = match shares.trim().parse::<i64>() {
        Ok(n) if n >= 0 => n,
        _ => return Err(ComputeError::MissingShares),
    };

    // Looked up before the transaction opens, so no connection is held
    // during the HTTP call. A missing quote is reported after the holdings
    // check.
    let quote = quotes.lookup(&symbol).await;

    let txn = db.begin().await?;

    let held = shares_held(&txn, user_id, &symbol).await?;
    if shares > held {
        debug!("User {} holds {} {}, cannot sell {}", user_id, held, symbol, shares);
        return Err(ComputeError::TooManyShares);
    }

    let quote = quote.ok_or(ComputeError::InvalidSymbol)?;
    let income = quote.price * Decimal::from(shares);

    let user = load_user(&txn, user_id).await?;
    let recorded = record(&txn, user_id, &quote.symbol, -shares, quote.price).await?;
    adjust_cash(&txn, user, income).await?;
    txn.commit().await?;

    info!("User {} sold {} {} at {}", user_id, shares, recorded.symbol, recorded.price);
    Ok(recorded)
}

async fn record<C>(
    db: &C,
    user_id: i32,
    symbol: &str,
    shares: i64,
    price: Decimal,
) -> Result<transaction::Model>
where
    C: sea_orm::ConnectionTrait,
{
    let row = transaction::ActiveModel {
        user_id: Set(user_id),
        symbol: Set(symbol.to_string()),
        shares: Set(shares),
        price: Set(price),
        transacted: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(row)
}

async fn adjust_cash<C>(db: &C, user: user::Model, delta: Decimal) -> Result<user::Model>
where
    C: sea_orm::ConnectionTrait,
{
    let cash = user.cash + delta;
    let mut active = user.into_active_model();
    active.cash = Set(cash);
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use async_trait::async_trait;
    use common::Quote;
    use crate::portfolio::history;
    use crate::quote::StaticQuoteProvider;
    use sea_orm::{DatabaseConnection, EntityTrait};
    use crate::testing::{cash_of, new_user, quotes, record, setup_db};

    /// Writes through the shared connection while looking a quote up, like a
    /// concurrent request would. The in-memory pool has a single connection,
    /// so the write only succeeds if no transaction holds it.
    #[derive(Debug)]
    struct WritingQuotes {
        db: DatabaseConnection,
        inner: StaticQuoteProvider,
        wrote: AtomicBool,
    }

    #[async_trait]
    impl QuoteProvider for WritingQuotes {
        async fn lookup(&self, symbol: &str) -> Option<Quote> {
            let inserted = user::ActiveModel {
                username: Set(format!("bystander-{}", symbol)),
                hash: Set(String::new()),
                cash: Set(user::DEFAULT_CASH),
                ..Default::default()
            }
            .insert(&self.db)
            .await;
            self.wrote.store(inserted.is_ok(), Ordering::SeqCst);
            self.inner.lookup(symbol).await
        }
    }

    #[tokio::test]
    async fn test_buy_debits_cash_and_records_row() {
        let db = setup_db().await;
        let user = new_user(&db, "buyer").await;

        let row = buy(&db, &quotes(), user.id, " aapl", "2").await.unwrap();
        assert_eq!(row.symbol, "AAPL");
        assert_eq!(row.shares, 2);
        assert_eq!(row.price, Decimal::new(15_025, 2));
        assert_eq!(row.cash_delta(), Decimal::new(-30_050, 2));

        assert_eq!(cash_of(&db, user.id).await, Decimal::new(969_950, 2));
        assert_eq!(history(&db, user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_buy_validation_order() {
        let db = setup_db().await;
        let user = new_user(&db, "careless").await;
        let quotes = quotes();

        let err = buy(&db, &quotes, user.id, "  ", "abc").await.unwrap_err();
        assert!(matches!(err, ComputeError::MissingSymbol));

        let err = buy(&db, &quotes, user.id, "NOPE", "abc").await.unwrap_err();
        assert!(matches!(err, ComputeError::InvalidSymbol));

        for shares in ["abc", "0", "-3", "1.5", ""] {
            let err = buy(&db, &quotes, user.id, "AAPL", shares).await.unwrap_err();
            assert!(matches!(err, ComputeError::InvalidShares), "shares {:?}", shares);
        }

        assert!(history(&db, user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_buy_more_than_affordable_fails() {
        let db = setup_db().await;
        let user = new_user(&db, "dreamer").await;

        // 34 * 300 = 10_200 > 10_000
        let err = buy(&db, &quotes(), user.id, "MSFT", "34").await.unwrap_err();
        assert!(matches!(err, ComputeError::CannotAfford));
        assert!(err.is_client_error());

        assert_eq!(cash_of(&db, user.id).await, user::DEFAULT_CASH);
        assert!(history(&db, user.id).await.unwrap().is_empty());

        // Spending exactly everything is allowed
        buy(&db, &quotes(), user.id, "NFLX", "800").await.unwrap();
        assert_eq!(cash_of(&db, user.id).await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_sell_credits_cash() {
        let db = setup_db().await;
        let user = new_user(&db, "seller").await;

        buy(&db, &quotes(), user.id, "MSFT", "5").await.unwrap();
        let row = sell(&db, &quotes(), user.id, "msft", "3").await.unwrap();

        assert_eq!(row.symbol, "MSFT");
        assert_eq!(row.shares, -3);
        assert!(!row.is_buy());
        assert_eq!(shares_held(&db, user.id, "MSFT").await.unwrap(), 2);
        // 10_000 - 1_500 + 900
        assert_eq!(cash_of(&db, user.id).await, Decimal::new(9_400, 0));
    }

    #[tokio::test]
    async fn test_sell_more_than_held_fails() {
        let db = setup_db().await;
        let user = new_user(&db, "shorter").await;

        buy(&db, &quotes(), user.id, "AAPL", "1").await.unwrap();
        let cash = cash_of(&db, user.id).await;

        let err = sell(&db, &quotes(), user.id, "AAPL", "2").await.unwrap_err();
        assert!(matches!(err, ComputeError::TooManyShares));

        let err = sell(&db, &quotes(), user.id, "MSFT", "1").await.unwrap_err();
        assert!(matches!(err, ComputeError::TooManyShares));

        assert_eq!(cash_of(&db, user.id).await, cash);
        assert_eq!(history(&db, user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sell_validation() {
        let db = setup_db().await;
        let user = new_user(&db, "confused").await;

        let err = sell(&db, &quotes(), user.id, "", "1").await.unwrap_err();
        assert!(matches!(err, ComputeError::MissingSymbol));

        for shares in ["-1", "x", ""] {
            let err = sell(&db, &quotes(), user.id, "AAPL", shares).await.unwrap_err();
            assert!(matches!(err, ComputeError::MissingShares), "shares {:?}", shares);
        }
    }

    #[tokio::test]
    async fn test_cash_matches_transaction_log() {
        let db = setup_db().await;
        let user = new_user(&db, "ledger").await;
        let quotes = quotes();

        buy(&db, &quotes, user.id, "AAPL", "3").await.unwrap();
        buy(&db, &quotes, user.id, "NFLX", "10").await.unwrap();
        sell(&db, &quotes, user.id, "AAPL", "1").await.unwrap();
        sell(&db, &quotes, user.id, "NFLX", "10").await.unwrap();

        let rows = transaction::Entity::find().all(&db).await.unwrap();
        let net: Decimal = rows.iter().map(|r| r.cash_delta()).sum();
        assert_eq!(cash_of(&db, user.id).await, user::DEFAULT_CASH + net);
    }

    #[tokio::test]
    async fn test_sell_does_not_hold_connection_during_lookup() {
        let db = setup_db().await;
        let user = new_user(&db, "patient").await;
        buy(&db, &quotes(), user.id, "MSFT", "2").await.unwrap();

        let provider = WritingQuotes {
            db: db.clone(),
            inner: quotes(),
            wrote: AtomicBool::new(false),
        };
        let row = sell(&db, &provider, user.id, "MSFT", "1").await.unwrap();

        assert_eq!(row.shares, -1);
        assert!(provider.wrote.load(Ordering::SeqCst));
        assert_eq!(user::Entity::find().all(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sell_unpriceable_symbol_rolls_back() {
        let db = setup_db().await;
        let user = new_user(&db, "delisted").await;
        record(&db, user.id, "GONE", 3, 5).await;

        let err = sell(&db, &StaticQuoteProvider::new(), user.id, "GONE", "1")
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::InvalidSymbol));
        assert!(err.is_client_error());

        assert_eq!(cash_of(&db, user.id).await, user::DEFAULT_CASH);
        assert_eq!(history(&db, user.id).await.unwrap().len(), 1);
        assert_eq!(shares_held(&db, user.id, "GONE").await.unwrap(), 3);

        // Holding too few still reports the holdings problem first
        let err = sell(&db, &StaticQuoteProvider::new(), user.id, "GONE", "4")
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::TooManyShares));
    }

    #[tokio::test]
    async fn test_sell_zero_shares_records_empty_trade() {
        let db = setup_db().await;
        let user = new_user(&db, "idle").await;

        // Nothing held, yet zero shares never exceed the holding
        let row = sell(&db, &quotes(), user.id, "MSFT", "0").await.unwrap();
        assert_eq!(row.symbol, "MSFT");
        assert_eq!(row.shares, 0);
        assert_eq!(row.cash_delta(), Decimal::ZERO);

        assert_eq!(cash_of(&db, user.id).await, user::DEFAULT_CASH);
        assert_eq!(history(&db, user.id).await.unwrap().len(), 1);
        assert_eq!(shares_held(&db, user.id, "MSFT").await.unwrap(), 0);
    }
}
