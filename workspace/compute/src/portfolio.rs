use common::{HistoryEntry, Holding, Portfolio};
use model::entities::{transaction, user};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument, warn};

use crate::error::{ComputeError, Result};
use crate::holdings::holdings;
use crate::quote::QuoteProvider;

/// Loads a user or fails with [`ComputeError::UserNotFound`].
pub async fn load_user<C>(db: &C, user_id: i32) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ComputeError::UserNotFound(user_id))
}

/// Values every positive holding of `user_id` at its live price.
///
/// Each held symbol costs one lookup. A symbol the provider cannot price
/// fails the whole valuation, since a total without it would be wrong.
#[instrument(skip(db, quotes))]
pub async fn portfolio<C>(db: &C, quotes: &dyn QuoteProvider, user_id: i32) -> Result<Portfolio>
where
    C: ConnectionTrait,
{
    let user = load_user(db, user_id).await?;

    let mut positions = Vec::new();
    for (symbol, shares) in holdings(db, user_id).await? {
        if shares <= 0 {
            continue;
        }

        let Some(quote) = quotes.lookup(&symbol).await else {
            warn!("No quote for held symbol {}", symbol);
            return Err(ComputeError::QuoteUnavailable(symbol));
        };

        positions.push(Holding {
            value: quote.price * Decimal::from(shares),
            symbol,
            name: quote.name,
            shares,
            price: quote.price,
        });
    }

    let portfolio = Portfolio::new(positions, user.cash);
    debug!(
        "Valued {} holdings for user {}: total {}",
        portfolio.holdings.len(),
        user_id,
        portfolio.grand_total
    );
    Ok(portfolio)
}

/// Every transaction of `user_id`, in execution order.
#[instrument(skip(db))]
pub async fn history<C>(db: &C, user_id: i32) -> Result<Vec<HistoryEntry>>
where
    C: ConnectionTrait,
{
    let rows = transaction::Entity::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| HistoryEntry {
            bought: row.is_buy(),
            symbol: row.symbol,
            shares: row.shares,
            price: row.price,
            transacted: row.transacted,
        })
        .collect())
}
