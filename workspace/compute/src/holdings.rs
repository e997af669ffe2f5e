//! Holdings are not stored anywhere: they are the per-symbol sum of the
//! signed share counts in a user's transaction log.

use model::entities::transaction;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::Expr,
};
use tracing::{debug, instrument};

use crate::error::Result;

/// Net share count per symbol for `user_id`, ordered by symbol.
///
/// Symbols that were fully sold are included with a count of zero.
#[instrument(skip(db))]
pub async fn holdings<C>(db: &C, user_id: i32) -> Result<Vec<(String, i64)>>
where
    C: ConnectionTrait,
{
    let rows: Vec<(String, Option<i64>)> = transaction::Entity::find()
        .select_only()
        .column(transaction::Column::Symbol)
        .column_as(Expr::col(transaction::Column::Shares).sum(), "shares")
        .filter(transaction::Column::UserId.eq(user_id))
        .group_by(transaction::Column::Symbol)
        .order_by_asc(transaction::Column::Symbol)
        .into_tuple()
        .all(db)
        .await?;

    debug!("User {} has traded {} symbols", user_id, rows.len());
    Ok(rows
        .into_iter()
        .map(|(symbol, shares)| (symbol, shares.unwrap_or(0)))
        .collect())
}

/// Symbols `user_id` currently holds a positive number of shares of.
pub async fn held_symbols<C>(db: &C, user_id: i32) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    Ok(holdings(db, user_id)
        .await?
        .into_iter()
        .filter(|(_, shares)| *shares > 0)
        .map(|(symbol, _)| symbol)
        .collect())
}

/// Net share count of one symbol, zero if the user never traded it.
#[instrument(skip(db))]
pub async fn shares_held<C>(db: &C, user_id: i32, symbol: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    let total: Option<Option<i64>> = transaction::Entity::find()
        .select_only()
        .column_as(Expr::col(transaction::Column::Shares).sum(), "shares")
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::Symbol.eq(symbol))
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0))
}
