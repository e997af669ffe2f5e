//! Types shared between the domain layer and the HTTP layer.
//! They carry what a page shows, already aggregated, so handlers never
//! need to touch entities directly to render a view.

mod money;

pub use money::usd;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current price and display name for a ticker symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    /// Upper-case ticker symbol
    pub symbol: String,
    /// Company name
    pub name: String,
    /// Latest price of one share
    pub price: Decimal,
}

/// A positive position in one symbol, valued at the latest quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    pub price: Decimal,
    /// `price * shares`
    pub value: Decimal,
}

/// Everything the portfolio page shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,
    pub cash: Decimal,
    /// Cash plus the value of every holding
    pub grand_total: Decimal,
}

impl Portfolio {
    /// Builds a portfolio and derives the grand total from its parts.
    pub fn new(holdings: Vec<Holding>, cash: Decimal) -> Self {
        let grand_total = holdings.iter().map(|h| h.value).sum::<Decimal>() + cash;
        Self {
            holdings,
            cash,
            grand_total,
        }
    }
}

/// One row of the history page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub symbol: String,
    /// Positive for a buy, negative for a sell
    pub shares: i64,
    pub bought: bool,
    pub price: Decimal,
    pub transacted: DateTime<Utc>,
}
