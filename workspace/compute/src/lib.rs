//! Domain operations of the trading simulator: holdings aggregation,
//! portfolio valuation, buying, selling and quote lookup.
//!
//! Everything here works on a SeaORM connection and a [`quote::QuoteProvider`];
//! nothing knows about HTTP.

pub mod error;
pub mod holdings;
pub mod portfolio;
pub mod quote;
pub mod trade;

#[cfg(test)]
mod testing;

pub use error::{ComputeError, Result};
