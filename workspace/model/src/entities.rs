//! SeaORM entities for the trading simulator.
//!
//! Two tables are persisted: `users`, holding credentials and uninvested
//! cash, and `transactions`, an append-only log of executed trades from which
//! holdings are derived.

pub mod transaction;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::transaction::Entity as Transaction;
    pub use super::user::Entity as User;
}
