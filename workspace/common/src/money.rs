use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso};

/// Formats an amount as US dollars, e.g. `$1,234.56`.
pub fn usd(amount: Decimal) -> String {
    let cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Money::from_decimal(cents, iso::USD).to_string()
}
