use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::user;

/// One executed buy or sell. Rows are never updated; holdings are the sum of
/// `shares` per symbol.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    /// Upper-case ticker symbol.
    pub symbol: String,
    /// Positive for a buy, negative for a sell.
    pub shares: i64,
    /// Price of a single share at execution time.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub price: Decimal,
    pub transacted: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Model {
    /// Whether this row records a purchase.
    pub fn is_buy(&self) -> bool {
        self.shares > 0
    }

    /// Cash moved by this row: negative for buys, positive for sells.
    pub fn cash_delta(&self) -> Decimal {
        -self.price * Decimal::from(self.shares)
    }
}

impl ActiveModelBehavior for ActiveModel {}
