use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Cash every new user starts with, in dollars.
pub const DEFAULT_CASH: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 2);

/// A registered trader.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Salted password hash, see the `password` module of the server crate.
    pub hash: String,
    /// Uninvested cash. Debited by buys, credited by sells.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub cash: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
