use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_table::Transactions;

const INDEX_NAME: &str = "idx_transactions_user_symbol";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Holdings are always summed per (user, symbol)
        manager
            .create_index(
                Index::create()
                    .name(INDEX_NAME)
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::Symbol)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(INDEX_NAME)
                    .table(Transactions::Table)
                    .to_owned(),
            )
            .await
    }
}
