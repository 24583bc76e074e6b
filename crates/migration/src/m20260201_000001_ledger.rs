//! Core ledger tables.
//!
//! - `accounts`: one row per identity with its coin balance
//! - `transfers`: append-only log of coin movements between accounts
//!
//! Balances and amounts are guarded by `CHECK` constraints so that a bug in the
//! engine can never persist a negative balance.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Accounts {
    Table,
    Username,
    Balance,
    CreatedAt,
}

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    Sender,
    Receiver,
    Amount,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Balance)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Accounts::Balance).gte(0)),
                    )
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transfers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transfers::Sender).string().not_null())
                    .col(ColumnDef::new(Transfers::Receiver).string().not_null())
                    .col(
                        ColumnDef::new(Transfers::Amount)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Transfers::Amount).gt(0)),
                    )
                    .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-sender")
                            .from(Transfers::Table, Transfers::Sender)
                            .to(Accounts::Table, Accounts::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-receiver")
                            .from(Transfers::Table, Transfers::Receiver)
                            .to(Accounts::Table, Accounts::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-sender-created_at")
                    .table(Transfers::Table)
                    .col(Transfers::Sender)
                    .col(Transfers::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-receiver-created_at")
                    .table(Transfers::Table)
                    .col(Transfers::Receiver)
                    .col(Transfers::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
