//! Merch catalog and the inventory sub-ledger.
//!
//! - `merch_items`: fixed catalog, seeded here and read-only afterwards
//! - `inventory`: accumulated quantity per `(username, item_type)`
//! - `purchases`: append-only log of coins spent on merch

use sea_orm_migration::prelude::*;

use crate::m20260201_000001_ledger::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum MerchItems {
    Table,
    ItemType,
    Price,
}

#[derive(Iden)]
enum Inventory {
    Table,
    Username,
    ItemType,
    Quantity,
}

#[derive(Iden)]
enum Purchases {
    Table,
    Id,
    Username,
    ItemType,
    Quantity,
    TotalCost,
    CreatedAt,
}

const CATALOG: [(&str, i64); 10] = [
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MerchItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MerchItems::ItemType)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MerchItems::Price)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(MerchItems::Price).gt(0)),
                    )
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(MerchItems::Table)
            .columns([MerchItems::ItemType, MerchItems::Price]);
        for (item_type, price) in CATALOG {
            seed.values([item_type.into(), price.into()])
                .map_err(|err| DbErr::Migration(err.to_string()))?;
        }
        manager.exec_stmt(seed).await?;

        manager
            .create_table(
                Table::create()
                    .table(Inventory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Inventory::Username).string().not_null())
                    .col(ColumnDef::new(Inventory::ItemType).string().not_null())
                    .col(
                        ColumnDef::new(Inventory::Quantity)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Inventory::Quantity).gte(0)),
                    )
                    .primary_key(
                        Index::create()
                            .col(Inventory::Username)
                            .col(Inventory::ItemType),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory-username")
                            .from(Inventory::Table, Inventory::Username)
                            .to(Accounts::Table, Accounts::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory-item_type")
                            .from(Inventory::Table, Inventory::ItemType)
                            .to(MerchItems::Table, MerchItems::ItemType),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchases::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchases::Username).string().not_null())
                    .col(ColumnDef::new(Purchases::ItemType).string().not_null())
                    .col(
                        ColumnDef::new(Purchases::Quantity)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Purchases::Quantity).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Purchases::TotalCost)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Purchases::TotalCost).gt(0)),
                    )
                    .col(ColumnDef::new(Purchases::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-username")
                            .from(Purchases::Table, Purchases::Username)
                            .to(Accounts::Table, Accounts::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-item_type")
                            .from(Purchases::Table, Purchases::ItemType)
                            .to(MerchItems::Table, MerchItems::ItemType),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-username-created_at")
                    .table(Purchases::Table)
                    .col(Purchases::Username)
                    .col(Purchases::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Inventory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MerchItems::Table).to_owned())
            .await?;
        Ok(())
    }
}
