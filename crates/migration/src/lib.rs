pub use sea_orm_migration::prelude::*;

mod m20260201_000001_ledger;
mod m20260201_000002_catalog;
mod m20260203_000001_credentials;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260201_000001_ledger::Migration),
            Box::new(m20260201_000002_catalog::Migration),
            Box::new(m20260203_000001_credentials::Migration),
        ]
    }
}
