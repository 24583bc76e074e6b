//! Read-only merch catalog.
//!
//! Rows are seeded by the migration crate; the ledger only ever reads them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_type: String,
    pub price: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "merch_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_type: String,
    pub price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CatalogItem {
    fn from(value: Model) -> Self {
        Self {
            item_type: value.item_type,
            price: value.price,
        }
    }
}
