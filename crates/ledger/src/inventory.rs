//! Inventory sub-ledger: one row per `(username, item_type)`.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Quantity of one item type owned by an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_type: String,
    pub quantity: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_type: String,
    pub quantity: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn first(username: &str, item_type: &str, quantity: i64) -> Self {
        Self {
            username: ActiveValue::Set(username.to_string()),
            item_type: ActiveValue::Set(item_type.to_string()),
            quantity: ActiveValue::Set(quantity),
        }
    }
}

impl From<Model> for InventoryItem {
    fn from(value: Model) -> Self {
        Self {
            item_type: value.item_type,
            quantity: value.quantity,
        }
    }
}
