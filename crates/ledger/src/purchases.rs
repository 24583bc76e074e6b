//! Purchase records: the coins that left circulation and what they bought.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub identity: String,
    pub item_type: String,
    pub quantity: i64,
    pub total_cost: i64,
    pub created_at: DateTime<Utc>,
}

impl PurchaseRecord {
    pub(crate) fn new(
        identity: String,
        item_type: String,
        quantity: i64,
        total_cost: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            identity,
            item_type,
            quantity,
            total_cost,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub item_type: String,
    pub quantity: i64,
    pub total_cost: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PurchaseRecord> for ActiveModel {
    fn from(value: &PurchaseRecord) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            username: ActiveValue::Set(value.identity.clone()),
            item_type: ActiveValue::Set(value.item_type.clone()),
            quantity: ActiveValue::Set(value.quantity),
            total_cost: ActiveValue::Set(value.total_cost),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for PurchaseRecord {
    type Error = LedgerError;

    fn try_from(value: Model) -> ResultLedger<Self> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| LedgerError::Internal(format!("invalid purchase id: {}", value.id)))?;
        Ok(Self {
            id,
            identity: value.username,
            item_type: value.item_type,
            quantity: value.quantity,
            total_cost: value.total_cost,
            created_at: value.created_at,
        })
    }
}
