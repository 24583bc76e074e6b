//! Transfer records.
//!
//! A `TransferRecord` is written once, in the same atomic scope as the debit
//! and credit it documents, and never touched again. Readers see it from the
//! point of view of one identity as a `TransferEntry`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Time-ordered id, breaks ties between records sharing a timestamp.
    pub id: Uuid,
    pub sender: String,
    pub receiver: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl TransferRecord {
    pub(crate) fn new(
        sender: String,
        receiver: String,
        amount: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender,
            receiver,
            amount,
            created_at,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
}

/// One transfer as seen by one of its two parties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEntry {
    pub counterparty: String,
    pub amount: i64,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
}

impl TransferEntry {
    pub(crate) fn for_identity(identity: &str, record: TransferRecord) -> Self {
        if record.sender == identity {
            Self {
                counterparty: record.receiver,
                amount: record.amount,
                direction: Direction::Sent,
                created_at: record.created_at,
            }
        } else {
            Self {
                counterparty: record.sender,
                amount: record.amount,
                direction: Direction::Received,
                created_at: record.created_at,
            }
        }
    }
}

/// Transfer history split by direction, newest first in both lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferHistory {
    pub sent: Vec<TransferEntry>,
    pub received: Vec<TransferEntry>,
}

impl From<Vec<TransferEntry>> for TransferHistory {
    fn from(entries: Vec<TransferEntry>) -> Self {
        let (sent, received) = entries
            .into_iter()
            .partition(|entry| entry.direction == Direction::Sent);
        Self { sent, received }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub amount: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransferRecord> for ActiveModel {
    fn from(value: &TransferRecord) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            sender: ActiveValue::Set(value.sender.clone()),
            receiver: ActiveValue::Set(value.receiver.clone()),
            amount: ActiveValue::Set(value.amount),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for TransferRecord {
    type Error = LedgerError;

    fn try_from(value: Model) -> ResultLedger<Self> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| LedgerError::Internal(format!("invalid transfer id: {}", value.id)))?;
        Ok(Self {
            id,
            sender: value.sender,
            receiver: value.receiver,
            amount: value.amount,
            created_at: value.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record() -> TransferRecord {
        TransferRecord::new(
            "alice".to_string(),
            "bob".to_string(),
            300,
            Utc.timestamp_opt(0, 0).unwrap(),
        )
    }

    #[test]
    fn sender_sees_sent_entry() {
        let entry = TransferEntry::for_identity("alice", record());
        assert_eq!(entry.direction, Direction::Sent);
        assert_eq!(entry.counterparty, "bob");
        assert_eq!(entry.amount, 300);
    }

    #[test]
    fn receiver_sees_received_entry() {
        let entry = TransferEntry::for_identity("bob", record());
        assert_eq!(entry.direction, Direction::Received);
        assert_eq!(entry.counterparty, "alice");
    }

    #[test]
    fn history_splits_by_direction() {
        let history = TransferHistory::from(vec![
            TransferEntry::for_identity("alice", record()),
            TransferEntry::for_identity("bob", record()),
        ]);
        assert_eq!(history.sent.len(), 1);
        assert_eq!(history.received.len(), 1);
    }

    #[test]
    fn model_round_trip_keeps_id() {
        let record = record();
        let model = Model {
            id: record.id.to_string(),
            sender: record.sender.clone(),
            receiver: record.receiver.clone(),
            amount: record.amount,
            created_at: record.created_at,
        };
        assert_eq!(TransferRecord::try_from(model).unwrap(), record);
    }
}
