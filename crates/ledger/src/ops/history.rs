//! Read side of the ledger.
//!
//! Nothing here takes a row guard. Every reader sees committed state only.

use sea_orm::{
    Condition, ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    CatalogItem, InventoryItem, LedgerError, PurchaseRecord, ResultLedger, TransferEntry,
    TransferHistory, TransferRecord, accounts, catalog, inventory, purchases, transfers,
};

use super::Ledger;

/// Balance, inventory and transfer history of one account, read as a single
/// snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub identity: String,
    pub balance: i64,
    pub inventory: Vec<InventoryItem>,
    pub history: TransferHistory,
}

impl Ledger {
    /// Items owned by `identity`, ordered by item type.
    ///
    /// An unknown identity owns nothing.
    pub async fn inventory(&self, identity: &str) -> ResultLedger<Vec<InventoryItem>> {
        load_inventory(&self.database, identity.trim()).await
    }

    /// Transfers `identity` took part in, newest first.
    pub async fn transfer_history(&self, identity: &str) -> ResultLedger<Vec<TransferEntry>> {
        load_transfers(&self.database, identity.trim()).await
    }

    /// Same as [`Ledger::transfer_history`], split into sent and received.
    pub async fn transfer_history_split(&self, identity: &str) -> ResultLedger<TransferHistory> {
        self.transfer_history(identity)
            .await
            .map(TransferHistory::from)
    }

    /// Purchases made by `identity`, newest first.
    pub async fn purchase_history(&self, identity: &str) -> ResultLedger<Vec<PurchaseRecord>> {
        purchases::Entity::find()
            .filter(purchases::Column::Username.eq(identity.trim()))
            .order_by_desc(purchases::Column::CreatedAt)
            .order_by_desc(purchases::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(PurchaseRecord::try_from)
            .collect()
    }

    /// Balance, inventory and transfer history inside one read transaction.
    pub async fn account_info(&self, identity: &str) -> ResultLedger<AccountInfo> {
        let identity = identity.trim();
        let read_tx = self.database.begin().await?;

        let account = accounts::Entity::find_by_id(identity.to_string())
            .one(&read_tx)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(identity.to_string()))?;
        let inventory = load_inventory(&read_tx, identity).await?;
        let history = TransferHistory::from(load_transfers(&read_tx, identity).await?);

        read_tx.commit().await?;
        Ok(AccountInfo {
            identity: account.username,
            balance: account.balance,
            inventory,
            history,
        })
    }

    /// The whole catalog, cheapest first.
    pub async fn catalog(&self) -> ResultLedger<Vec<CatalogItem>> {
        let items = catalog::Entity::find()
            .order_by_asc(catalog::Column::Price)
            .order_by_asc(catalog::Column::ItemType)
            .all(&self.database)
            .await?;
        Ok(items.into_iter().map(CatalogItem::from).collect())
    }

    /// Unit price of `item_type`.
    pub async fn price(&self, item_type: &str) -> ResultLedger<i64> {
        let item_type = item_type.trim();
        catalog::Entity::find_by_id(item_type.to_string())
            .one(&self.database)
            .await?
            .map(|item| item.price)
            .ok_or_else(|| LedgerError::ItemNotFound(item_type.to_string()))
    }

    /// Coins currently in circulation: the sum of all balances.
    pub async fn supply(&self) -> ResultLedger<i64> {
        self.sum("SELECT COALESCE(SUM(balance), 0) AS sum FROM accounts;")
            .await
    }

    /// Coins removed from circulation by purchases.
    pub async fn total_spent(&self) -> ResultLedger<i64> {
        self.sum("SELECT COALESCE(SUM(total_cost), 0) AS sum FROM purchases;")
            .await
    }

    async fn sum(&self, sql: &str) -> ResultLedger<i64> {
        let stmt = Statement::from_string(self.database.get_database_backend(), sql.to_string());
        let row = self.database.query_one(stmt).await?;
        Ok(row
            .map(|r| r.try_get::<i64>("", "sum"))
            .transpose()?
            .unwrap_or(0))
    }
}

async fn load_inventory<C>(conn: &C, identity: &str) -> ResultLedger<Vec<InventoryItem>>
where
    C: ConnectionTrait,
{
    let rows = inventory::Entity::find()
        .filter(inventory::Column::Username.eq(identity))
        .order_by_asc(inventory::Column::ItemType)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(InventoryItem::from).collect())
}

async fn load_transfers<C>(conn: &C, identity: &str) -> ResultLedger<Vec<TransferEntry>>
where
    C: ConnectionTrait,
{
    let rows = transfers::Entity::find()
        .filter(
            Condition::any()
                .add(transfers::Column::Sender.eq(identity))
                .add(transfers::Column::Receiver.eq(identity)),
        )
        .order_by_desc(transfers::Column::CreatedAt)
        .order_by_desc(transfers::Column::Id)
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|row| {
            TransferRecord::try_from(row).map(|record| TransferEntry::for_identity(identity, record))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;

    use super::*;

    async fn ledger() -> Ledger {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Ledger::builder().database(db).build().await.unwrap()
    }

    #[tokio::test]
    async fn sum_reads_the_aggregate() {
        let ledger = ledger().await;
        assert_eq!(ledger.sum("SELECT 42 AS sum;").await, Ok(42));
        assert_eq!(ledger.sum("SELECT 42 AS sum WHERE 0;").await, Ok(0));
    }

    #[tokio::test]
    async fn undecodable_sum_is_an_error() {
        let ledger = ledger().await;
        let err = ledger.sum("SELECT 'many' AS sum;").await.unwrap_err();
        assert!(matches!(err, LedgerError::Database(_)));
    }
}
