use chrono::Utc;
use sea_orm::{QueryFilter, prelude::*, sea_query::Expr};

use crate::{
    LedgerError, PurchaseCmd, PurchaseRecord, ResultLedger, catalog, inventory, purchases,
    util::normalize_identity,
};

use super::{AtomicScope, Ledger};

impl Ledger {
    /// Buy `cmd.quantity` units of a catalog item.
    ///
    /// The debit, the inventory increment and the purchase record commit
    /// together. Coins spent on merch leave circulation.
    pub async fn purchase(&self, cmd: PurchaseCmd) -> ResultLedger<PurchaseRecord> {
        let identity = normalize_identity(&cmd.identity, "identity")?;
        let item_type = cmd.item_type.trim();
        if item_type.is_empty() {
            return Err(LedgerError::ItemNotFound(String::new()));
        }
        if cmd.quantity <= 0 {
            return Err(LedgerError::InvalidAmount(
                "quantity must be > 0".to_string(),
            ));
        }
        let cmd = PurchaseCmd {
            identity,
            item_type: item_type.to_string(),
            quantity: cmd.quantity,
        };

        let record = self
            .run_scoped("purchase", || self.purchase_once(&cmd))
            .await?;
        tracing::debug!(
            identity = %record.identity,
            item = %record.item_type,
            quantity = record.quantity,
            cost = record.total_cost,
            "purchase committed"
        );
        Ok(record)
    }

    async fn purchase_once(&self, cmd: &PurchaseCmd) -> ResultLedger<PurchaseRecord> {
        let scope = self.open_scope(&[cmd.identity.as_str()]).await?;
        let account = self
            .lock_accounts(&scope, &[cmd.identity.as_str()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::UserNotFound(cmd.identity.clone()))?;

        let item = catalog::Entity::find_by_id(cmd.item_type.clone())
            .one(scope.tx())
            .await?
            .ok_or_else(|| LedgerError::ItemNotFound(cmd.item_type.clone()))?;
        let total_cost = item.price.checked_mul(cmd.quantity).ok_or_else(|| {
            LedgerError::InvalidAmount(format!(
                "{} x {} overflows the cost",
                cmd.quantity, cmd.item_type
            ))
        })?;

        if account.balance < total_cost {
            return Err(LedgerError::InsufficientFunds(format!(
                "{} has {}, {} x {} costs {}",
                cmd.identity, account.balance, cmd.quantity, cmd.item_type, total_cost
            )));
        }

        self.debit(&scope, &cmd.identity, total_cost).await?;
        self.add_to_inventory(&scope, &cmd.identity, &cmd.item_type, cmd.quantity)
            .await?;

        let record = PurchaseRecord::new(
            cmd.identity.clone(),
            cmd.item_type.clone(),
            cmd.quantity,
            total_cost,
            Utc::now(),
        );
        purchases::Entity::insert(purchases::ActiveModel::from(&record))
            .exec_without_returning(scope.tx())
            .await?;

        scope.commit().await?;
        Ok(record)
    }

    /// Increase the owned quantity of `item_type`, creating the row on the
    /// first purchase.
    async fn add_to_inventory(
        &self,
        scope: &AtomicScope,
        identity: &str,
        item_type: &str,
        quantity: i64,
    ) -> ResultLedger<()> {
        scope.ensure_held(identity)?;
        let owned = inventory::Entity::find_by_id((identity.to_string(), item_type.to_string()))
            .one(scope.tx())
            .await?;

        match owned {
            Some(row) => {
                if row.quantity.checked_add(quantity).is_none() {
                    return Err(LedgerError::InvalidAmount(format!(
                        "{identity} can not own more {item_type}"
                    )));
                }
                inventory::Entity::update_many()
                    .col_expr(
                        inventory::Column::Quantity,
                        Expr::col(inventory::Column::Quantity).add(quantity),
                    )
                    .filter(inventory::Column::Username.eq(identity))
                    .filter(inventory::Column::ItemType.eq(item_type))
                    .exec(scope.tx())
                    .await?;
            }
            None => {
                inventory::Entity::insert(inventory::ActiveModel::first(
                    identity, item_type, quantity,
                ))
                .exec_without_returning(scope.tx())
                .await?;
            }
        }
        Ok(())
    }
}
