//! Account store: provisioning, balance reads and the only code paths that
//! mutate a balance.

use chrono::Utc;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

use crate::{Account, LedgerError, ResultLedger, accounts, util::normalize_identity};

use super::{AtomicScope, Ledger};

impl Ledger {
    /// Return the account of `identity`, creating it with the starting balance
    /// if this is the first time the identity is seen.
    ///
    /// Creation is a single insert-if-absent statement, so concurrent first
    /// logins of the same identity create exactly one account.
    pub async fn provision(&self, identity: &str) -> ResultLedger<Account> {
        let identity = normalize_identity(identity, "identity")?;
        self.run_scoped("provision", || self.provision_once(&identity))
            .await
    }

    async fn provision_once(&self, identity: &str) -> ResultLedger<Account> {
        let scope = self.open_scope(&[identity]).await?;

        let fresh = accounts::ActiveModel {
            username: ActiveValue::Set(identity.to_string()),
            balance: ActiveValue::Set(self.config.starting_balance),
            created_at: ActiveValue::Set(Utc::now()),
        };
        let inserted = accounts::Entity::insert(fresh)
            .on_conflict(
                OnConflict::column(accounts::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(scope.tx())
            .await?;

        let model = accounts::Entity::find_by_id(identity.to_string())
            .one(scope.tx())
            .await?
            .ok_or_else(|| {
                LedgerError::Internal(format!("account \"{identity}\" vanished after provisioning"))
            })?;
        scope.commit().await?;

        if inserted > 0 {
            tracing::info!(identity, balance = model.balance, "account provisioned");
        }
        Ok(Account::from(model))
    }

    /// Return the account of `identity` without provisioning it.
    pub async fn account(&self, identity: &str) -> ResultLedger<Account> {
        let identity = identity.trim();
        accounts::Entity::find_by_id(identity.to_string())
            .one(&self.database)
            .await?
            .map(Account::from)
            .ok_or_else(|| LedgerError::UserNotFound(identity.to_string()))
    }

    /// Current committed balance of `identity`.
    pub async fn balance(&self, identity: &str) -> ResultLedger<i64> {
        self.account(identity).await.map(|account| account.balance)
    }

    /// Read the account rows of `identities` with exclusive row locks, in
    /// ascending identity order. Missing identities are simply absent from the
    /// result.
    pub(super) async fn lock_accounts(
        &self,
        scope: &AtomicScope,
        identities: &[&str],
    ) -> ResultLedger<Vec<accounts::Model>> {
        for identity in identities {
            scope.ensure_held(identity)?;
        }
        let rows = accounts::Entity::find()
            .filter(accounts::Column::Username.is_in(identities.iter().copied()))
            .order_by_asc(accounts::Column::Username)
            .lock_exclusive()
            .all(scope.tx())
            .await?;
        Ok(rows)
    }

    /// Remove `amount` coins from `identity`.
    ///
    /// The update only matches while `balance >= amount`, so a balance can not
    /// go negative even if a caller skipped its own check.
    pub(super) async fn debit(
        &self,
        scope: &AtomicScope,
        identity: &str,
        amount: i64,
    ) -> ResultLedger<()> {
        scope.ensure_held(identity)?;
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).sub(amount),
            )
            .filter(accounts::Column::Username.eq(identity))
            .filter(accounts::Column::Balance.gte(amount))
            .exec(scope.tx())
            .await?;
        if result.rows_affected == 0 {
            return Err(LedgerError::InsufficientFunds(format!(
                "{identity} can not cover {amount}"
            )));
        }
        Ok(())
    }

    /// Add `amount` coins to `identity`.
    pub(super) async fn credit(
        &self,
        scope: &AtomicScope,
        identity: &str,
        amount: i64,
    ) -> ResultLedger<()> {
        scope.ensure_held(identity)?;
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(amount),
            )
            .filter(accounts::Column::Username.eq(identity))
            .exec(scope.tx())
            .await?;
        if result.rows_affected == 0 {
            return Err(LedgerError::UserNotFound(identity.to_string()));
        }
        Ok(())
    }
}
