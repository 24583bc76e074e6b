use std::future::Future;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::{
    LedgerConfig, LedgerError, ResultLedger,
    guard::{RowGuard, RowLocks},
};

mod accounts;
mod history;
mod purchase;
mod transfer;

pub use history::AccountInfo;

/// The ledger engine.
///
/// Owns the database handle, the policy constants and the per-account row
/// guards. Build one per process with [`Ledger::builder`] and share it by
/// reference (typically behind an `Arc`).
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
    config: LedgerConfig,
    rows: RowLocks,
}

/// A unit of work whose effects commit together or not at all.
///
/// Holds exclusive access to the account rows it was opened for. Dropping the
/// scope without [`AtomicScope::commit`] rolls the transaction back first and
/// then releases the rows (field order matters).
pub(crate) struct AtomicScope {
    db_tx: DatabaseTransaction,
    rows: RowGuard,
}

impl AtomicScope {
    pub(crate) fn tx(&self) -> &DatabaseTransaction {
        &self.db_tx
    }

    /// Fails unless the scope was opened for `identity`.
    pub(crate) fn ensure_held(&self, identity: &str) -> ResultLedger<()> {
        if self.rows.holds(identity) {
            return Ok(());
        }
        Err(LedgerError::Internal(format!(
            "account row \"{identity}\" touched outside its atomic scope"
        )))
    }

    pub(crate) async fn commit(self) -> ResultLedger<()> {
        let Self { db_tx, rows } = self;
        db_tx.commit().await?;
        drop(rows);
        Ok(())
    }
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Take the row guards of `identities`, then a database transaction.
    ///
    /// Guards are always taken before a pooled connection, so a scope never
    /// waits on a guard while holding a connection another scope needs.
    pub(crate) async fn open_scope(&self, identities: &[&str]) -> ResultLedger<AtomicScope> {
        let rows = self.rows.acquire(identities).await;
        let db_tx = self.database.begin().await?;
        Ok(AtomicScope { db_tx, rows })
    }

    /// Run one write operation under the configured timeout.
    ///
    /// `attempt` opens and commits its own scope; it is replayed after
    /// transient storage failures with exponential backoff, at most
    /// `max_retries` times. On timeout the in-flight attempt is dropped, which
    /// rolls its scope back.
    pub(crate) async fn run_scoped<T, F, Fut>(&self, op: &'static str, attempt: F) -> ResultLedger<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResultLedger<T>>,
    {
        let timeout = self.config.timeout();
        match tokio::time::timeout(timeout, self.retrying(op, attempt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(op, timeout_ms = self.config.operation_timeout_ms, "operation timed out");
                Err(LedgerError::Timeout(format!(
                    "{op} exceeded {}ms",
                    self.config.operation_timeout_ms
                )))
            }
        }
    }

    async fn retrying<T, F, Fut>(&self, op: &'static str, mut attempt: F) -> ResultLedger<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResultLedger<T>>,
    {
        let mut retries = 0;
        let mut backoff = self.config.retry_backoff();
        loop {
            match attempt().await {
                Err(err) if err.is_transient() => {
                    if retries >= self.config.max_retries {
                        tracing::error!(op, retries, "retries exhausted: {err}");
                        return Err(LedgerError::Internal(format!(
                            "{op} failed after {retries} retries: {err}"
                        )));
                    }
                    retries += 1;
                    tracing::warn!(op, retries, "transient storage error, retrying: {err}");
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                other => return other,
            }
        }
    }
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
    config: LedgerConfig,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Override the default policy constants
    pub fn config(mut self, config: LedgerConfig) -> LedgerBuilder {
        self.config = config;
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        self.config.validate()?;
        Ok(Ledger {
            database: self.database,
            config: self.config,
            rows: RowLocks::default(),
        })
    }
}
