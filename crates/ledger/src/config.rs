//! Ledger policy knobs.

use std::time::Duration;

use serde::Deserialize;

use crate::{LedgerError, ResultLedger};

/// Policy constants of the ledger.
///
/// Deserializable so the application settings can embed it as a `[ledger]`
/// table; missing keys fall back to [`LedgerConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Coins granted to an identity the first time it is seen.
    pub starting_balance: i64,
    /// How many times an atomic scope is replayed after transient contention.
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry.
    pub retry_backoff_ms: u64,
    /// Upper bound for a single write operation, retries included.
    pub operation_timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            max_retries: 5,
            retry_backoff_ms: 10,
            operation_timeout_ms: 5_000,
        }
    }
}

impl LedgerConfig {
    #[must_use]
    pub fn starting_balance(mut self, starting_balance: i64) -> Self {
        self.starting_balance = starting_balance;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub(crate) fn validate(&self) -> ResultLedger<()> {
        if self.starting_balance < 0 {
            return Err(LedgerError::InvalidAmount(
                "starting_balance must be >= 0".to_string(),
            ));
        }
        if self.operation_timeout_ms == 0 {
            return Err(LedgerError::InvalidAmount(
                "operation_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_store_policy() {
        let config = LedgerConfig::default();
        assert_eq!(config.starting_balance, 1000);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_table_keeps_defaults() {
        let config: LedgerConfig =
            serde_json::from_str(r#"{ "starting_balance": 100 }"#).unwrap();
        assert_eq!(config.starting_balance, 100);
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn negative_starting_balance_is_rejected() {
        let config = LedgerConfig::default().starting_balance(-1);
        assert!(matches!(
            config.validate(),
            Err(LedgerError::InvalidAmount(_))
        ));
    }
}
