//! Concurrent coin ledger of the merch store.
//!
//! Accounts hold a non-negative coin balance. Coins move between accounts
//! through [`Ledger::transfer`] and leave circulation through
//! [`Ledger::purchase`], which turns them into inventory. Every write runs in
//! one atomic scope that holds the rows it touches exclusively.

pub use accounts::Account;
pub use catalog::CatalogItem;
pub use commands::{PurchaseCmd, TransferCmd};
pub use config::LedgerConfig;
pub use error::{ErrorClass, LedgerError};
pub use inventory::InventoryItem;
pub use ops::{AccountInfo, Ledger, LedgerBuilder};
pub use purchases::PurchaseRecord;
pub use transfers::{Direction, TransferEntry, TransferHistory, TransferRecord};

mod accounts;
mod catalog;
mod commands;
mod config;
mod error;
mod guard;
mod inventory;
mod ops;
mod purchases;
mod transfers;
mod util;

type ResultLedger<T> = Result<T, LedgerError>;
