//! The module contains the errors the ledger can return.
//!
//! Every variant belongs to exactly one [`ErrorClass`]; callers (the HTTP
//! layer, the admin CLI) decide how to surface a failure from its class, and
//! the engine decides whether to retry from [`LedgerError::is_transient`].
use sea_orm::DbErr;
use thiserror::Error;

use crate::util::is_transient_db_error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
    #[error("Self transfer rejected: {0}")]
    SelfTransfer(String),
    #[error("\"{0}\" user not found!")]
    UserNotFound(String),
    #[error("\"{0}\" sender not found!")]
    SenderNotFound(String),
    #[error("\"{0}\" receiver not found!")]
    ReceiverNotFound(String),
    #[error("\"{0}\" item not found!")]
    ItemNotFound(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse failure taxonomy used for retry and surfacing decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input, rejected before any mutation.
    Validation,
    /// Unknown identity or item; terminal for the request.
    NotFound,
    /// Business rule rejection (insufficient funds).
    BusinessRule,
    /// Storage, timeout or invariant failures.
    Infrastructure,
}

impl LedgerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidAmount(_) | Self::InvalidIdentity(_) | Self::SelfTransfer(_) => {
                ErrorClass::Validation
            }
            Self::UserNotFound(_)
            | Self::SenderNotFound(_)
            | Self::ReceiverNotFound(_)
            | Self::ItemNotFound(_) => ErrorClass::NotFound,
            Self::InsufficientFunds(_) => ErrorClass::BusinessRule,
            Self::Timeout(_) | Self::Internal(_) | Self::Database(_) => {
                ErrorClass::Infrastructure
            }
        }
    }

    /// Whether the failure comes from transient storage contention and the
    /// whole atomic scope may be replayed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(err) => is_transient_db_error(err),
            _ => false,
        }
    }
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidIdentity(a), Self::InvalidIdentity(b)) => a == b,
            (Self::SelfTransfer(a), Self::SelfTransfer(b)) => a == b,
            (Self::UserNotFound(a), Self::UserNotFound(b)) => a == b,
            (Self::SenderNotFound(a), Self::SenderNotFound(b)) => a == b,
            (Self::ReceiverNotFound(a), Self::ReceiverNotFound(b)) => a == b,
            (Self::ItemNotFound(a), Self::ItemNotFound(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
