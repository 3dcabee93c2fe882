//! Journal error types.

use merx_shared::types::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Entry has no lines.
    #[error("Journal entry must have at least two lines")]
    InsufficientLines,

    /// A line must carry exactly one positive side.
    #[error("Journal line must have exactly one of debit or credit, both non-negative")]
    InvalidLine,

    /// Entry does not balance.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// A line references a missing, inactive, or cross-tenant account.
    #[error("Invalid account: {0}")]
    InvalidAccount(AccountId),

    /// Account code already used in the organization.
    #[error("Account code '{0}' is already in use")]
    DuplicateAccountCode(String),

    /// The referenced parent account does not exist in the organization.
    #[error("Parent account not found: {0}")]
    ParentAccountNotFound(AccountId),

    /// Linking the account under this parent would create a cycle.
    #[error("Account parent chain would form a cycle at {0}")]
    AccountCycle(AccountId),
}

impl JournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::InvalidLine => "INVALID_LINE",
            Self::Unbalanced { .. } => "UNBALANCED",
            Self::InvalidAccount(_) => "INVALID_ACCOUNT",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::ParentAccountNotFound(_) => "PARENT_ACCOUNT_NOT_FOUND",
            Self::AccountCycle(_) => "ACCOUNT_CYCLE",
        }
    }
}
