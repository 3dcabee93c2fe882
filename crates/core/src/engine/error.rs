//! Engine error type aggregating every module's failures.

use merx_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::audit::AuditError;
use crate::engine::store::StoreError;
use crate::journal::JournalError;
use crate::posting::PostingError;
use crate::stock::StockError;
use crate::tenant::TenantError;
use crate::wallet::WalletError;

/// Errors surfaced by the ledger engine.
///
/// Every failure aborts the enclosing commit wholesale; no partial ledger
/// mutation is ever visible. `ConcurrentModification` is the only
/// retryable kind.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Posting state machine violation.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Stock movement validation or valuation failure.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Wallet transaction or receipt failure.
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Inventory audit failure.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Journal validation failure.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Cross-tenant access attempt.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity.
        entity: &'static str,
        /// The row's identifier.
        id: Uuid,
    },

    /// A row with this identifier already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// The kind of entity.
        entity: &'static str,
        /// The row's identifier.
        id: Uuid,
    },

    /// The row changed since it was read. Retry with backoff.
    #[error("Concurrent modification detected on {entity}, please retry")]
    ConcurrentModification {
        /// The kind of entity.
        entity: &'static str,
    },
}

impl EngineError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Posting(e) => e.error_code(),
            Self::Stock(e) => e.error_code(),
            Self::Wallet(e) => e.error_code(),
            Self::Audit(e) => e.error_code(),
            Self::Journal(e) => e.error_code(),
            Self::Tenant(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::AlreadyExists { entity, id } => Self::AlreadyExists { entity, id },
            StoreError::VersionConflict { entity, .. } => {
                Self::ConcurrentModification { entity }
            }
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::Tenant(_) => Self::Forbidden(message),
            EngineError::NotFound { .. } => Self::NotFound(message),
            EngineError::AlreadyExists { .. } | EngineError::ConcurrentModification { .. } => {
                Self::Conflict(message)
            }
            EngineError::Posting(_)
            | EngineError::Stock(_)
            | EngineError::Wallet(_)
            | EngineError::Audit(_)
            | EngineError::Journal(_) => Self::BusinessRule(message),
        }
    }
}
