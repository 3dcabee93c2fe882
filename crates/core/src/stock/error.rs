//! Stock error types for movement validation and valuation.

use thiserror::Error;

/// Errors that can occur while applying a stock movement.
#[derive(Debug, Error)]
pub enum StockError {
    /// Movement quantity must be a positive magnitude.
    #[error("Movement quantity must be positive")]
    InvalidQuantity,

    /// Unit cost cannot be negative.
    #[error("Unit cost cannot be negative")]
    NegativeUnitCost,

    /// Purchase movements must carry a unit cost.
    #[error("Purchase movements require a unit cost")]
    MissingUnitCost,

    /// The movement would drive stock below zero.
    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock {
        /// Units on hand before the movement.
        available: i64,
        /// Units the movement tries to remove.
        requested: i64,
    },

    /// Transfer is missing a source or destination location.
    #[error("Transfer requires both a source and a destination location")]
    TransferLocationsRequired,

    /// Transfer source and destination must differ.
    #[error("Transfer source and destination locations must differ")]
    TransferSameLocation,

    /// The movement does not reference the supplied variant.
    #[error("Movement does not belong to the supplied variant")]
    MovementVariantMismatch,

    /// FIFO batch ledger does not cover the variant quantity.
    #[error("Cost batch ledger out of sync: {batch_quantity} units in batches, {requested} requested")]
    BatchLedgerOutOfSync {
        /// Units remaining across all batches.
        batch_quantity: i64,
        /// Units the movement tries to consume.
        requested: i64,
    },
}

impl StockError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::NegativeUnitCost => "NEGATIVE_UNIT_COST",
            Self::MissingUnitCost => "MISSING_UNIT_COST",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::TransferLocationsRequired => "TRANSFER_LOCATIONS_REQUIRED",
            Self::TransferSameLocation => "TRANSFER_SAME_LOCATION",
            Self::MovementVariantMismatch => "MOVEMENT_VARIANT_MISMATCH",
            Self::BatchLedgerOutOfSync { .. } => "BATCH_LEDGER_OUT_OF_SYNC",
        }
    }
}
