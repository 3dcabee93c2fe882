//! Wallet error types.

use merx_shared::types::Currency;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while applying wallet transactions and receipts.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Transaction amount must be positive.
    #[error("Transaction amount must be positive")]
    InvalidAmount,

    /// Transaction currency does not match the wallet currency.
    #[error("Currency mismatch: wallet is {wallet}, transaction is {transaction}")]
    CurrencyMismatch {
        /// The wallet's currency.
        wallet: Currency,
        /// The transaction's currency.
        transaction: Currency,
    },

    /// The withdrawal would drive the balance below zero.
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Balance before the withdrawal.
        balance: Decimal,
        /// Amount the withdrawal tries to take.
        requested: Decimal,
    },

    /// The transaction does not reference the supplied wallet.
    #[error("Transaction does not belong to the supplied wallet")]
    TransactionWalletMismatch,

    /// Receipt total does not equal the sum of its item subtotals.
    #[error("Receipt total {total} does not match item subtotals {items_total}")]
    ReceiptTotalMismatch {
        /// The receipt's declared total.
        total: Decimal,
        /// The sum of the item subtotals.
        items_total: Decimal,
    },

    /// Receipt has no items.
    #[error("Receipt must have at least one item")]
    EmptyReceipt,

    /// A receipt item has a non-positive quantity or negative price.
    #[error("Receipt item '{description}' is invalid")]
    InvalidReceiptItem {
        /// The offending item's description.
        description: String,
    },
}

impl WalletError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::TransactionWalletMismatch => "TRANSACTION_WALLET_MISMATCH",
            Self::ReceiptTotalMismatch { .. } => "RECEIPT_TOTAL_MISMATCH",
            Self::EmptyReceipt => "EMPTY_RECEIPT",
            Self::InvalidReceiptItem { .. } => "INVALID_RECEIPT_ITEM",
        }
    }
}
