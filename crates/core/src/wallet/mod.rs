//! Customer wallet balances, transactions, and receipts.
//!
//! A wallet holds a non-negative balance per customer. Deposits and
//! withdrawals are posted documents that snapshot the balance before and
//! after; a receipt is a printable document that produces exactly one
//! wallet transaction when posted.

pub mod error;
pub mod receipt;
pub mod service;
pub mod types;

pub use error::WalletError;
pub use receipt::{CreateReceiptInput, Receipt, ReceiptItem, ReceiptItemInput, ReceiptKind};
pub use service::{AppliedTransaction, WalletService};
pub use types::{CreateWalletTransactionInput, Wallet, WalletTransaction, WalletTransactionType};
