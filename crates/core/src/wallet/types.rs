//! Wallet domain types.

use chrono::{DateTime, Utc};
use merx_shared::types::{
    Currency, CustomerId, OrganizationId, ReceiptId, SalesOrderId, UserId, WalletId,
    WalletTransactionId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::posting::{Postable, PostingState};

/// Type of wallet transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletTransactionType {
    /// Money added to the wallet.
    Deposit,
    /// Money taken out of the wallet.
    Withdrawal,
}

impl WalletTransactionType {
    /// Returns the string representation of the transaction type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for WalletTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer wallet.
///
/// `balance` is never negative and is mutated only by posted wallet
/// transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique identifier.
    pub id: WalletId,
    /// Organization this wallet belongs to.
    pub organization_id: OrganizationId,
    /// The customer who owns this wallet (one wallet per customer).
    pub customer_id: CustomerId,
    /// Currency the wallet is denominated in.
    pub currency: Currency,
    /// Current balance. Never negative.
    pub balance: Decimal,
}

impl Wallet {
    /// Creates a new empty wallet for a customer.
    #[must_use]
    pub fn new(organization_id: OrganizationId, customer_id: CustomerId, currency: Currency) -> Self {
        Self {
            id: WalletId::new(),
            organization_id,
            customer_id,
            currency,
            balance: Decimal::ZERO,
        }
    }
}

/// A wallet transaction document.
///
/// Posting captures the balance before and after as an immutable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    /// Unique identifier.
    pub id: WalletTransactionId,
    /// Organization this transaction belongs to.
    pub organization_id: OrganizationId,
    /// The wallet this transaction affects.
    pub wallet_id: WalletId,
    /// Deposit or withdrawal.
    pub transaction_type: WalletTransactionType,
    /// The amount moved. Always positive.
    pub amount: Decimal,
    /// Currency of the amount; must match the wallet.
    pub currency: Currency,
    /// Balance immediately before posting. Captured at posting time.
    pub balance_before: Option<Decimal>,
    /// Balance immediately after posting. Captured at posting time.
    pub balance_after: Option<Decimal>,
    /// The sales order this transaction settles, if any.
    pub sales_order_id: Option<SalesOrderId>,
    /// The receipt that produced this transaction, if any.
    pub receipt_id: Option<ReceiptId>,
    /// Free-form note.
    pub note: Option<String>,
    /// The user who created the transaction.
    pub created_by: UserId,
    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
    /// Posting lifecycle fields.
    pub posting: PostingState,
}

impl WalletTransaction {
    /// Returns the signed amount (positive for deposit, negative for
    /// withdrawal).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            WalletTransactionType::Deposit => self.amount,
            WalletTransactionType::Withdrawal => -self.amount,
        }
    }
}

impl Postable for WalletTransaction {
    fn posting(&self) -> &PostingState {
        &self.posting
    }

    fn posting_mut(&mut self) -> &mut PostingState {
        &mut self.posting
    }
}

/// Input for creating a new draft wallet transaction.
#[derive(Debug, Clone)]
pub struct CreateWalletTransactionInput {
    /// The organization the transaction belongs to.
    pub organization_id: OrganizationId,
    /// The wallet the transaction affects.
    pub wallet_id: WalletId,
    /// Deposit or withdrawal.
    pub transaction_type: WalletTransactionType,
    /// The amount to move. Must be positive.
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
    /// The sales order this transaction settles, if any.
    pub sales_order_id: Option<SalesOrderId>,
    /// Free-form note.
    pub note: Option<String>,
    /// The user creating the transaction.
    pub created_by: UserId,
}

impl CreateWalletTransactionInput {
    /// Builds the draft transaction document from this input.
    #[must_use]
    pub fn into_draft(self, now: DateTime<Utc>) -> WalletTransaction {
        WalletTransaction {
            id: WalletTransactionId::new(),
            organization_id: self.organization_id,
            wallet_id: self.wallet_id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            currency: self.currency,
            balance_before: None,
            balance_after: None,
            sales_order_id: self.sales_order_id,
            receipt_id: None,
            note: self.note,
            created_by: self.created_by,
            created_at: now,
            posting: PostingState::draft(),
        }
    }
}
