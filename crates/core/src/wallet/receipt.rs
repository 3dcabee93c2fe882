//! Receipt documents.
//!
//! A receipt is the printable, auditable record behind a wallet movement.
//! Posting a receipt produces exactly one wallet transaction and links it
//! back; until then `wallet_transaction_id` is null.

use chrono::{DateTime, Utc};
use merx_shared::types::{
    Currency, OrganizationId, ReceiptId, UserId, WalletId, WalletTransactionId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::posting::{Postable, PostingState};
use crate::wallet::types::WalletTransactionType;

/// The kind of wallet movement a receipt documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptKind {
    /// Customer pays money into their wallet.
    Deposit,
    /// Customer takes money out of their wallet.
    Withdrawal,
}

impl ReceiptKind {
    /// Returns the wallet transaction type this receipt produces.
    #[must_use]
    pub fn transaction_type(self) -> WalletTransactionType {
        match self {
            Self::Deposit => WalletTransactionType::Deposit,
            Self::Withdrawal => WalletTransactionType::Withdrawal,
        }
    }
}

/// A line on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    /// What the line is for.
    pub description: String,
    /// Number of units.
    pub quantity: i64,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Line total: `quantity * unit_price`.
    pub subtotal: Decimal,
}

/// A receipt document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique identifier.
    pub id: ReceiptId,
    /// Organization this receipt belongs to.
    pub organization_id: OrganizationId,
    /// The wallet this receipt settles against.
    pub wallet_id: WalletId,
    /// Deposit or withdrawal.
    pub kind: ReceiptKind,
    /// Human-facing receipt number.
    pub receipt_number: String,
    /// Currency of all amounts on this receipt.
    pub currency: Currency,
    /// Receipt lines.
    pub items: Vec<ReceiptItem>,
    /// Total amount; must equal the sum of item subtotals.
    pub total_amount: Decimal,
    /// The wallet transaction produced by posting. Null until posted.
    pub wallet_transaction_id: Option<WalletTransactionId>,
    /// The user who created the receipt.
    pub created_by: UserId,
    /// When the receipt was created.
    pub created_at: DateTime<Utc>,
    /// Posting lifecycle fields.
    pub posting: PostingState,
}

impl Receipt {
    /// Sums the item subtotals.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|item| item.subtotal).sum()
    }
}

impl Postable for Receipt {
    fn posting(&self) -> &PostingState {
        &self.posting
    }

    fn posting_mut(&mut self) -> &mut PostingState {
        &mut self.posting
    }
}

/// Input for one receipt line.
#[derive(Debug, Clone)]
pub struct ReceiptItemInput {
    /// What the line is for.
    pub description: String,
    /// Number of units. Must be positive.
    pub quantity: i64,
    /// Price per unit. Must not be negative.
    pub unit_price: Decimal,
}

/// Input for creating a new draft receipt.
#[derive(Debug, Clone)]
pub struct CreateReceiptInput {
    /// The organization the receipt belongs to.
    pub organization_id: OrganizationId,
    /// The wallet the receipt settles against.
    pub wallet_id: WalletId,
    /// Deposit or withdrawal.
    pub kind: ReceiptKind,
    /// Human-facing receipt number.
    pub receipt_number: String,
    /// Currency of all amounts on this receipt.
    pub currency: Currency,
    /// Receipt lines.
    pub items: Vec<ReceiptItemInput>,
    /// The user creating the receipt.
    pub created_by: UserId,
}

impl CreateReceiptInput {
    /// Builds the draft receipt, computing line subtotals and the total.
    #[must_use]
    pub fn into_draft(self, now: DateTime<Utc>) -> Receipt {
        let items: Vec<ReceiptItem> = self
            .items
            .into_iter()
            .map(|item| ReceiptItem {
                subtotal: Decimal::from(item.quantity) * item.unit_price,
                description: item.description,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();
        let total_amount = items.iter().map(|item| item.subtotal).sum();

        Receipt {
            id: ReceiptId::new(),
            organization_id: self.organization_id,
            wallet_id: self.wallet_id,
            kind: self.kind,
            receipt_number: self.receipt_number,
            currency: self.currency,
            items,
            total_amount,
            wallet_transaction_id: None,
            created_by: self.created_by,
            created_at: now,
            posting: PostingState::draft(),
        }
    }
}
