//! Wallet balance service.
//!
//! `apply_transaction` is the single routine that moves a wallet balance.
//! It is invoked only from inside a posting commit; no other code path
//! writes `balance`.

use chrono::{DateTime, Utc};
use merx_shared::types::{UserId, WalletTransactionId};
use rust_decimal::Decimal;

use crate::wallet::error::WalletError;
use crate::wallet::receipt::Receipt;
use crate::wallet::types::{Wallet, WalletTransaction, WalletTransactionType};

/// The ledger effect of applying one transaction to one wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTransaction {
    /// Balance before the transaction.
    pub balance_before: Decimal,
    /// Balance after the transaction.
    pub balance_after: Decimal,
}

impl AppliedTransaction {
    /// Captures this effect onto the transaction's immutable posting
    /// snapshot.
    pub fn capture_on(&self, tx: &mut WalletTransaction) {
        tx.balance_before = Some(self.balance_before);
        tx.balance_after = Some(self.balance_after);
    }
}

/// Wallet balance service.
///
/// Pure business logic: the caller supplies the locked wallet row and
/// persists both sides of the result in one transaction.
pub struct WalletService;

impl WalletService {
    /// Applies a transaction to a wallet.
    ///
    /// On success the wallet balance is updated in place; on error the
    /// wallet is untouched.
    ///
    /// # Errors
    ///
    /// Returns `WalletError` if the transaction is structurally invalid or
    /// would overdraw the wallet.
    pub fn apply_transaction(
        wallet: &mut Wallet,
        tx: &WalletTransaction,
    ) -> Result<AppliedTransaction, WalletError> {
        if tx.wallet_id != wallet.id {
            return Err(WalletError::TransactionWalletMismatch);
        }
        if tx.amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        if tx.currency != wallet.currency {
            return Err(WalletError::CurrencyMismatch {
                wallet: wallet.currency,
                transaction: tx.currency,
            });
        }

        let balance_before = wallet.balance;
        let balance_after = match tx.transaction_type {
            WalletTransactionType::Deposit => balance_before + tx.amount,
            WalletTransactionType::Withdrawal => {
                let after = balance_before - tx.amount;
                if after < Decimal::ZERO {
                    return Err(WalletError::InsufficientFunds {
                        balance: balance_before,
                        requested: tx.amount,
                    });
                }
                after
            }
        };

        wallet.balance = balance_after;
        Ok(AppliedTransaction {
            balance_before,
            balance_after,
        })
    }

    /// Validates a receipt's structural invariants before posting.
    ///
    /// # Errors
    ///
    /// Returns `WalletError` if the receipt has no items, an invalid item,
    /// or a total that disagrees with its item subtotals.
    pub fn validate_receipt(receipt: &Receipt) -> Result<(), WalletError> {
        if receipt.items.is_empty() {
            return Err(WalletError::EmptyReceipt);
        }
        for item in &receipt.items {
            if item.quantity <= 0
                || item.unit_price < Decimal::ZERO
                || item.subtotal != Decimal::from(item.quantity) * item.unit_price
            {
                return Err(WalletError::InvalidReceiptItem {
                    description: item.description.clone(),
                });
            }
        }

        let items_total = receipt.items_total();
        if items_total != receipt.total_amount {
            return Err(WalletError::ReceiptTotalMismatch {
                total: receipt.total_amount,
                items_total,
            });
        }
        if receipt.total_amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        Ok(())
    }

    /// Builds the single wallet transaction a receipt produces when posted.
    ///
    /// The transaction starts as a draft; the engine posts it in the same
    /// commit that freezes the receipt.
    #[must_use]
    pub fn transaction_for_receipt(
        receipt: &Receipt,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> WalletTransaction {
        WalletTransaction {
            id: WalletTransactionId::new(),
            organization_id: receipt.organization_id,
            wallet_id: receipt.wallet_id,
            transaction_type: receipt.kind.transaction_type(),
            amount: receipt.total_amount,
            currency: receipt.currency,
            balance_before: None,
            balance_after: None,
            sales_order_id: None,
            receipt_id: Some(receipt.id),
            note: Some(format!("Receipt {}", receipt.receipt_number)),
            created_by,
            created_at: now,
            posting: crate::posting::PostingState::draft(),
        }
    }
}
