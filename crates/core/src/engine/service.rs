//! The ledger engine.
//!
//! Exposes, per document type, the narrow surface the surrounding CRUD/API
//! layer consumes: create-draft, post, reject. Master data (organizations,
//! variants, wallets, accounts) is registered by the caller; actor identity
//! and timestamps are always explicit parameters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use merx_shared::types::{
    AccountId, InventoryAuditId, InventoryAuditItemId, JournalEntryId, OrganizationId, ReceiptId,
    StockMovementId, UserId, VariantId, WalletId, WalletTransactionId,
};
use merx_shared::EngineConfig;

use crate::audit::{AuditService, CreateAuditInput, InventoryAudit, InventoryAuditItem};
use crate::engine::error::EngineError;
use crate::engine::store::{MemoryLedgerStore, Versioned, WriteSet};
use crate::engine::types::{JournalAccountMap, OrganizationProfile};
use crate::journal::{
    Account, CreateJournalEntryInput, JournalEntry, JournalLineInput, JournalService,
};
use crate::posting::PostingService;
use crate::stock::{
    CreateStockMovementInput, MovementType, ProductVariant, StockError, StockMovement,
    StockService,
};
use crate::tenant;
use crate::wallet::{
    CreateReceiptInput, CreateWalletTransactionInput, Receipt, Wallet, WalletError, WalletService,
    WalletTransaction, WalletTransactionType,
};

macro_rules! entity_access {
    ($loader:ident, $getter:ident, $store_get:ident, $id_ty:ty, $record_ty:ty, $entity:literal) => {
        fn $loader(
            &self,
            organization_id: OrganizationId,
            id: $id_ty,
        ) -> Result<Versioned<$record_ty>, EngineError> {
            let row = self.store.$store_get(id).ok_or(EngineError::NotFound {
                entity: $entity,
                id: id.into_inner(),
            })?;
            tenant::require_same_org(organization_id, row.record.organization_id, $entity)?;
            Ok(row)
        }

        /// Loads a record, enforcing organization ownership.
        pub fn $getter(
            &self,
            organization_id: OrganizationId,
            id: $id_ty,
        ) -> Result<$record_ty, EngineError> {
            Ok(self.$loader(organization_id, id)?.record)
        }
    };
}

/// The posting & valuation ledger engine.
///
/// All ledger mutation is funneled through this type's posting operations;
/// each one runs as a single atomic store commit. Concurrent posts against
/// the same variant or wallet serialize via optimistic row versions.
pub struct LedgerEngine {
    store: MemoryLedgerStore,
    config: EngineConfig,
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl LedgerEngine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: MemoryLedgerStore::new(),
            config,
        }
    }

    entity_access!(
        load_variant,
        variant,
        get_variant,
        VariantId,
        ProductVariant,
        "product variant"
    );
    entity_access!(
        load_movement,
        stock_movement,
        get_movement,
        StockMovementId,
        StockMovement,
        "stock movement"
    );
    entity_access!(load_wallet, wallet, get_wallet, WalletId, Wallet, "wallet");
    entity_access!(
        load_wallet_transaction,
        wallet_transaction,
        get_wallet_transaction,
        WalletTransactionId,
        WalletTransaction,
        "wallet transaction"
    );
    entity_access!(
        load_receipt,
        receipt,
        get_receipt,
        ReceiptId,
        Receipt,
        "receipt"
    );
    entity_access!(
        load_audit,
        inventory_audit,
        get_audit,
        InventoryAuditId,
        InventoryAudit,
        "inventory audit"
    );
    entity_access!(
        load_audit_item,
        inventory_audit_item,
        get_audit_item,
        InventoryAuditItemId,
        InventoryAuditItem,
        "inventory audit item"
    );
    entity_access!(
        load_journal_entry,
        journal_entry,
        get_journal_entry,
        JournalEntryId,
        JournalEntry,
        "journal entry"
    );
    entity_access!(
        load_account,
        account,
        get_account,
        AccountId,
        Account,
        "account"
    );

    // ======================================================================
    // Master data registration (supplied by the surrounding platform)
    // ======================================================================

    /// Registers an organization with the engine.
    pub fn register_organization(&self, profile: OrganizationProfile) -> Result<(), EngineError> {
        self.store.insert_organization(profile)?;
        Ok(())
    }

    /// Loads an organization profile.
    pub fn organization_profile(
        &self,
        id: OrganizationId,
    ) -> Result<OrganizationProfile, EngineError> {
        self.store
            .organization(id)
            .ok_or(EngineError::NotFound {
                entity: "organization",
                id: id.into_inner(),
            })
    }

    /// Enables journal mirroring for an organization.
    ///
    /// Every mapped account must exist, be active, and belong to the
    /// organization.
    pub fn configure_journal_accounts(
        &self,
        organization_id: OrganizationId,
        accounts: JournalAccountMap,
    ) -> Result<(), EngineError> {
        let mut profile = self.organization_profile(organization_id)?;
        for account_id in [
            accounts.inventory_account_id,
            accounts.inventory_offset_account_id,
            accounts.cash_account_id,
            accounts.wallet_liability_account_id,
        ] {
            let account = self.account(organization_id, account_id)?;
            if !account.is_active {
                return Err(crate::journal::JournalError::InvalidAccount(account_id).into());
            }
        }

        profile.journal_accounts = Some(accounts);
        self.store.update_organization(profile)?;
        Ok(())
    }

    /// Registers a product variant.
    pub fn register_variant(&self, variant: ProductVariant) -> Result<(), EngineError> {
        self.organization_profile(variant.organization_id)?;
        self.store.insert_variant(variant)?;
        Ok(())
    }

    /// Registers a customer wallet.
    pub fn register_wallet(&self, wallet: Wallet) -> Result<(), EngineError> {
        self.organization_profile(wallet.organization_id)?;
        self.store.insert_wallet(wallet)?;
        Ok(())
    }

    /// Registers a chart of accounts entry.
    ///
    /// Account codes are unique per organization and the parent chain must
    /// be cycle-free.
    pub fn register_account(&self, account: Account) -> Result<(), EngineError> {
        self.organization_profile(account.organization_id)?;
        if self
            .store
            .account_code_in_use(account.organization_id, &account.account_code)
        {
            return Err(
                crate::journal::JournalError::DuplicateAccountCode(account.account_code).into(),
            );
        }
        JournalService::validate_parent_chain(&account, self.account_lookup())?;
        self.store.insert_account(account)?;
        Ok(())
    }

    // ======================================================================
    // Stock movements
    // ======================================================================

    /// Creates a draft stock movement.
    pub fn create_stock_movement(
        &self,
        input: CreateStockMovementInput,
        now: DateTime<Utc>,
    ) -> Result<StockMovementId, EngineError> {
        self.organization_profile(input.organization_id)?;
        self.load_variant(input.organization_id, input.variant_id)?;
        if input.quantity <= 0 {
            return Err(StockError::InvalidQuantity.into());
        }

        let movement = input.into_draft(now);
        let id = movement.id;
        self.store.insert_movement(movement)?;
        tracing::debug!(movement = %id, "stock movement drafted");
        Ok(id)
    }

    /// Posts a draft stock movement, applying it to the variant's stock and
    /// valuation in one atomic commit.
    pub fn post_stock_movement(
        &self,
        organization_id: OrganizationId,
        movement_id: StockMovementId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<StockMovement, EngineError> {
        let profile = self.organization_profile(organization_id)?;
        let stored_movement = self.load_movement(organization_id, movement_id)?;
        let mut movement = stored_movement.record.clone();

        PostingService::post_document(&mut movement, actor, now)?;

        let stored_variant = self.load_variant(organization_id, movement.variant_id)?;
        let mut variant = stored_variant.record.clone();
        let applied = StockService::apply_movement(&mut variant, &movement, profile.cost_method)?;
        applied.capture_on(&mut movement);

        let mut writes = WriteSet::default();
        if let Some(entry) = self.purchase_journal_entry(&profile, &movement, actor, now)? {
            writes.insert_journal_entry(entry);
        }
        writes.update_movement(stored_movement.version, movement.clone());
        writes.update_variant(stored_variant.version, variant);
        self.store.commit(writes)?;

        tracing::debug!(
            movement = %movement.id,
            variant = %movement.variant_id,
            stock_after = applied.stock_after,
            "stock movement posted"
        );
        Ok(movement)
    }

    /// Rejects a draft stock movement. Never touches ledger balances.
    pub fn reject_stock_movement(
        &self,
        organization_id: OrganizationId,
        movement_id: StockMovementId,
        actor: UserId,
        now: DateTime<Utc>,
        reason: String,
    ) -> Result<StockMovement, EngineError> {
        let stored = self.load_movement(organization_id, movement_id)?;
        let mut movement = stored.record.clone();
        PostingService::reject_document(&mut movement, actor, now, reason)?;

        let mut writes = WriteSet::default();
        writes.update_movement(stored.version, movement.clone());
        self.store.commit(writes)?;
        Ok(movement)
    }

    // ======================================================================
    // Wallet transactions
    // ======================================================================

    /// Creates a draft wallet transaction.
    pub fn create_wallet_transaction(
        &self,
        input: CreateWalletTransactionInput,
        now: DateTime<Utc>,
    ) -> Result<WalletTransactionId, EngineError> {
        self.organization_profile(input.organization_id)?;
        self.load_wallet(input.organization_id, input.wallet_id)?;
        if input.amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount.into());
        }

        let tx = input.into_draft(now);
        let id = tx.id;
        self.store.insert_wallet_transaction(tx)?;
        tracing::debug!(transaction = %id, "wallet transaction drafted");
        Ok(id)
    }

    /// Posts a draft wallet transaction, moving the wallet balance in one
    /// atomic commit.
    pub fn post_wallet_transaction(
        &self,
        organization_id: OrganizationId,
        transaction_id: WalletTransactionId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<WalletTransaction, EngineError> {
        let profile = self.organization_profile(organization_id)?;
        let stored_tx = self.load_wallet_transaction(organization_id, transaction_id)?;
        let mut tx = stored_tx.record.clone();

        PostingService::post_document(&mut tx, actor, now)?;

        let stored_wallet = self.load_wallet(organization_id, tx.wallet_id)?;
        let mut wallet = stored_wallet.record.clone();
        let applied = WalletService::apply_transaction(&mut wallet, &tx)?;
        applied.capture_on(&mut tx);

        let mut writes = WriteSet::default();
        if let Some(entry) = self.wallet_journal_entry(&profile, &tx, actor, now)? {
            writes.insert_journal_entry(entry);
        }
        writes.update_wallet_transaction(stored_tx.version, tx.clone());
        writes.update_wallet(stored_wallet.version, wallet);
        self.store.commit(writes)?;

        tracing::debug!(
            transaction = %tx.id,
            wallet = %tx.wallet_id,
            balance_after = %applied.balance_after,
            "wallet transaction posted"
        );
        Ok(tx)
    }

    /// Rejects a draft wallet transaction.
    pub fn reject_wallet_transaction(
        &self,
        organization_id: OrganizationId,
        transaction_id: WalletTransactionId,
        actor: UserId,
        now: DateTime<Utc>,
        reason: String,
    ) -> Result<WalletTransaction, EngineError> {
        let stored = self.load_wallet_transaction(organization_id, transaction_id)?;
        let mut tx = stored.record.clone();
        PostingService::reject_document(&mut tx, actor, now, reason)?;

        let mut writes = WriteSet::default();
        writes.update_wallet_transaction(stored.version, tx.clone());
        self.store.commit(writes)?;
        Ok(tx)
    }

    // ======================================================================
    // Receipts
    // ======================================================================

    /// Creates a draft receipt.
    pub fn create_receipt(
        &self,
        input: CreateReceiptInput,
        now: DateTime<Utc>,
    ) -> Result<ReceiptId, EngineError> {
        self.organization_profile(input.organization_id)?;
        self.load_wallet(input.organization_id, input.wallet_id)?;

        let receipt = input.into_draft(now);
        let id = receipt.id;
        self.store.insert_receipt(receipt)?;
        tracing::debug!(receipt = %id, "receipt drafted");
        Ok(id)
    }

    /// Posts a draft receipt: validates its totals, produces exactly one
    /// wallet transaction, applies it, and links it back, all in one
    /// atomic commit.
    pub fn post_receipt(
        &self,
        organization_id: OrganizationId,
        receipt_id: ReceiptId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Receipt, EngineError> {
        let profile = self.organization_profile(organization_id)?;
        let stored_receipt = self.load_receipt(organization_id, receipt_id)?;
        let mut receipt = stored_receipt.record.clone();

        PostingService::post_document(&mut receipt, actor, now)?;
        WalletService::validate_receipt(&receipt)?;

        let mut tx = WalletService::transaction_for_receipt(&receipt, actor, now);
        PostingService::post_document(&mut tx, actor, now)?;

        let stored_wallet = self.load_wallet(organization_id, receipt.wallet_id)?;
        let mut wallet = stored_wallet.record.clone();
        let applied = WalletService::apply_transaction(&mut wallet, &tx)?;
        applied.capture_on(&mut tx);

        receipt.wallet_transaction_id = Some(tx.id);

        let mut writes = WriteSet::default();
        if let Some(entry) = self.wallet_journal_entry(&profile, &tx, actor, now)? {
            writes.insert_journal_entry(entry);
        }
        writes.update_receipt(stored_receipt.version, receipt.clone());
        writes.insert_wallet_transaction(tx);
        writes.update_wallet(stored_wallet.version, wallet);
        self.store.commit(writes)?;

        tracing::debug!(receipt = %receipt.id, "receipt posted");
        Ok(receipt)
    }

    /// Rejects a draft receipt.
    pub fn reject_receipt(
        &self,
        organization_id: OrganizationId,
        receipt_id: ReceiptId,
        actor: UserId,
        now: DateTime<Utc>,
        reason: String,
    ) -> Result<Receipt, EngineError> {
        let stored = self.load_receipt(organization_id, receipt_id)?;
        let mut receipt = stored.record.clone();
        PostingService::reject_document(&mut receipt, actor, now, reason)?;

        let mut writes = WriteSet::default();
        writes.update_receipt(stored.version, receipt.clone());
        self.store.commit(writes)?;
        Ok(receipt)
    }

    // ======================================================================
    // Inventory audits
    // ======================================================================

    /// Creates a draft inventory audit.
    pub fn create_inventory_audit(
        &self,
        input: CreateAuditInput,
        now: DateTime<Utc>,
    ) -> Result<InventoryAuditId, EngineError> {
        self.organization_profile(input.organization_id)?;

        let audit = input.into_draft(now);
        let id = audit.id;
        self.store.insert_audit(audit)?;
        tracing::debug!(audit = %id, "inventory audit drafted");
        Ok(id)
    }

    /// Starts an audit, snapshotting every in-scope variant at one
    /// consistent instant.
    pub fn start_inventory_audit(
        &self,
        organization_id: OrganizationId,
        audit_id: InventoryAuditId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<InventoryAudit, EngineError> {
        let stored_audit = self.load_audit(organization_id, audit_id)?;
        let mut audit = stored_audit.record.clone();

        let snapshot = self.store.snapshot_variants(organization_id);
        let items = AuditService::start(&mut audit, &snapshot, actor, now)?;

        let mut writes = WriteSet::default();
        writes.update_audit(stored_audit.version, audit.clone());
        for item in items {
            writes.insert_audit_item(item);
        }
        self.store.commit(writes)?;

        tracing::debug!(
            audit = %audit.id,
            variants = audit.total_variants,
            "inventory audit started"
        );
        Ok(audit)
    }

    /// Records a physical count for one audit item.
    pub fn record_audit_count(
        &self,
        organization_id: OrganizationId,
        audit_id: InventoryAuditId,
        item_id: InventoryAuditItemId,
        counted_stock: i64,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<InventoryAuditItem, EngineError> {
        let stored_audit = self.load_audit(organization_id, audit_id)?;
        let stored_item = self.load_audit_item(organization_id, item_id)?;
        let mut audit = stored_audit.record.clone();
        let mut item = stored_item.record.clone();

        AuditService::record_count(&mut audit, &mut item, counted_stock, actor, now)?;

        let mut writes = WriteSet::default();
        writes.update_audit(stored_audit.version, audit);
        writes.update_audit_item(stored_item.version, item.clone());
        self.store.commit(writes)?;
        Ok(item)
    }

    /// Lists an audit's items.
    pub fn audit_items(
        &self,
        organization_id: OrganizationId,
        audit_id: InventoryAuditId,
    ) -> Result<Vec<InventoryAuditItem>, EngineError> {
        self.load_audit(organization_id, audit_id)?;
        Ok(self
            .store
            .items_for_audit(audit_id)
            .into_iter()
            .map(|row| row.record)
            .collect())
    }

    /// Completes an audit: posts one adjustment movement per counted
    /// variance (at the snapshot cost) and transitions the audit to
    /// Completed.
    ///
    /// Items whose adjustment already posted are skipped, so a completion
    /// interrupted by a conflict can be retried without double-posting.
    pub fn complete_inventory_audit(
        &self,
        organization_id: OrganizationId,
        audit_id: InventoryAuditId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<InventoryAudit, EngineError> {
        let profile = self.organization_profile(organization_id)?;
        let stored_audit = self.load_audit(organization_id, audit_id)?;
        let mut audit = stored_audit.record.clone();

        let stored_items = self.store.items_for_audit(audit_id);
        let item_records: Vec<InventoryAuditItem> = stored_items
            .iter()
            .map(|row| row.record.clone())
            .collect();
        AuditService::validate_complete(&audit, &item_records)?;

        for stored_item in &stored_items {
            let item = &stored_item.record;
            let Some(mut movement) = AuditService::adjustment_for_item(item, actor, now) else {
                continue;
            };
            PostingService::post_document(&mut movement, actor, now)?;

            self.with_retry(|| {
                let stored_variant = self.load_variant(organization_id, movement.variant_id)?;
                let mut variant = stored_variant.record.clone();

                let mut posted_movement = movement.clone();
                let applied =
                    StockService::apply_movement(&mut variant, &posted_movement, profile.cost_method)?;
                applied.capture_on(&mut posted_movement);

                let mut linked_item = item.clone();
                linked_item.adjustment_movement_id = Some(posted_movement.id);

                let mut writes = WriteSet::default();
                writes.insert_movement(posted_movement);
                writes.update_variant(stored_variant.version, variant);
                writes.update_audit_item(stored_item.version, linked_item);
                self.store.commit(writes)?;
                Ok(())
            })?;
        }

        AuditService::finish(&mut audit, actor, now);
        let mut writes = WriteSet::default();
        writes.update_audit(stored_audit.version, audit.clone());
        self.store.commit(writes)?;

        tracing::debug!(audit = %audit.id, "inventory audit completed");
        Ok(audit)
    }

    /// Cancels an audit from Draft or InProgress.
    pub fn cancel_inventory_audit(
        &self,
        organization_id: OrganizationId,
        audit_id: InventoryAuditId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<InventoryAudit, EngineError> {
        let stored = self.load_audit(organization_id, audit_id)?;
        let mut audit = stored.record.clone();
        AuditService::cancel(&mut audit, actor, now)?;

        let mut writes = WriteSet::default();
        writes.update_audit(stored.version, audit.clone());
        self.store.commit(writes)?;
        Ok(audit)
    }

    // ======================================================================
    // Journal entries
    // ======================================================================

    /// Creates a draft journal entry.
    pub fn create_journal_entry(
        &self,
        input: CreateJournalEntryInput,
        now: DateTime<Utc>,
    ) -> Result<JournalEntryId, EngineError> {
        self.organization_profile(input.organization_id)?;

        let entry = input.into_draft(now);
        let id = entry.id;
        self.store.insert_journal_entry(entry)?;
        tracing::debug!(entry = %id, "journal entry drafted");
        Ok(id)
    }

    /// Posts a draft journal entry after validating the double-entry
    /// invariant. All lines post or none do.
    pub fn post_journal_entry(
        &self,
        organization_id: OrganizationId,
        entry_id: JournalEntryId,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<JournalEntry, EngineError> {
        let stored = self.load_journal_entry(organization_id, entry_id)?;
        let mut entry = stored.record.clone();

        PostingService::post_document(&mut entry, actor, now)?;
        JournalService::validate_entry(&entry, self.account_lookup())?;

        let mut writes = WriteSet::default();
        writes.update_journal_entry(stored.version, entry.clone());
        self.store.commit(writes)?;

        tracing::debug!(entry = %entry.id, "journal entry posted");
        Ok(entry)
    }

    /// Lists an organization's journal entries, including mirrored ones.
    pub fn journal_entries(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<JournalEntry>, EngineError> {
        self.organization_profile(organization_id)?;
        Ok(self.store.journal_entries_for(organization_id))
    }

    /// Rejects a draft journal entry.
    pub fn reject_journal_entry(
        &self,
        organization_id: OrganizationId,
        entry_id: JournalEntryId,
        actor: UserId,
        now: DateTime<Utc>,
        reason: String,
    ) -> Result<JournalEntry, EngineError> {
        let stored = self.load_journal_entry(organization_id, entry_id)?;
        let mut entry = stored.record.clone();
        PostingService::reject_document(&mut entry, actor, now, reason)?;

        let mut writes = WriteSet::default();
        writes.update_journal_entry(stored.version, entry.clone());
        self.store.commit(writes)?;
        Ok(entry)
    }

    // ======================================================================
    // Retry support
    // ======================================================================

    /// Runs an operation, retrying on `ConcurrentModification` with the
    /// configured backoff. All other errors surface immediately.
    pub fn with_retry<T>(
        &self,
        mut operation: impl FnMut() -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut attempt = 0u32;
        loop {
            match operation() {
                Err(err) if err.is_retryable() && attempt < self.config.posting.max_retries => {
                    attempt += 1;
                    tracing::warn!(attempt, "optimistic conflict, retrying");
                    std::thread::sleep(std::time::Duration::from_millis(
                        self.config.posting.retry_backoff_ms * u64::from(attempt),
                    ));
                }
                outcome => return outcome,
            }
        }
    }

    // ======================================================================
    // Journal mirroring
    // ======================================================================

    fn account_lookup(&self) -> impl Fn(AccountId) -> Option<Account> + '_ {
        |id| self.store.get_account(id).map(|row| row.record)
    }

    /// Mirrors a costed purchase into the journal: inventory against the
    /// payables offset.
    fn purchase_journal_entry(
        &self,
        profile: &OrganizationProfile,
        movement: &StockMovement,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<JournalEntry>, EngineError> {
        let Some(accounts) = profile.journal_accounts else {
            return Ok(None);
        };
        if movement.movement_type != MovementType::Purchase {
            return Ok(None);
        }
        let Some(unit_cost) = movement.unit_cost else {
            return Ok(None);
        };
        let value = Decimal::from(movement.quantity) * unit_cost;
        if value <= Decimal::ZERO {
            return Ok(None);
        }

        let mut entry = CreateJournalEntryInput {
            organization_id: profile.id,
            entry_date: now.date_naive(),
            description: format!("Goods received at cost, movement {}", movement.id),
            reference: Some(movement.id.to_string()),
            lines: vec![
                JournalLineInput {
                    account_id: accounts.inventory_account_id,
                    debit: value,
                    credit: Decimal::ZERO,
                    memo: None,
                },
                JournalLineInput {
                    account_id: accounts.inventory_offset_account_id,
                    debit: Decimal::ZERO,
                    credit: value,
                    memo: None,
                },
            ],
            created_by: actor,
        }
        .into_draft(now);

        PostingService::post_document(&mut entry, actor, now)?;
        JournalService::validate_entry(&entry, self.account_lookup())?;
        Ok(Some(entry))
    }

    /// Mirrors a wallet movement into the journal: cash against the wallet
    /// liability.
    fn wallet_journal_entry(
        &self,
        profile: &OrganizationProfile,
        tx: &WalletTransaction,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<JournalEntry>, EngineError> {
        let Some(accounts) = profile.journal_accounts else {
            return Ok(None);
        };

        let (debit_account, credit_account) = match tx.transaction_type {
            WalletTransactionType::Deposit => {
                (accounts.cash_account_id, accounts.wallet_liability_account_id)
            }
            WalletTransactionType::Withdrawal => {
                (accounts.wallet_liability_account_id, accounts.cash_account_id)
            }
        };

        let mut entry = CreateJournalEntryInput {
            organization_id: profile.id,
            entry_date: now.date_naive(),
            description: format!("Wallet {} {}", tx.transaction_type, tx.id),
            reference: Some(tx.id.to_string()),
            lines: vec![
                JournalLineInput {
                    account_id: debit_account,
                    debit: tx.amount,
                    credit: Decimal::ZERO,
                    memo: None,
                },
                JournalLineInput {
                    account_id: credit_account,
                    debit: Decimal::ZERO,
                    credit: tx.amount,
                    memo: None,
                },
            ],
            created_by: actor,
        }
        .into_draft(now);

        PostingService::post_document(&mut entry, actor, now)?;
        JournalService::validate_entry(&entry, self.account_lookup())?;
        Ok(Some(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use merx_shared::types::{Currency, CustomerId, ProductId, UserId};
    use rust_decimal_macros::dec;

    use crate::journal::AccountType;
    use crate::stock::CostMethod;

    fn engine_with_org() -> (LedgerEngine, OrganizationId) {
        let engine = LedgerEngine::default();
        let profile = OrganizationProfile::new("Acme Retail", CostMethod::WeightedAverage);
        let org = profile.id;
        engine.register_organization(profile).unwrap();
        (engine, org)
    }

    #[test]
    fn test_register_variant_requires_organization() {
        let engine = LedgerEngine::default();
        let variant =
            ProductVariant::new(OrganizationId::new(), ProductId::new(), "SKU-1", None);
        let err = engine.register_variant(variant).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_cross_tenant_variant_read_blocked() {
        let (engine, org) = engine_with_org();
        let other_profile = OrganizationProfile::new("Rival", CostMethod::WeightedAverage);
        let rival = other_profile.id;
        engine.register_organization(other_profile).unwrap();

        let variant = ProductVariant::new(org, ProductId::new(), "SKU-1", None);
        let variant_id = variant.id;
        engine.register_variant(variant).unwrap();

        let err = engine.variant(rival, variant_id).unwrap_err();
        assert!(matches!(err, EngineError::Tenant(_)));
    }

    #[test]
    fn test_duplicate_account_code_rejected() {
        let (engine, org) = engine_with_org();
        engine
            .register_account(Account::new(org, "1000", "Cash", AccountType::Asset, None))
            .unwrap();

        let err = engine
            .register_account(Account::new(org, "1000", "Cash 2", AccountType::Asset, None))
            .unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_ACCOUNT_CODE");
    }

    #[test]
    fn test_create_and_post_movement() {
        let (engine, org) = engine_with_org();
        let variant = ProductVariant::new(org, ProductId::new(), "SKU-1", None);
        let variant_id = variant.id;
        engine.register_variant(variant).unwrap();

        let actor = UserId::new();
        let now = Utc::now();
        let movement_id = engine
            .create_stock_movement(
                CreateStockMovementInput {
                    organization_id: org,
                    variant_id,
                    movement_type: MovementType::Purchase,
                    quantity: 10,
                    unit_cost: Some(dec!(5.00)),
                    source_location_id: None,
                    destination_location_id: None,
                    reference: None,
                    created_by: actor,
                },
                now,
            )
            .unwrap();

        let posted = engine
            .post_stock_movement(org, movement_id, actor, now)
            .unwrap();
        assert_eq!(posted.stock_before, Some(0));
        assert_eq!(posted.stock_after, Some(10));
        assert!(posted.posting.is_posted);

        let variant = engine.variant(org, variant_id).unwrap();
        assert_eq!(variant.stock_quantity, 10);
        assert_eq!(variant.average_cost, dec!(5));
    }

    #[test]
    fn test_double_post_is_invalid_state() {
        let (engine, org) = engine_with_org();
        let variant = ProductVariant::new(org, ProductId::new(), "SKU-1", None);
        let variant_id = variant.id;
        engine.register_variant(variant).unwrap();

        let actor = UserId::new();
        let now = Utc::now();
        let movement_id = engine
            .create_stock_movement(
                CreateStockMovementInput {
                    organization_id: org,
                    variant_id,
                    movement_type: MovementType::Purchase,
                    quantity: 10,
                    unit_cost: Some(dec!(5.00)),
                    source_location_id: None,
                    destination_location_id: None,
                    reference: None,
                    created_by: actor,
                },
                now,
            )
            .unwrap();

        engine
            .post_stock_movement(org, movement_id, actor, now)
            .unwrap();
        let err = engine
            .post_stock_movement(org, movement_id, actor, now)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");

        // The movement applied exactly once.
        let variant = engine.variant(org, variant_id).unwrap();
        assert_eq!(variant.stock_quantity, 10);
    }

    #[test]
    fn test_reject_then_post_fails() {
        let (engine, org) = engine_with_org();
        let wallet = Wallet::new(org, CustomerId::new(), Currency::Usd);
        let wallet_id = wallet.id;
        engine.register_wallet(wallet).unwrap();

        let actor = UserId::new();
        let now = Utc::now();
        let tx_id = engine
            .create_wallet_transaction(
                CreateWalletTransactionInput {
                    organization_id: org,
                    wallet_id,
                    transaction_type: WalletTransactionType::Deposit,
                    amount: dec!(10.00),
                    currency: Currency::Usd,
                    sales_order_id: None,
                    note: None,
                    created_by: actor,
                },
                now,
            )
            .unwrap();

        engine
            .reject_wallet_transaction(org, tx_id, actor, now, "duplicate".to_string())
            .unwrap();
        let err = engine
            .post_wallet_transaction(org, tx_id, actor, now)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");

        let wallet = engine.wallet(org, wallet_id).unwrap();
        assert_eq!(wallet.balance, Decimal::ZERO);
    }
}
