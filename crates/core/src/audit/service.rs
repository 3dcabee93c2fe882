//! Inventory audit reconciliation service.
//!
//! Pure state-machine and arithmetic logic for audits. The engine supplies
//! the consistent variant snapshot and posts the adjustment movements this
//! service synthesizes.

use chrono::{DateTime, Utc};
use merx_shared::types::{InventoryAuditItemId, StockMovementId, UserId};
use rust_decimal::Decimal;

use crate::audit::error::AuditError;
use crate::audit::types::{AuditStatus, InventoryAudit, InventoryAuditItem};
use crate::posting::PostingState;
use crate::stock::{MovementType, ProductVariant, StockMovement};

/// Inventory audit reconciliation service.
pub struct AuditService;

impl AuditService {
    /// Starts a draft audit over a consistent variant snapshot.
    ///
    /// Builds one item per in-scope variant, capturing `theoretical_stock`
    /// and `snapshot_average_cost` as they were at the snapshot instant.
    /// Movements posted after this instant do not change the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::InvalidTransition` if the audit is not Draft.
    pub fn start(
        audit: &mut InventoryAudit,
        snapshot: &[ProductVariant],
        started_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<InventoryAuditItem>, AuditError> {
        if audit.status != AuditStatus::Draft {
            return Err(AuditError::InvalidTransition {
                from: audit.status,
                to: AuditStatus::InProgress,
            });
        }

        let items: Vec<InventoryAuditItem> = snapshot
            .iter()
            .filter(|variant| audit.scope.includes(variant))
            .map(|variant| InventoryAuditItem {
                id: InventoryAuditItemId::new(),
                organization_id: audit.organization_id,
                audit_id: audit.id,
                variant_id: variant.id,
                theoretical_stock: variant.stock_quantity,
                snapshot_average_cost: variant.average_cost,
                counted_stock: None,
                variance: None,
                variance_value: None,
                counted_by: None,
                counted_at: None,
                adjustment_movement_id: None,
            })
            .collect();

        audit.status = AuditStatus::InProgress;
        audit.snapshot_taken_at = Some(now);
        audit.total_variants = items.len() as i64;
        audit.started_by = Some(started_by);
        audit.started_at = Some(now);

        Ok(items)
    }

    /// Records a physical count for one item.
    ///
    /// Updates the item's variance fields and the audit's running counters.
    /// Recounting an item replaces its previous contribution instead of
    /// double-counting it.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` if the audit is not in progress, the item
    /// belongs to another audit, or the count is negative.
    pub fn record_count(
        audit: &mut InventoryAudit,
        item: &mut InventoryAuditItem,
        counted_stock: i64,
        counted_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), AuditError> {
        if audit.status != AuditStatus::InProgress {
            return Err(AuditError::NotInProgress {
                status: audit.status,
            });
        }
        if item.audit_id != audit.id {
            return Err(AuditError::ItemNotInAudit);
        }
        if counted_stock < 0 {
            return Err(AuditError::NegativeCount);
        }

        // Back out a previous count before applying the new one.
        if item.counted_stock.is_some() {
            audit.total_variance -= item.variance.unwrap_or(0);
            audit.total_variance_value -= item.variance_value.unwrap_or(Decimal::ZERO);
        } else {
            audit.counted_variants += 1;
        }

        let variance = counted_stock - item.theoretical_stock;
        let variance_value = Decimal::from(variance) * item.snapshot_average_cost;

        item.counted_stock = Some(counted_stock);
        item.variance = Some(variance);
        item.variance_value = Some(variance_value);
        item.counted_by = Some(counted_by);
        item.counted_at = Some(now);

        audit.total_variance += variance;
        audit.total_variance_value += variance_value;

        Ok(())
    }

    /// Verifies that an audit is ready to complete.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::IncompleteCount` if any item lacks a count, or
    /// `AuditError::InvalidTransition` if the audit is not in progress.
    pub fn validate_complete(
        audit: &InventoryAudit,
        items: &[InventoryAuditItem],
    ) -> Result<(), AuditError> {
        if audit.status != AuditStatus::InProgress {
            return Err(AuditError::InvalidTransition {
                from: audit.status,
                to: AuditStatus::Completed,
            });
        }

        let uncounted = items
            .iter()
            .filter(|item| item.counted_stock.is_none())
            .count();
        if uncounted > 0 {
            return Err(AuditError::IncompleteCount { uncounted });
        }
        Ok(())
    }

    /// Synthesizes the adjustment movement for one counted item.
    ///
    /// Returns `None` for zero-variance items and items that already have an
    /// adjustment (so an interrupted completion can resume without
    /// double-posting). The movement carries the **snapshot** cost, keeping
    /// cost attribution correct even if other postings happened mid-audit.
    #[must_use]
    pub fn adjustment_for_item(
        item: &InventoryAuditItem,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Option<StockMovement> {
        if item.adjustment_movement_id.is_some() {
            return None;
        }
        let variance = item.variance?;
        if variance == 0 {
            return None;
        }

        let movement_type = if variance > 0 {
            MovementType::AuditAdjustmentIn
        } else {
            MovementType::AuditAdjustmentOut
        };

        Some(StockMovement {
            id: StockMovementId::new(),
            organization_id: item.organization_id,
            variant_id: item.variant_id,
            movement_type,
            quantity: variance.abs(),
            unit_cost: Some(item.snapshot_average_cost),
            source_location_id: None,
            destination_location_id: None,
            stock_before: None,
            stock_after: None,
            cost_of_goods: None,
            reference: Some(format!("audit {}", item.audit_id)),
            created_by,
            created_at: now,
            posting: PostingState::draft(),
        })
    }

    /// Transitions a validated audit to Completed.
    pub fn finish(audit: &mut InventoryAudit, completed_by: UserId, now: DateTime<Utc>) {
        audit.status = AuditStatus::Completed;
        audit.completed_by = Some(completed_by);
        audit.completed_at = Some(now);
    }

    /// Cancels an audit from Draft or InProgress.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::InvalidTransition` from a terminal state.
    pub fn cancel(
        audit: &mut InventoryAudit,
        cancelled_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), AuditError> {
        if audit.status.is_terminal() {
            return Err(AuditError::InvalidTransition {
                from: audit.status,
                to: AuditStatus::Cancelled,
            });
        }
        audit.status = AuditStatus::Cancelled;
        audit.cancelled_by = Some(cancelled_by);
        audit.cancelled_at = Some(now);
        Ok(())
    }
}
