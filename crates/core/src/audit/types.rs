//! Inventory audit domain types.

use chrono::{DateTime, Utc};
use merx_shared::types::{
    InventoryAuditId, InventoryAuditItemId, LocationId, OrganizationId, StockMovementId, UserId,
    VariantId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stock::ProductVariant;

/// Inventory audit status.
///
/// The valid transitions are:
/// - Draft → InProgress (start, takes the snapshot)
/// - InProgress → Completed (complete, posts adjustments)
/// - Draft | InProgress → Cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// Audit created, snapshot not yet taken.
    Draft,
    /// Snapshot taken, counts being recorded.
    InProgress,
    /// Variances reconciled into adjustment movements (terminal).
    Completed,
    /// Abandoned without ledger effect (terminal).
    Cancelled,
}

impl AuditStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the audit has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What part of the organization's stock an audit covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditScope {
    /// Every variant in the organization.
    Organization,
    /// Only variants held at one location.
    Location(LocationId),
}

impl AuditScope {
    /// Returns true if a variant falls inside this scope.
    #[must_use]
    pub fn includes(&self, variant: &ProductVariant) -> bool {
        match self {
            Self::Organization => true,
            Self::Location(location) => variant.location_id == Some(*location),
        }
    }
}

/// A physical inventory audit.
///
/// The aggregate counters are maintained incrementally as items are counted
/// and always equal the sums over the audit's items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryAudit {
    /// Unique identifier.
    pub id: InventoryAuditId,
    /// Organization this audit belongs to.
    pub organization_id: OrganizationId,
    /// What stock the audit covers.
    pub scope: AuditScope,
    /// Current status.
    pub status: AuditStatus,
    /// The consistent instant the theoretical stock was captured at.
    pub snapshot_taken_at: Option<DateTime<Utc>>,
    /// Number of variants in the snapshot.
    pub total_variants: i64,
    /// Number of variants counted so far.
    pub counted_variants: i64,
    /// Sum of item variances (units).
    pub total_variance: i64,
    /// Sum of item variance values at snapshot cost.
    pub total_variance_value: Decimal,
    /// The user who created the audit.
    pub created_by: UserId,
    /// When the audit was created.
    pub created_at: DateTime<Utc>,
    /// The user who started the audit.
    pub started_by: Option<UserId>,
    /// When the audit was started.
    pub started_at: Option<DateTime<Utc>>,
    /// The user who completed the audit.
    pub completed_by: Option<UserId>,
    /// When the audit was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// The user who cancelled the audit.
    pub cancelled_by: Option<UserId>,
    /// When the audit was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// One variant's line in an inventory audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryAuditItem {
    /// Unique identifier.
    pub id: InventoryAuditItemId,
    /// Organization this item belongs to.
    pub organization_id: OrganizationId,
    /// The audit this item belongs to.
    pub audit_id: InventoryAuditId,
    /// The variant being counted.
    pub variant_id: VariantId,
    /// System stock at snapshot time. Immutable.
    pub theoretical_stock: i64,
    /// Variant average cost at snapshot time. Immutable.
    pub snapshot_average_cost: Decimal,
    /// Physical count. Null until counted.
    pub counted_stock: Option<i64>,
    /// `counted_stock - theoretical_stock`.
    pub variance: Option<i64>,
    /// `variance * snapshot_average_cost`.
    pub variance_value: Option<Decimal>,
    /// The user who recorded the count.
    pub counted_by: Option<UserId>,
    /// When the count was recorded.
    pub counted_at: Option<DateTime<Utc>>,
    /// The adjustment movement posted for this item on completion.
    pub adjustment_movement_id: Option<StockMovementId>,
}

/// Input for creating a new draft inventory audit.
#[derive(Debug, Clone)]
pub struct CreateAuditInput {
    /// The organization the audit belongs to.
    pub organization_id: OrganizationId,
    /// What stock the audit covers.
    pub scope: AuditScope,
    /// The user creating the audit.
    pub created_by: UserId,
}

impl CreateAuditInput {
    /// Builds the draft audit document from this input.
    #[must_use]
    pub fn into_draft(self, now: DateTime<Utc>) -> InventoryAudit {
        InventoryAudit {
            id: InventoryAuditId::new(),
            organization_id: self.organization_id,
            scope: self.scope,
            status: AuditStatus::Draft,
            snapshot_taken_at: None,
            total_variants: 0,
            counted_variants: 0,
            total_variance: 0,
            total_variance_value: Decimal::ZERO,
            created_by: self.created_by,
            created_at: now,
            started_by: None,
            started_at: None,
            completed_by: None,
            completed_at: None,
            cancelled_by: None,
            cancelled_at: None,
        }
    }
}
