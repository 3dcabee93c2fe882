//! Stock domain types: variants, movements, and cost batches.

use chrono::{DateTime, Utc};
use merx_shared::types::{
    round_cost, LocationId, OrganizationId, ProductId, StockBatchId, StockMovementId, UserId,
    VariantId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::posting::{Postable, PostingState};

/// Direction of a stock movement's effect on quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    /// Quantity increases.
    Inbound,
    /// Quantity decreases.
    Outbound,
    /// Quantity moves between locations; net effect on the variant is zero.
    Internal,
}

/// Stock movement type classification.
///
/// The direction of the quantity effect is implied by the type; `quantity`
/// on the movement itself is always a positive magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods received from a supplier. Carries a unit cost.
    Purchase,
    /// Goods returned by a customer.
    SalesReturn,
    /// Goods delivered to a customer.
    Sale,
    /// Manual correction increasing stock.
    AdjustmentIn,
    /// Manual correction decreasing stock.
    AdjustmentOut,
    /// Stock moved between two locations.
    Transfer,
    /// Inventory-audit reconciliation increasing stock.
    AuditAdjustmentIn,
    /// Inventory-audit reconciliation decreasing stock.
    AuditAdjustmentOut,
}

impl MovementType {
    /// Returns the direction of this movement type's quantity effect.
    #[must_use]
    pub fn direction(self) -> StockDirection {
        match self {
            Self::Purchase | Self::SalesReturn | Self::AdjustmentIn | Self::AuditAdjustmentIn => {
                StockDirection::Inbound
            }
            Self::Sale | Self::AdjustmentOut | Self::AuditAdjustmentOut => StockDirection::Outbound,
            Self::Transfer => StockDirection::Internal,
        }
    }

    /// Returns the string representation of the movement type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::SalesReturn => "sales_return",
            Self::Sale => "sale",
            Self::AdjustmentIn => "adjustment_in",
            Self::AdjustmentOut => "adjustment_out",
            Self::Transfer => "transfer",
            Self::AuditAdjustmentIn => "audit_adjustment_in",
            Self::AuditAdjustmentOut => "audit_adjustment_out",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A FIFO cost layer: goods received together at one unit cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBatch {
    /// Unique identifier for this batch.
    pub id: StockBatchId,
    /// Units remaining from this batch.
    pub remaining_quantity: i64,
    /// Cost per unit at which this batch was received.
    pub unit_cost: Decimal,
    /// When the batch was received.
    pub received_at: DateTime<Utc>,
}

/// A sellable product variant with its stock position.
///
/// `stock_quantity` and `average_cost` are mutated only by posted stock
/// movements; no other code path writes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Unique identifier.
    pub id: VariantId,
    /// Organization this variant belongs to.
    pub organization_id: OrganizationId,
    /// The product this variant belongs to.
    pub product_id: ProductId,
    /// Stock-keeping unit code.
    pub sku: String,
    /// Location holding this variant's stock, if location-scoped.
    pub location_id: Option<LocationId>,
    /// Units on hand. Never negative.
    pub stock_quantity: i64,
    /// Weighted-average cost per unit, stored at full precision.
    pub average_cost: Decimal,
    /// FIFO cost layers. Empty for weighted-average organizations.
    #[serde(default)]
    pub batches: Vec<StockBatch>,
}

impl ProductVariant {
    /// Creates a new variant with empty stock.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        product_id: ProductId,
        sku: impl Into<String>,
        location_id: Option<LocationId>,
    ) -> Self {
        Self {
            id: VariantId::new(),
            organization_id,
            product_id,
            sku: sku.into(),
            location_id,
            stock_quantity: 0,
            average_cost: Decimal::ZERO,
            batches: Vec::new(),
        }
    }

    /// Returns the average cost rounded to the reporting grain (4 dp).
    #[must_use]
    pub fn rounded_average_cost(&self) -> Decimal {
        round_cost(self.average_cost)
    }
}

/// A stock movement document.
///
/// Created as Draft; posting captures the before/after quantities and the
/// valuation effect, then freezes the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    /// Unique identifier.
    pub id: StockMovementId,
    /// Organization this movement belongs to.
    pub organization_id: OrganizationId,
    /// The variant this movement affects.
    pub variant_id: VariantId,
    /// The movement type; implies the quantity direction.
    pub movement_type: MovementType,
    /// Positive magnitude of the quantity effect.
    pub quantity: i64,
    /// Cost per unit for costed inbound movements.
    pub unit_cost: Option<Decimal>,
    /// Source location for transfers and outbound movements.
    pub source_location_id: Option<LocationId>,
    /// Destination location for transfers and inbound movements.
    pub destination_location_id: Option<LocationId>,
    /// Stock on hand immediately before posting. Captured at posting time.
    pub stock_before: Option<i64>,
    /// Stock on hand immediately after posting. Captured at posting time.
    pub stock_after: Option<i64>,
    /// Total cost attributed to an outbound movement at posting time.
    pub cost_of_goods: Option<Decimal>,
    /// External reference (order number, audit, ...).
    pub reference: Option<String>,
    /// The user who created the movement.
    pub created_by: UserId,
    /// When the movement was created.
    pub created_at: DateTime<Utc>,
    /// Posting lifecycle fields.
    pub posting: PostingState,
}

impl StockMovement {
    /// Returns the signed quantity delta this movement applies when posted.
    ///
    /// Transfers keep the quantity on the same variant row, so their net
    /// delta is zero.
    #[must_use]
    pub fn signed_delta(&self) -> i64 {
        match self.movement_type.direction() {
            StockDirection::Inbound => self.quantity,
            StockDirection::Outbound => -self.quantity,
            StockDirection::Internal => 0,
        }
    }
}

impl Postable for StockMovement {
    fn posting(&self) -> &PostingState {
        &self.posting
    }

    fn posting_mut(&mut self) -> &mut PostingState {
        &mut self.posting
    }
}

/// Input for creating a new draft stock movement.
#[derive(Debug, Clone)]
pub struct CreateStockMovementInput {
    /// The organization the movement belongs to.
    pub organization_id: OrganizationId,
    /// The variant the movement affects.
    pub variant_id: VariantId,
    /// The movement type.
    pub movement_type: MovementType,
    /// Positive magnitude of the quantity effect.
    pub quantity: i64,
    /// Cost per unit for costed inbound movements.
    pub unit_cost: Option<Decimal>,
    /// Source location.
    pub source_location_id: Option<LocationId>,
    /// Destination location.
    pub destination_location_id: Option<LocationId>,
    /// External reference.
    pub reference: Option<String>,
    /// The user creating the movement.
    pub created_by: UserId,
}

impl CreateStockMovementInput {
    /// Builds the draft movement document from this input.
    #[must_use]
    pub fn into_draft(self, now: DateTime<Utc>) -> StockMovement {
        StockMovement {
            id: StockMovementId::new(),
            organization_id: self.organization_id,
            variant_id: self.variant_id,
            movement_type: self.movement_type,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            source_location_id: self.source_location_id,
            destination_location_id: self.destination_location_id,
            stock_before: None,
            stock_after: None,
            cost_of_goods: None,
            reference: self.reference,
            created_by: self.created_by,
            created_at: now,
            posting: PostingState::draft(),
        }
    }
}
