//! Stock valuation service.
//!
//! `apply_movement` is the single routine that turns a stock movement into a
//! quantity and valuation effect on a variant. It is invoked only from
//! inside a posting commit; no other code path writes `stock_quantity` or
//! `average_cost`.

use rust_decimal::Decimal;

use crate::stock::costing::{weighted_average, BatchLedger, CostMethod};
use crate::stock::error::StockError;
use crate::stock::types::{MovementType, ProductVariant, StockDirection, StockMovement};

/// The ledger effect of applying one movement to one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedMovement {
    /// Stock on hand before the movement.
    pub stock_before: i64,
    /// Stock on hand after the movement.
    pub stock_after: i64,
    /// The variant's average cost after the movement.
    pub new_average_cost: Decimal,
    /// Total cost attributed to an outbound movement.
    pub cost_of_goods: Option<Decimal>,
}

impl AppliedMovement {
    /// Captures this effect onto the movement's immutable posting snapshot.
    pub fn capture_on(&self, movement: &mut StockMovement) {
        movement.stock_before = Some(self.stock_before);
        movement.stock_after = Some(self.stock_after);
        movement.cost_of_goods = self.cost_of_goods;
    }
}

/// Stock valuation service.
///
/// Pure business logic: the caller supplies the locked variant row and
/// persists both sides of the result in one transaction.
pub struct StockService;

impl StockService {
    /// Applies a movement to a variant under the organization's cost method.
    ///
    /// On success the variant's `stock_quantity`, `average_cost`, and (for
    /// FIFO organizations) batch ledger are updated in place. On error the
    /// variant is untouched.
    ///
    /// # Errors
    ///
    /// Returns `StockError` if the movement is structurally invalid or would
    /// drive stock negative.
    pub fn apply_movement(
        variant: &mut ProductVariant,
        movement: &StockMovement,
        cost_method: CostMethod,
    ) -> Result<AppliedMovement, StockError> {
        Self::validate(variant, movement)?;

        let stock_before = variant.stock_quantity;

        match movement.movement_type.direction() {
            StockDirection::Internal => Self::apply_transfer(variant, movement, stock_before),
            StockDirection::Inbound => {
                Self::apply_inbound(variant, movement, cost_method, stock_before)
            }
            StockDirection::Outbound => {
                Self::apply_outbound(variant, movement, cost_method, stock_before)
            }
        }
    }

    fn validate(variant: &ProductVariant, movement: &StockMovement) -> Result<(), StockError> {
        if movement.variant_id != variant.id {
            return Err(StockError::MovementVariantMismatch);
        }
        if movement.quantity <= 0 {
            return Err(StockError::InvalidQuantity);
        }
        if let Some(cost) = movement.unit_cost {
            if cost < Decimal::ZERO {
                return Err(StockError::NegativeUnitCost);
            }
        }
        if movement.movement_type == MovementType::Purchase && movement.unit_cost.is_none() {
            return Err(StockError::MissingUnitCost);
        }
        Ok(())
    }

    /// A transfer leaves and arrives in the same commit; the quantity stays
    /// on the one variant row, so the net delta is zero.
    fn apply_transfer(
        variant: &mut ProductVariant,
        movement: &StockMovement,
        stock_before: i64,
    ) -> Result<AppliedMovement, StockError> {
        let (Some(source), Some(destination)) =
            (movement.source_location_id, movement.destination_location_id)
        else {
            return Err(StockError::TransferLocationsRequired);
        };
        if source == destination {
            return Err(StockError::TransferSameLocation);
        }
        if movement.quantity > stock_before {
            return Err(StockError::InsufficientStock {
                available: stock_before,
                requested: movement.quantity,
            });
        }

        Ok(AppliedMovement {
            stock_before,
            stock_after: stock_before,
            new_average_cost: variant.average_cost,
            cost_of_goods: None,
        })
    }

    fn apply_inbound(
        variant: &mut ProductVariant,
        movement: &StockMovement,
        cost_method: CostMethod,
        stock_before: i64,
    ) -> Result<AppliedMovement, StockError> {
        let stock_after = stock_before + movement.quantity;

        match cost_method {
            CostMethod::WeightedAverage => {
                // Cost only moves with costed inbound receipts.
                if let Some(unit_cost) = movement.unit_cost {
                    variant.average_cost = weighted_average(
                        stock_before,
                        variant.average_cost,
                        movement.quantity,
                        unit_cost,
                    );
                }
            }
            CostMethod::FifoBatch => {
                let mut ledger = BatchLedger::new(&mut variant.batches);
                let layer_cost = movement.unit_cost.unwrap_or_else(|| ledger.average_cost());
                ledger.receive(movement.quantity, layer_cost, movement.created_at);
                variant.average_cost = ledger.average_cost();
            }
        }

        variant.stock_quantity = stock_after;
        Ok(AppliedMovement {
            stock_before,
            stock_after,
            new_average_cost: variant.average_cost,
            cost_of_goods: None,
        })
    }

    fn apply_outbound(
        variant: &mut ProductVariant,
        movement: &StockMovement,
        cost_method: CostMethod,
        stock_before: i64,
    ) -> Result<AppliedMovement, StockError> {
        let stock_after = stock_before - movement.quantity;
        if stock_after < 0 {
            return Err(StockError::InsufficientStock {
                available: stock_before,
                requested: movement.quantity,
            });
        }

        let cost_of_goods = match cost_method {
            // Outbound movements never change the weighted average; an
            // explicit unit cost (audit adjustments at snapshot cost) wins
            // over the live average for attribution.
            CostMethod::WeightedAverage => match movement.unit_cost {
                Some(unit_cost) => Decimal::from(movement.quantity) * unit_cost,
                None => Decimal::from(movement.quantity) * variant.average_cost,
            },
            CostMethod::FifoBatch => {
                let mut ledger = BatchLedger::new(&mut variant.batches);
                let consumed = ledger.consume(movement.quantity)?;
                let attributed = match movement.unit_cost {
                    Some(unit_cost) => Decimal::from(movement.quantity) * unit_cost,
                    None => consumed,
                };
                variant.average_cost = ledger.average_cost();
                attributed
            }
        };

        variant.stock_quantity = stock_after;
        Ok(AppliedMovement {
            stock_before,
            stock_after,
            new_average_cost: variant.average_cost,
            cost_of_goods: Some(cost_of_goods),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use merx_shared::types::{LocationId, OrganizationId, ProductId, StockMovementId, UserId};
    use rust_decimal_macros::dec;

    use crate::posting::PostingState;

    fn make_variant() -> ProductVariant {
        ProductVariant::new(OrganizationId::new(), ProductId::new(), "SKU-1", None)
    }

    fn make_movement(
        variant: &ProductVariant,
        movement_type: MovementType,
        quantity: i64,
        unit_cost: Option<Decimal>,
    ) -> StockMovement {
        StockMovement {
            id: StockMovementId::new(),
            organization_id: variant.organization_id,
            variant_id: variant.id,
            movement_type,
            quantity,
            unit_cost,
            source_location_id: None,
            destination_location_id: None,
            stock_before: None,
            stock_after: None,
            cost_of_goods: None,
            reference: None,
            created_by: UserId::new(),
            created_at: Utc::now(),
            posting: PostingState::draft(),
        }
    }

    #[test]
    fn test_costing_scenario_from_empty() {
        let mut variant = make_variant();

        // 10 units at 5.00 into empty stock.
        let purchase = make_movement(&variant, MovementType::Purchase, 10, Some(dec!(5.00)));
        let applied =
            StockService::apply_movement(&mut variant, &purchase, CostMethod::WeightedAverage)
                .unwrap();
        assert_eq!(applied.stock_after, 10);
        assert_eq!(variant.average_cost, dec!(5));

        // 10 more at 7.00 blends to 6.00.
        let purchase = make_movement(&variant, MovementType::Purchase, 10, Some(dec!(7.00)));
        StockService::apply_movement(&mut variant, &purchase, CostMethod::WeightedAverage).unwrap();
        assert_eq!(variant.stock_quantity, 20);
        assert_eq!(variant.average_cost, dec!(6));

        // Selling 5 leaves the average untouched.
        let sale = make_movement(&variant, MovementType::Sale, 5, None);
        let applied =
            StockService::apply_movement(&mut variant, &sale, CostMethod::WeightedAverage).unwrap();
        assert_eq!(applied.stock_after, 15);
        assert_eq!(applied.cost_of_goods, Some(dec!(30)));
        assert_eq!(variant.average_cost, dec!(6));
    }

    #[test]
    fn test_outbound_insufficient_stock_leaves_variant_untouched() {
        let mut variant = make_variant();
        let purchase = make_movement(&variant, MovementType::Purchase, 3, Some(dec!(2.00)));
        StockService::apply_movement(&mut variant, &purchase, CostMethod::WeightedAverage).unwrap();

        let sale = make_movement(&variant, MovementType::Sale, 5, None);
        let err = StockService::apply_movement(&mut variant, &sale, CostMethod::WeightedAverage)
            .unwrap_err();

        assert!(matches!(
            err,
            StockError::InsufficientStock {
                available: 3,
                requested: 5,
            }
        ));
        assert_eq!(variant.stock_quantity, 3);
        assert_eq!(variant.average_cost, dec!(2));
    }

    #[test]
    fn test_purchase_requires_unit_cost() {
        let mut variant = make_variant();
        let purchase = make_movement(&variant, MovementType::Purchase, 3, None);
        let err = StockService::apply_movement(&mut variant, &purchase, CostMethod::WeightedAverage)
            .unwrap_err();
        assert!(matches!(err, StockError::MissingUnitCost));
    }

    #[test]
    fn test_uncosted_inbound_keeps_average() {
        let mut variant = make_variant();
        let purchase = make_movement(&variant, MovementType::Purchase, 10, Some(dec!(4.00)));
        StockService::apply_movement(&mut variant, &purchase, CostMethod::WeightedAverage).unwrap();

        let back = make_movement(&variant, MovementType::SalesReturn, 2, None);
        StockService::apply_movement(&mut variant, &back, CostMethod::WeightedAverage).unwrap();

        assert_eq!(variant.stock_quantity, 12);
        assert_eq!(variant.average_cost, dec!(4));
    }

    #[test]
    fn test_negative_unit_cost_rejected() {
        let mut variant = make_variant();
        let purchase = make_movement(&variant, MovementType::Purchase, 3, Some(dec!(-1.00)));
        let err = StockService::apply_movement(&mut variant, &purchase, CostMethod::WeightedAverage)
            .unwrap_err();
        assert!(matches!(err, StockError::NegativeUnitCost));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut variant = make_variant();
        let sale = make_movement(&variant, MovementType::Sale, 0, None);
        let err = StockService::apply_movement(&mut variant, &sale, CostMethod::WeightedAverage)
            .unwrap_err();
        assert!(matches!(err, StockError::InvalidQuantity));
    }

    #[test]
    fn test_movement_for_other_variant_rejected() {
        let mut variant = make_variant();
        let other = make_variant();
        let movement = make_movement(&other, MovementType::Sale, 1, None);
        let err = StockService::apply_movement(&mut variant, &movement, CostMethod::WeightedAverage)
            .unwrap_err();
        assert!(matches!(err, StockError::MovementVariantMismatch));
    }

    #[test]
    fn test_transfer_net_zero_with_sufficient_stock() {
        let mut variant = make_variant();
        let purchase = make_movement(&variant, MovementType::Purchase, 10, Some(dec!(5.00)));
        StockService::apply_movement(&mut variant, &purchase, CostMethod::WeightedAverage).unwrap();

        let mut transfer = make_movement(&variant, MovementType::Transfer, 4, None);
        transfer.source_location_id = Some(LocationId::new());
        transfer.destination_location_id = Some(LocationId::new());

        let applied =
            StockService::apply_movement(&mut variant, &transfer, CostMethod::WeightedAverage)
                .unwrap();
        assert_eq!(applied.stock_before, 10);
        assert_eq!(applied.stock_after, 10);
        assert_eq!(variant.stock_quantity, 10);
        assert_eq!(variant.average_cost, dec!(5));
    }

    #[test]
    fn test_transfer_requires_both_locations() {
        let mut variant = make_variant();
        variant.stock_quantity = 10;

        let mut transfer = make_movement(&variant, MovementType::Transfer, 4, None);
        transfer.source_location_id = Some(LocationId::new());

        let err = StockService::apply_movement(&mut variant, &transfer, CostMethod::WeightedAverage)
            .unwrap_err();
        assert!(matches!(err, StockError::TransferLocationsRequired));
    }

    #[test]
    fn test_transfer_same_location_rejected() {
        let mut variant = make_variant();
        variant.stock_quantity = 10;

        let location = LocationId::new();
        let mut transfer = make_movement(&variant, MovementType::Transfer, 4, None);
        transfer.source_location_id = Some(location);
        transfer.destination_location_id = Some(location);

        let err = StockService::apply_movement(&mut variant, &transfer, CostMethod::WeightedAverage)
            .unwrap_err();
        assert!(matches!(err, StockError::TransferSameLocation));
    }

    #[test]
    fn test_transfer_more_than_on_hand_rejected() {
        let mut variant = make_variant();
        variant.stock_quantity = 3;

        let mut transfer = make_movement(&variant, MovementType::Transfer, 4, None);
        transfer.source_location_id = Some(LocationId::new());
        transfer.destination_location_id = Some(LocationId::new());

        let err = StockService::apply_movement(&mut variant, &transfer, CostMethod::WeightedAverage)
            .unwrap_err();
        assert!(matches!(err, StockError::InsufficientStock { .. }));
    }

    #[test]
    fn test_fifo_consumes_layers_in_order() {
        let mut variant = make_variant();

        let first = make_movement(&variant, MovementType::Purchase, 10, Some(dec!(5.00)));
        StockService::apply_movement(&mut variant, &first, CostMethod::FifoBatch).unwrap();
        let second = make_movement(&variant, MovementType::Purchase, 10, Some(dec!(7.00)));
        StockService::apply_movement(&mut variant, &second, CostMethod::FifoBatch).unwrap();

        // Derived average across the two layers.
        assert_eq!(variant.average_cost, dec!(6));

        let sale = make_movement(&variant, MovementType::Sale, 12, None);
        let applied =
            StockService::apply_movement(&mut variant, &sale, CostMethod::FifoBatch).unwrap();

        // 10 @ 5.00 + 2 @ 7.00
        assert_eq!(applied.cost_of_goods, Some(dec!(64.00)));
        assert_eq!(variant.stock_quantity, 8);
        // Only the 7.00 layer remains.
        assert_eq!(variant.average_cost, dec!(7));
    }

    #[test]
    fn test_audit_adjustment_out_at_snapshot_cost() {
        let mut variant = make_variant();
        let purchase = make_movement(&variant, MovementType::Purchase, 20, Some(dec!(6.00)));
        StockService::apply_movement(&mut variant, &purchase, CostMethod::WeightedAverage).unwrap();

        // The audit adjustment carries the snapshot cost, not the live one.
        let adjustment = make_movement(
            &variant,
            MovementType::AuditAdjustmentOut,
            3,
            Some(dec!(5.50)),
        );
        let applied =
            StockService::apply_movement(&mut variant, &adjustment, CostMethod::WeightedAverage)
                .unwrap();

        assert_eq!(applied.stock_after, 17);
        assert_eq!(applied.cost_of_goods, Some(dec!(16.50)));
        assert_eq!(variant.average_cost, dec!(6));
    }

    #[test]
    fn test_capture_on_movement() {
        let mut variant = make_variant();
        let mut purchase = make_movement(&variant, MovementType::Purchase, 10, Some(dec!(5.00)));
        let applied =
            StockService::apply_movement(&mut variant, &purchase, CostMethod::WeightedAverage)
                .unwrap();

        applied.capture_on(&mut purchase);
        assert_eq!(purchase.stock_before, Some(0));
        assert_eq!(purchase.stock_after, Some(10));
    }
}
