//! Property-based tests for the stock valuation service.
//!
//! - Stock equals the sum of applied signed deltas and never goes negative
//! - Outbound movements never move the weighted average
//! - Failed movements leave the variant untouched

use chrono::Utc;
use merx_shared::types::{OrganizationId, ProductId, StockMovementId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::posting::PostingState;
use crate::stock::costing::CostMethod;
use crate::stock::service::StockService;
use crate::stock::types::{MovementType, ProductVariant, StockMovement};

/// A generated movement request: quantity plus optional cost.
#[derive(Debug, Clone)]
struct MovementCase {
    movement_type: MovementType,
    quantity: i64,
    unit_cost: Option<Decimal>,
}

fn cost_cents() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn movement_case() -> impl Strategy<Value = MovementCase> {
    (1i64..50i64, cost_cents(), 0u8..4u8).prop_map(|(quantity, cost, kind)| match kind {
        0 => MovementCase {
            movement_type: MovementType::Purchase,
            quantity,
            unit_cost: Some(cost),
        },
        1 => MovementCase {
            movement_type: MovementType::Sale,
            quantity,
            unit_cost: None,
        },
        2 => MovementCase {
            movement_type: MovementType::AdjustmentIn,
            quantity,
            unit_cost: Some(cost),
        },
        _ => MovementCase {
            movement_type: MovementType::AdjustmentOut,
            quantity,
            unit_cost: None,
        },
    })
}

fn build_movement(variant: &ProductVariant, case: &MovementCase) -> StockMovement {
    StockMovement {
        id: StockMovementId::new(),
        organization_id: variant.organization_id,
        variant_id: variant.id,
        movement_type: case.movement_type,
        quantity: case.quantity,
        unit_cost: case.unit_cost,
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

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Applying any sequence of movements keeps the stock equal to the sum
    /// of the deltas that were actually applied, and never negative.
    #[test]
    fn prop_stock_is_sum_of_applied_deltas(
        cases in prop::collection::vec(movement_case(), 1..30),
        method in prop_oneof![Just(CostMethod::WeightedAverage), Just(CostMethod::FifoBatch)],
    ) {
        let mut variant = ProductVariant::new(
            OrganizationId::new(),
            ProductId::new(),
            "SKU-P",
            None,
        );

        let mut applied_sum = 0i64;
        for case in &cases {
            let movement = build_movement(&variant, case);
            if let Ok(applied) = StockService::apply_movement(&mut variant, &movement, method) {
                applied_sum += movement.signed_delta();
                prop_assert_eq!(applied.stock_after, applied_sum);
            }
            prop_assert!(variant.stock_quantity >= 0, "stock went negative");
            prop_assert_eq!(variant.stock_quantity, applied_sum);
        }
    }

    /// Outbound movements never change the weighted average.
    #[test]
    fn prop_outbound_keeps_weighted_average(
        inbound_quantity in 10i64..500i64,
        cost in cost_cents(),
        outbound_quantity in 1i64..10i64,
    ) {
        let mut variant = ProductVariant::new(
            OrganizationId::new(),
            ProductId::new(),
            "SKU-P",
            None,
        );

        let receive = build_movement(&variant, &MovementCase {
            movement_type: MovementType::Purchase,
            quantity: inbound_quantity,
            unit_cost: Some(cost),
        });
        StockService::apply_movement(&mut variant, &receive, CostMethod::WeightedAverage).unwrap();
        let average_before = variant.average_cost;

        let sale = build_movement(&variant, &MovementCase {
            movement_type: MovementType::Sale,
            quantity: outbound_quantity,
            unit_cost: None,
        });
        StockService::apply_movement(&mut variant, &sale, CostMethod::WeightedAverage).unwrap();

        prop_assert_eq!(variant.average_cost, average_before);
    }

    /// A rejected movement leaves quantity, average, and batches untouched.
    #[test]
    fn prop_failed_movement_is_side_effect_free(
        inbound_quantity in 1i64..10i64,
        cost in cost_cents(),
        excess in 1i64..100i64,
        method in prop_oneof![Just(CostMethod::WeightedAverage), Just(CostMethod::FifoBatch)],
    ) {
        let mut variant = ProductVariant::new(
            OrganizationId::new(),
            ProductId::new(),
            "SKU-P",
            None,
        );

        let receive = build_movement(&variant, &MovementCase {
            movement_type: MovementType::Purchase,
            quantity: inbound_quantity,
            unit_cost: Some(cost),
        });
        StockService::apply_movement(&mut variant, &receive, method).unwrap();
        let snapshot = variant.clone();

        let sale = build_movement(&variant, &MovementCase {
            movement_type: MovementType::Sale,
            quantity: inbound_quantity + excess,
            unit_cost: None,
        });
        let result = StockService::apply_movement(&mut variant, &sale, method);

        prop_assert!(result.is_err());
        prop_assert_eq!(variant.stock_quantity, snapshot.stock_quantity);
        prop_assert_eq!(variant.average_cost, snapshot.average_cost);
        prop_assert_eq!(variant.batches.len(), snapshot.batches.len());
    }
}
