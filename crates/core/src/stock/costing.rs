//! Costing strategies for stock valuation.
//!
//! Organizations choose one of two independent strategies:
//!
//! - **Weighted average**: a running per-unit cost recomputed on every costed
//!   inbound receipt as a quantity-weighted blend of prior and incoming cost.
//!   Outbound movements never change the average.
//! - **FIFO batches**: every costed receipt opens a cost layer; outbound
//!   movements consume layers in arrival order and the cost of goods is the
//!   sum of what was consumed.

use chrono::{DateTime, Utc};
use merx_shared::types::StockBatchId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stock::error::StockError;
use crate::stock::types::StockBatch;

/// Costing strategy selected per organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMethod {
    /// Running weighted-average cost on the variant.
    #[default]
    WeightedAverage,
    /// FIFO cost batch ledger.
    FifoBatch,
}

impl CostMethod {
    /// Returns the string representation of the cost method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeightedAverage => "weighted_average",
            Self::FifoBatch => "fifo_batch",
        }
    }

    /// Parses a cost method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weighted_average" => Some(Self::WeightedAverage),
            "fifo_batch" => Some(Self::FifoBatch),
            _ => None,
        }
    }
}

impl fmt::Display for CostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recomputes the weighted-average cost for a costed inbound receipt.
///
/// `new_average = (before * old_average + quantity_in * unit_cost)
///               / (before + quantity_in)`
///
/// The result keeps full decimal precision; rounding happens only at the
/// reporting boundary. When `before + quantity_in` is zero the old average
/// is returned unchanged.
#[must_use]
pub fn weighted_average(
    stock_before: i64,
    old_average: Decimal,
    quantity_in: i64,
    unit_cost: Decimal,
) -> Decimal {
    let total_quantity = stock_before + quantity_in;
    if total_quantity == 0 {
        return old_average;
    }

    let prior_value = Decimal::from(stock_before) * old_average;
    let incoming_value = Decimal::from(quantity_in) * unit_cost;
    (prior_value + incoming_value) / Decimal::from(total_quantity)
}

/// A view over a variant's FIFO cost layers.
pub struct BatchLedger<'a> {
    batches: &'a mut Vec<StockBatch>,
}

impl<'a> BatchLedger<'a> {
    /// Wraps a variant's batch list.
    pub fn new(batches: &'a mut Vec<StockBatch>) -> Self {
        Self { batches }
    }

    /// Opens a new cost layer at the end of the ledger.
    pub fn receive(&mut self, quantity: i64, unit_cost: Decimal, received_at: DateTime<Utc>) {
        self.batches.push(StockBatch {
            id: StockBatchId::new(),
            remaining_quantity: quantity,
            unit_cost,
            received_at,
        });
    }

    /// Consumes `quantity` units in FIFO order and returns the cost of goods.
    ///
    /// Fully-consumed layers are removed from the ledger.
    ///
    /// # Errors
    ///
    /// Returns `StockError::BatchLedgerOutOfSync` if the layers hold fewer
    /// units than requested.
    pub fn consume(&mut self, quantity: i64) -> Result<Decimal, StockError> {
        let available = self.remaining_quantity();
        if available < quantity {
            return Err(StockError::BatchLedgerOutOfSync {
                batch_quantity: available,
                requested: quantity,
            });
        }

        let mut left = quantity;
        let mut cost_of_goods = Decimal::ZERO;
        for batch in self.batches.iter_mut() {
            if left == 0 {
                break;
            }
            let take = left.min(batch.remaining_quantity);
            cost_of_goods += Decimal::from(take) * batch.unit_cost;
            batch.remaining_quantity -= take;
            left -= take;
        }
        self.batches.retain(|b| b.remaining_quantity > 0);

        Ok(cost_of_goods)
    }

    /// Total units remaining across all layers.
    #[must_use]
    pub fn remaining_quantity(&self) -> i64 {
        self.batches.iter().map(|b| b.remaining_quantity).sum()
    }

    /// Total value remaining across all layers.
    #[must_use]
    pub fn remaining_value(&self) -> Decimal {
        self.batches
            .iter()
            .map(|b| Decimal::from(b.remaining_quantity) * b.unit_cost)
            .sum()
    }

    /// Per-unit cost of the remaining layers, zero when the ledger is empty.
    #[must_use]
    pub fn average_cost(&self) -> Decimal {
        let quantity = self.remaining_quantity();
        if quantity == 0 {
            return Decimal::ZERO;
        }
        self.remaining_value() / Decimal::from(quantity)
    }
}
