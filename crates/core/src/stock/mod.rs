//! Stock quantity and unit-cost valuation.
//!
//! This module applies posted stock movements to a product variant's
//! quantity and cost. Two costing strategies coexist, selected per
//! organization: a running weighted-average cost recomputed on every costed
//! inbound receipt, and a FIFO batch ledger that consumes cost layers in
//! arrival order.

pub mod costing;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod costing_props;
#[cfg(test)]
mod service_props;

pub use costing::{BatchLedger, CostMethod};
pub use error::StockError;
pub use service::{AppliedMovement, StockService};
pub use types::{
    CreateStockMovementInput, MovementType, ProductVariant, StockBatch, StockDirection,
    StockMovement,
};
