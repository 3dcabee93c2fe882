//! Currency and monetary rounding primitives.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary amounts in the engine are `rust_decimal::Decimal`.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places used for monetary amounts (balances, totals).
pub const MONEY_DP: u32 = 2;

/// Decimal places used for unit costs (finer grain than display money).
pub const COST_DP: u32 = 4;

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Indonesian Rupiah
    Idr,
    /// Euro
    Eur,
    /// Singapore Dollar
    Sgd,
    /// Japanese Yen
    Jpy,
}

/// Rounds a monetary amount to 2 decimal places using Banker's Rounding.
///
/// `MidpointNearestEven` keeps repeated rounding from drifting in one
/// direction: 2.345 → 2.34, 2.355 → 2.36.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a unit cost to 4 decimal places using Banker's Rounding.
///
/// Stored average costs keep full precision; this is the display/reporting
/// grain for per-unit costs.
#[must_use]
pub fn round_cost(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(COST_DP, RoundingStrategy::MidpointNearestEven)
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Idr => write!(f, "IDR"),
            Self::Eur => write!(f, "EUR"),
            Self::Sgd => write!(f, "SGD"),
            Self::Jpy => write!(f, "JPY"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "IDR" => Ok(Self::Idr),
            "EUR" => Ok(Self::Eur),
            "SGD" => Ok(Self::Sgd),
            "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
