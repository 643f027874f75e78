//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done in `Decimal` and converted to `f64` only at the
//! storage/serialization boundary, rounded to 2 decimal places half-up.

use rust_decimal::prelude::*;

pub mod reconcile;
pub mod totals;

pub use reconcile::{Reconciliation, reconcile};
pub use totals::{DocumentTotals, recalculate_totals};

/// Monetary values round to 2 decimal places
pub const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
///
/// Inputs are range-checked by request validation. If NaN/Infinity somehow
/// reaches here, logs an error and returns ZERO rather than corrupting a
/// financial figure.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        // SAFETY: a Decimal rounded to 2dp is always within f64 range
        .expect("Decimal rounded to 2dp is always representable as f64")
}

#[cfg(test)]
mod tests;
