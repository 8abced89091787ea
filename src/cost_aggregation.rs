//! # Cost Aggregation Module
//!
//! Pure functions mapping a ledger snapshot to the pair of figures the
//! calculator displays: aggregate ingredient cost and a suggested sale
//! price. Flat-fee rows (`$` base unit) are passed through at cost; every
//! other row is marked up by a fixed multiplier.
//!
//! Aggregation is total by design: conversion fallbacks and quantity
//! coercion happen upstream, and nothing on this path can fail or panic.
//! Accumulation keeps full f64 precision; rounding is applied only by the
//! formatting helpers at presentation time.

use serde::Serialize;
use std::fmt;

use crate::measurement_units::{convert_to_base, Unit};
use crate::selection_ledger::SelectionRow;

/// Markup applied to non-flat-fee cost when suggesting a sale price.
/// Business policy constant, not user-configurable.
pub const MARKUP_MULTIPLIER: f64 = 3.0;

/// Aggregate figures derived from a ledger snapshot.
///
/// Recomputed from scratch on every mutation, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Sum of all row costs, flat and scaled alike
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    /// Total with the markup applied to the scaled portion only
    #[serde(rename = "suggestedPrice")]
    pub suggested_price: f64,
}

impl AggregateResult {
    /// The zero aggregate of an empty ledger.
    pub fn empty() -> Self {
        Self {
            total_cost: 0.0,
            suggested_price: 0.0,
        }
    }
}

impl Default for AggregateResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total {} / suggested {}",
            format_amount(self.total_cost),
            format_amount(self.suggested_price)
        )
    }
}

/// Compute the aggregate over a full ledger snapshot.
///
/// Each row contributes `convert_to_base(qty, entry, base) * price_per_unit`.
/// Rows are partitioned by base unit: flat-fee (`$`) cost is a pass-through,
/// everything else is marked up ×[`MARKUP_MULTIPLIER`] in the suggested
/// price.
pub fn aggregate(rows: &[SelectionRow]) -> AggregateResult {
    let mut flat_cost = 0.0;
    let mut scaled_cost = 0.0;

    for row in rows {
        let qty_in_base = convert_to_base(row.qty, row.entry_unit, row.base_unit);
        let row_cost = qty_in_base * row.price_per_unit;
        if row.base_unit == Unit::Flat {
            flat_cost += row_cost;
        } else {
            scaled_cost += row_cost;
        }
    }

    AggregateResult {
        total_cost: flat_cost + scaled_cost,
        suggested_price: flat_cost + MARKUP_MULTIPLIER * scaled_cost,
    }
}

/// Format a monetary amount for display, two decimal places.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "0.00".to_string();
    }
    format!("{:.2}", amount)
}

/// Format a per-unit price for display.
///
/// Uses six decimals when the magnitude drops below 0.01 so genuinely tiny
/// per-gram or per-milliliter prices don't render as "0.00".
pub fn format_unit_price(price: f64) -> String {
    if !price.is_finite() {
        return "0.00".to_string();
    }
    if price != 0.0 && price.abs() < 0.01 {
        format!("{:.6}", price)
    } else {
        format!("{:.2}", price)
    }
}
