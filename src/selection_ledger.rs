//! # Selection Ledger Module
//!
//! The ledger is the authoritative, insertion-ordered list of ingredients
//! the user has picked for costing. Rows are created from catalog products,
//! mutated in place by quantity/unit edits and removed by stable id; the
//! same product may appear any number of times as independent rows.
//!
//! Every write path is infallible: malformed quantities coerce to zero and
//! removing an unknown row is a no-op. The calculator never rejects input.

use serde::Serialize;

use crate::measurement_units::{clamp_quantity, coerce_quantity, Unit};
use crate::product_catalog::Product;

/// Stable identifier for a selection row.
///
/// Ids are assigned monotonically per ledger and never reused, so a stale
/// id from an already-removed row can never address a different row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RowId(u64);

/// One selected ingredient: a catalog product plus the user's quantity entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionRow {
    /// Stable row identity within the ledger
    pub row_id: RowId,
    /// Catalog id of the product this row was created from
    pub product_id: String,
    /// Product display name
    pub name: String,
    /// Unit the product's price is quoted in
    pub base_unit: Unit,
    /// Price per one base unit
    pub price_per_unit: f64,
    /// Quantity as entered, denominated in `entry_unit`; never negative
    pub qty: f64,
    /// Unit the quantity is currently entered in
    pub entry_unit: Unit,
}

/// Insertion-ordered collection of selection rows.
#[derive(Debug, Clone, Default)]
pub struct SelectionLedger {
    rows: Vec<SelectionRow>,
    next_id: u64,
}

impl SelectionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new row for `product`, starting at quantity zero in the
    /// product's default entry unit. Returns the new row's id.
    pub fn add(&mut self, product: &Product) -> RowId {
        let row_id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(SelectionRow {
            row_id,
            product_id: product.id.clone(),
            name: product.name.clone(),
            base_unit: product.unit,
            price_per_unit: product.price_per_unit,
            qty: 0.0,
            entry_unit: product.unit.default_entry_unit(),
        });
        log::debug!("added row {:?} for product {}", row_id, product.id);
        row_id
    }

    /// Set a row's quantity from a numeric value.
    ///
    /// Negative and non-finite values are clamped to zero; an unknown row
    /// id is ignored.
    pub fn set_quantity(&mut self, row_id: RowId, qty: f64) {
        if let Some(row) = self.row_mut(row_id) {
            row.qty = clamp_quantity(qty);
        }
    }

    /// Set a row's quantity from raw text input.
    ///
    /// Non-numeric or empty input silently becomes zero; a parse problem is
    /// never propagated to the caller.
    pub fn set_quantity_input(&mut self, row_id: RowId, input: &str) {
        if let Some(row) = self.row_mut(row_id) {
            row.qty = coerce_quantity(input);
        }
    }

    /// Replace a row's entry unit.
    ///
    /// The stored quantity is reinterpreted in the new unit, never rescaled:
    /// "500" grams switched to kilograms stays "500".
    pub fn set_entry_unit(&mut self, row_id: RowId, unit: Unit) {
        if let Some(row) = self.row_mut(row_id) {
            row.entry_unit = unit;
        }
    }

    /// Remove a row. Removing an id that is not present is a no-op.
    pub fn remove(&mut self, row_id: RowId) {
        let before = self.rows.len();
        self.rows.retain(|row| row.row_id != row_id);
        if self.rows.len() == before {
            log::debug!("remove of absent row {:?} ignored", row_id);
        }
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[SelectionRow] {
        &self.rows
    }

    /// Look up a row by id.
    pub fn row(&self, row_id: RowId) -> Option<&SelectionRow> {
        self.rows.iter().find(|row| row.row_id == row_id)
    }

    /// Number of rows in the ledger.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the ledger holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row_mut(&mut self, row_id: RowId) -> Option<&mut SelectionRow> {
        self.rows.iter_mut().find(|row| row.row_id == row_id)
    }
}
