//! # CandyCost Engine
//!
//! Ingredient selection and cost aggregation engine for a candy-making cost
//! calculator. Users pick ingredients from a priced catalog, enter
//! quantities in whatever unit they think in, and see a live aggregate cost
//! plus a suggested sale price.

pub mod cost_aggregation;
pub mod localization;
pub mod measurement_units;
pub mod product_catalog;
pub mod selection_ledger;
pub mod session;
pub mod suggestion_mode;
