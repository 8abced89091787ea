//! # Measurement Units Module
//!
//! This module defines the catalog units a product can be priced in and the
//! conversion rules that let quantities entered in one unit be charged in
//! another. Weight and volume each have a coarse/fine sibling pair (kg/g,
//! l/ml); counted goods, labor hours and flat-fee items carry no scale at all.
//!
//! ## Core Concepts
//!
//! - **Base unit**: the unit a product's price is quoted in
//! - **Entry unit**: the unit the user is currently typing a quantity in
//! - **Flat-fee item**: a product priced in `$`, exempt from conversion and markup

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

/// Units a catalog product can be priced or entered in.
///
/// Serialized with the exact wire strings the catalog uses
/// (`"kg"`, `"g"`, `"l"`, `"ml"`, `"unidad"`, `"h"`, `"$"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Kilograms
    #[serde(rename = "kg")]
    Kilogram,
    /// Grams
    #[serde(rename = "g")]
    Gram,
    /// Liters
    #[serde(rename = "l")]
    Liter,
    /// Milliliters
    #[serde(rename = "ml")]
    Milliliter,
    /// Individual pieces ("unidad" in the catalog)
    #[serde(rename = "unidad")]
    Piece,
    /// Labor hours
    #[serde(rename = "h")]
    Hour,
    /// Flat fee in currency, no unit semantics
    #[serde(rename = "$")]
    Flat,
}

/// All units, in the order the entry-unit selector presents them.
pub const ALL_UNITS: [Unit; 7] = [
    Unit::Gram,
    Unit::Kilogram,
    Unit::Milliliter,
    Unit::Liter,
    Unit::Piece,
    Unit::Hour,
    Unit::Flat,
];

impl Unit {
    /// Wire/display label for the unit.
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Liter => "l",
            Unit::Milliliter => "ml",
            Unit::Piece => "unidad",
            Unit::Hour => "h",
            Unit::Flat => "$",
        }
    }

    /// The unit a fresh selection row starts entering quantities in.
    ///
    /// Coarse units default to their finer sibling (`kg→g`, `l→ml`) because
    /// users overwhelmingly type grams/milliliters; everything else enters
    /// in the base unit itself.
    pub fn default_entry_unit(&self) -> Unit {
        match self {
            Unit::Kilogram => Unit::Gram,
            Unit::Liter => Unit::Milliliter,
            other => *other,
        }
    }

    /// Check if this is a weight unit
    pub fn is_weight(&self) -> bool {
        matches!(self, Unit::Kilogram | Unit::Gram)
    }

    /// Check if this is a volume unit
    pub fn is_volume(&self) -> bool {
        matches!(self, Unit::Liter | Unit::Milliliter)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kg" => Ok(Unit::Kilogram),
            "g" => Ok(Unit::Gram),
            "l" => Ok(Unit::Liter),
            "ml" => Ok(Unit::Milliliter),
            "unidad" => Ok(Unit::Piece),
            "h" => Ok(Unit::Hour),
            "$" => Ok(Unit::Flat),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}

/// Error for a unit label not present in the catalog's unit set
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownUnit(pub String);

impl fmt::Display for UnknownUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown unit: {}", self.0)
    }
}

impl std::error::Error for UnknownUnit {}

/// Convert a quantity entered in `entry` into the product's `base` unit.
///
/// The conversion table is deliberately total: any pairing outside it
/// contributes `0.0` instead of failing, so a misconfigured catalog entry
/// can never break the calculator. The fallback is logged at `warn` level
/// to keep such entries observable.
///
/// - identical units are the identity
/// - `g → kg` and `ml → l` divide by 1000
/// - piece-priced products treat any entry unit as a count
/// - flat-fee products ignore unit semantics entirely
pub fn convert_to_base(qty: f64, entry: Unit, base: Unit) -> f64 {
    if entry == base {
        return qty;
    }
    match base {
        Unit::Kilogram if entry == Unit::Gram => qty / 1000.0,
        Unit::Liter if entry == Unit::Milliliter => qty / 1000.0,
        Unit::Piece => qty,
        Unit::Flat => qty,
        _ => {
            log::warn!(
                "unsupported unit pairing {} -> {}, quantity contributes nothing",
                entry,
                base
            );
            0.0
        }
    }
}

lazy_static! {
    /// Leading numeric prefix of a quantity field, dot or comma decimals.
    static ref QUANTITY_PREFIX: Regex =
        Regex::new(r"^\+?(\d+(?:[.,]\d*)?|[.,]\d+)").expect("quantity prefix pattern");
}

/// Coerce raw quantity input into a usable number.
///
/// The leading numeric prefix of the input is taken (`"12abc"` becomes
/// `12.0`, comma decimal separators accepted) and anything unusable (empty
/// input, plain text, negative or non-finite values) becomes `0.0`.
/// Parsing never fails and never reports an error to the caller.
pub fn coerce_quantity(input: &str) -> f64 {
    let trimmed = input.trim();
    let Some(m) = QUANTITY_PREFIX.find(trimmed) else {
        return 0.0;
    };
    let normalized = m.as_str().replace(',', ".");
    clamp_quantity(normalized.parse::<f64>().unwrap_or(0.0))
}

/// Clamp a numeric quantity to the storable range: finite and non-negative.
pub fn clamp_quantity(qty: f64) -> f64 {
    if qty.is_finite() && qty > 0.0 {
        qty
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_round_trip_serde() {
        for unit in ALL_UNITS {
            let json = serde_json::to_string(&unit).unwrap();
            let back: Unit = serde_json::from_str(&json).unwrap();
            assert_eq!(unit, back);
        }
        assert_eq!(serde_json::to_string(&Unit::Flat).unwrap(), "\"$\"");
        assert_eq!(serde_json::to_string(&Unit::Piece).unwrap(), "\"unidad\"");
    }

    #[test]
    fn test_default_entry_unit() {
        assert_eq!(Unit::Kilogram.default_entry_unit(), Unit::Gram);
        assert_eq!(Unit::Liter.default_entry_unit(), Unit::Milliliter);
        assert_eq!(Unit::Piece.default_entry_unit(), Unit::Piece);
        assert_eq!(Unit::Hour.default_entry_unit(), Unit::Hour);
        assert_eq!(Unit::Flat.default_entry_unit(), Unit::Flat);
    }

    #[test]
    fn test_unit_families() {
        assert!(Unit::Gram.is_weight());
        assert!(Unit::Kilogram.is_weight());
        assert!(Unit::Milliliter.is_volume());
        assert!(!Unit::Flat.is_weight());
        assert!(!Unit::Hour.is_volume());
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("kg".parse::<Unit>().unwrap(), Unit::Kilogram);
        assert_eq!(" $ ".parse::<Unit>().unwrap(), Unit::Flat);
        assert!("cups".parse::<Unit>().is_err());
    }

    #[test]
    fn test_convert_identity() {
        assert_eq!(convert_to_base(2.5, Unit::Kilogram, Unit::Kilogram), 2.5);
        assert_eq!(convert_to_base(3.0, Unit::Hour, Unit::Hour), 3.0);
    }

    #[test]
    fn test_convert_fine_to_coarse() {
        assert_eq!(convert_to_base(1000.0, Unit::Gram, Unit::Kilogram), 1.0);
        assert_eq!(convert_to_base(500.0, Unit::Milliliter, Unit::Liter), 0.5);
    }

    #[test]
    fn test_convert_count_and_flat_ignore_entry_unit() {
        assert_eq!(convert_to_base(4.0, Unit::Gram, Unit::Piece), 4.0);
        assert_eq!(convert_to_base(1.0, Unit::Milliliter, Unit::Flat), 1.0);
        assert_eq!(convert_to_base(123.0, Unit::Gram, Unit::Flat), 123.0);
    }

    #[test]
    fn test_convert_unsupported_pairing_is_zero() {
        // Never an error, always a zero contribution
        assert_eq!(convert_to_base(123.0, Unit::Gram, Unit::Liter), 0.0);
        assert_eq!(convert_to_base(123.0, Unit::Milliliter, Unit::Kilogram), 0.0);
        assert_eq!(convert_to_base(123.0, Unit::Gram, Unit::Hour), 0.0);
    }

    #[test]
    fn test_coerce_quantity_plain_numbers() {
        assert_eq!(coerce_quantity("500"), 500.0);
        assert_eq!(coerce_quantity(" 2.5 "), 2.5);
        assert_eq!(coerce_quantity("1,5"), 1.5);
        assert_eq!(coerce_quantity(".75"), 0.75);
    }

    #[test]
    fn test_coerce_quantity_forgiving_prefix() {
        assert_eq!(coerce_quantity("12abc"), 12.0);
        assert_eq!(coerce_quantity("3.5kg"), 3.5);
    }

    #[test]
    fn test_coerce_quantity_bad_input_is_zero() {
        assert_eq!(coerce_quantity(""), 0.0);
        assert_eq!(coerce_quantity("   "), 0.0);
        assert_eq!(coerce_quantity("abc"), 0.0);
        assert_eq!(coerce_quantity("-5"), 0.0);
        assert_eq!(coerce_quantity("NaN"), 0.0);
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(-1.0), 0.0);
        assert_eq!(clamp_quantity(f64::NAN), 0.0);
        assert_eq!(clamp_quantity(f64::INFINITY), 0.0);
        assert_eq!(clamp_quantity(0.25), 0.25);
    }
}
