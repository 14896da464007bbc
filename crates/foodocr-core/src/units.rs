//! Weight/volume normalization and plausibility predicates.
//!
//! All mass units reduce to grams and all volume units to milliliters.
//! The predicates below gate `automatic_processing` on product-weight
//! predictions, so their exact behavior is load-bearing.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Normalization failure: a bad numeric value or a dimensionless unit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// The value string is not a number.
    #[error("'{0}' is not a numeric value")]
    InvalidValue(String),

    /// The unit is dimensionally neither a mass nor a volume.
    #[error("unit '{0}' is neither a mass nor a volume")]
    UnknownUnit(String),
}

/// A weight or volume reduced to its canonical unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedWeight {
    /// Value expressed in the canonical unit.
    pub value: Decimal,
    /// Canonical unit: `"g"` for masses, `"ml"` for volumes.
    pub unit: &'static str,
}

/// Reduce a raw value/unit pair to grams or milliliters.
///
/// Comma decimal separators are accepted. `"fl oz"` converts as exactly
/// x30 to milliliters; this deviates from the US customary x29.5735 on
/// purpose, to stay compatible with previously accepted outputs.
pub fn normalize_weight(value: &str, unit: &str) -> Result<NormalizedWeight, NormalizeError> {
    let value = value.replace(',', ".");
    let value =
        Decimal::from_str(&value).map_err(|_| NormalizeError::InvalidValue(value.clone()))?;

    let (value, unit) = match unit {
        "fl oz" => (value * Decimal::new(30, 0), "ml"),
        "mg" => (value / Decimal::ONE_THOUSAND, "g"),
        "g" => (value, "g"),
        "kg" => (value * Decimal::ONE_THOUSAND, "g"),
        // Avoirdupois ounce and pound.
        "oz" => (value * Decimal::new(28_349_523_125, 9), "g"),
        "lbs" => (value * Decimal::new(45_359_237, 5), "g"),
        "ml" => (value, "ml"),
        "cl" => (value * Decimal::TEN, "ml"),
        "dl" => (value * Decimal::ONE_HUNDRED, "ml"),
        "l" => (value * Decimal::ONE_THOUSAND, "ml"),
        other => return Err(NormalizeError::UnknownUnit(other.to_string())),
    };

    Ok(NormalizedWeight {
        value: value.normalize(),
        unit,
    })
}

/// Whether a raw weight value string is acceptable at all.
///
/// Rejected: non-numeric values, values <= 0, a leading zero without a
/// decimal separator, and non-integer magnitudes.
pub fn is_valid_weight(value: &str) -> bool {
    let value = value.replace(',', ".");

    if value.starts_with('0') && !value.contains('.') {
        return false;
    }

    let Ok(parsed) = Decimal::from_str(&value) else {
        return false;
    };

    if parsed <= Decimal::ZERO {
        return false;
    }

    if parsed != parsed.trunc() {
        return false;
    }

    true
}

/// Whether a normalized weight is outside the plausible retail range.
pub fn is_extreme_weight(value: Decimal, unit: &str) -> bool {
    if unit == "g" || unit == "ml" {
        return value >= Decimal::new(10_000, 0) || value <= Decimal::TEN;
    }
    false
}

/// Whether a normalized weight should require human review.
///
/// Extreme values are suspicious, as are values >= 1000 whose trailing
/// digit is non-zero (e.g. 1253 g is almost always an OCR artifact).
pub fn is_suspicious_weight(value: Decimal, unit: &str) -> bool {
    if is_extreme_weight(value, unit) {
        return true;
    }

    if value >= Decimal::ONE_THOUSAND && value % Decimal::TEN != Decimal::ZERO {
        return true;
    }

    false
}
