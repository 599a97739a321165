//! Unit conversion table for price arithmetic.
//!
//! Supermarket unit pricing is conventionally quoted per kilogram or per
//! liter, while list tracking commonly uses grams or milliliters. All
//! unit-price arithmetic happens in the pricing reference unit (kg or L) so
//! the engine never mixes unit systems and produces a 1000x error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Factor between a tracked small unit (g, ml) and its reference unit (kg, L).
const REFERENCE_SCALE: f64 = 1000.0;

/// Closed set of units the engine understands.
///
/// Parsed case-insensitively from free text; anything unrecognized lands in
/// `Other` and converts with factor 1. That identity fallback mirrors the
/// source system and silently mis-prices units that would need a real
/// conversion, so new weighed or measured units belong in this enum, not in
/// `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Unit {
    /// Grams; priced per kilogram.
    Gram,
    /// Milliliters; priced per liter.
    Milliliter,
    /// Kilograms; already the reference unit.
    Kilogram,
    /// Liters; already the reference unit.
    Liter,
    /// Single units ("un").
    Each,
    /// Packages ("pct").
    Package,
    /// Boxes ("cx").
    Box,
    /// Free-text unit with no conversion.
    Other(String),
}

impl Unit {
    /// Parse a unit token case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "g" => Unit::Gram,
            "ml" => Unit::Milliliter,
            "kg" => Unit::Kilogram,
            "l" => Unit::Liter,
            "un" => Unit::Each,
            "pct" => Unit::Package,
            "cx" => Unit::Box,
            _ => Unit::Other(raw.trim().to_string()),
        }
    }

    /// The canonical token for this unit.
    pub fn as_token(&self) -> &str {
        match self {
            Unit::Gram => "g",
            Unit::Milliliter => "ml",
            Unit::Kilogram => "kg",
            Unit::Liter => "l",
            Unit::Each => "un",
            Unit::Package => "pct",
            Unit::Box => "cx",
            Unit::Other(raw) => raw,
        }
    }

    /// Convert a tracked quantity into the pricing reference unit.
    /// Grams and milliliters divide by 1000; everything else is identity.
    pub fn to_reference(&self, quantity: f64) -> f64 {
        match self {
            Unit::Gram | Unit::Milliliter => quantity / REFERENCE_SCALE,
            _ => quantity,
        }
    }

    /// Convert a reference-unit quantity back into the tracked unit.
    /// Exact inverse of [`Unit::to_reference`].
    pub fn from_reference(&self, quantity: f64) -> f64 {
        match self {
            Unit::Gram | Unit::Milliliter => quantity * REFERENCE_SCALE,
            _ => quantity,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

impl From<String> for Unit {
    fn from(raw: String) -> Self {
        Unit::parse(&raw)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.as_token().to_string()
    }
}

/// Round a monetary value to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
