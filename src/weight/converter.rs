//! Weight conversion and formatting functions
//!
//! Converts canonical gram values to display units, renders them as strings
//! and parses user-typed input back into grams.

use super::error::{WeightError, WeightResult};
use super::units::{FormatPolicy, WeightUnit, MAX_DECIMALS, OZ_PER_G, OZ_PER_LB};

/// Convert grams into the target unit. No rounding is applied.
pub fn convert_weight(grams: f64, target: WeightUnit) -> f64 {
    grams * target.factor()
}

/// Convert a value in `source` units back into grams.
///
/// Fails with `InvalidInput` for negative or non-finite values.
pub fn convert_to_grams(value: f64, source: WeightUnit) -> WeightResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(WeightError::InvalidInput { value });
    }
    Ok(value / source.factor())
}

/// Convert between two display units, going through grams
pub fn convert_between(value: f64, from: WeightUnit, to: WeightUnit) -> WeightResult<f64> {
    let grams = convert_to_grams(value, from)?;
    Ok(convert_weight(grams, to))
}

/// Render grams in a fixed unit.
///
/// `decimals` defaults to the unit's own precision (0 for grams, 2 otherwise)
/// and is capped at `MAX_DECIMALS`.
///
/// Examples:
/// - (1000, Kilogram) -> "1.00 kg"
/// - (500, Gram) -> "500 g"
/// - (500, Gram, show_unit = false) -> "500"
pub fn format_weight(grams: f64, unit: WeightUnit, decimals: Option<u32>, show_unit: bool) -> String {
    let decimals = decimals
        .unwrap_or_else(|| unit.default_decimals())
        .min(MAX_DECIMALS) as usize;
    let value = convert_weight(grams, unit);

    if show_unit {
        format!("{:.*} {}", decimals, value, unit.label())
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// Render grams as auto-scaled imperial.
///
/// At 16 oz and above the weight is split into whole pounds plus the
/// remaining ounces, otherwise it is ounces alone. Ounce values are rounded
/// to `precision` (capped at `MAX_DECIMALS`) and printed without trailing
/// zeros. A remainder that rounds up to 16 is not carried into the pounds.
///
/// Examples:
/// - (500, 2) -> "1 lb 1.64 oz"
/// - (200, 1) -> "7.1 oz"
pub fn format_imperial(grams: f64, precision: u32) -> String {
    let ounces = grams * OZ_PER_G;

    if ounces >= OZ_PER_LB {
        let pounds = (ounces / OZ_PER_LB).floor();
        let remaining = round_to(ounces % OZ_PER_LB, precision);
        format!("{} lb {} oz", pounds as u64, remaining)
    } else {
        format!("{} oz", round_to(ounces, precision))
    }
}

/// Render grams under an explicitly chosen policy
pub fn format_with_policy(grams: f64, policy: &FormatPolicy) -> String {
    match *policy {
        FormatPolicy::Fixed {
            unit,
            decimals,
            show_unit,
        } => format_weight(grams, unit, decimals, show_unit),
        FormatPolicy::ImperialAuto { precision } => format_imperial(grams, precision),
    }
}

/// Parse user-typed text as a weight in `unit` and return grams.
///
/// Returns None for empty, non-numeric, non-finite or negative input. Bad
/// input is an ordinary validation outcome here, not an error.
pub fn parse_weight_input(input: &str, unit: WeightUnit) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value: f64 = trimmed.parse().ok()?;
    convert_to_grams(value, unit).ok()
}

/// Round half away from zero to `precision` decimal places
fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision.min(MAX_DECIMALS) as i32);
    (value * scale).round() / scale
}
