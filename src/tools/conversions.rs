//! Weight conversion MCP Tools
//!
//! Thin wrappers over the weight module for converting, formatting and
//! parsing weights outside of any pack list.

use serde::Serialize;

use crate::weight::{self, FormatPolicy, WeightUnit};

use super::settings::parse_unit;

#[derive(Debug, Serialize)]
pub struct ConvertWeightResponse {
    pub value: f64,
    pub from_unit: WeightUnit,
    pub to_unit: WeightUnit,
    pub grams: f64,
    pub result: f64,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct FormatWeightResponse {
    pub grams: f64,
    pub policy: FormatPolicy,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct ParseWeightResponse {
    pub input: String,
    pub unit: WeightUnit,
    /// None when the input isn't a usable weight
    pub grams: Option<f64>,
    pub valid: bool,
}

/// Convert a value between two units
pub fn convert_weight(value: f64, from_unit: &str, to_unit: &str) -> Result<ConvertWeightResponse, String> {
    let from = parse_unit(from_unit)?;
    let to = parse_unit(to_unit)?;

    let result = weight::convert_between(value, from, to).map_err(|e| e.to_string())?;
    let grams = weight::convert_to_grams(value, from).map_err(|e| e.to_string())?;

    Ok(ConvertWeightResponse {
        value,
        from_unit: from,
        to_unit: to,
        grams,
        result,
        formatted: weight::format_weight(grams, to, None, true),
    })
}

/// Build the format policy a caller asked for.
///
/// Fails when the requested decimals or precision exceed `MAX_DECIMALS`.
pub fn build_policy(
    unit: WeightUnit,
    decimals: Option<u32>,
    show_unit: bool,
    imperial_auto: bool,
    precision: u32,
) -> Result<FormatPolicy, String> {
    let policy = if imperial_auto {
        FormatPolicy::ImperialAuto { precision }
    } else {
        FormatPolicy::Fixed {
            unit,
            decimals,
            show_unit,
        }
    };
    policy.validate().map_err(|e| e.to_string())
}

/// Format a gram value for display
pub fn format_weight(grams: f64, policy: FormatPolicy) -> Result<FormatWeightResponse, String> {
    if !grams.is_finite() || grams < 0.0 {
        return Err(format!("grams must be a finite number >= 0, got {}", grams));
    }

    Ok(FormatWeightResponse {
        grams,
        policy,
        formatted: weight::format_with_policy(grams, &policy),
    })
}

/// Parse typed input. Invalid input is a normal response with `grams: null`.
pub fn parse_weight_input(input: &str, unit: &str) -> Result<ParseWeightResponse, String> {
    let unit = parse_unit(unit)?;
    let grams = weight::parse_weight_input(input, unit);

    Ok(ParseWeightResponse {
        input: input.to_string(),
        unit,
        grams,
        valid: grams.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_weight_tool() {
        let resp = convert_weight(1.0, "kg", "g").unwrap();
        assert!((resp.result - 1000.0).abs() < 1e-9);
        assert_eq!(resp.formatted, "1000 g");
        assert!(convert_weight(-1.0, "kg", "g").is_err());
        assert!(convert_weight(1.0, "kg", "stone").is_err());
    }

    #[test]
    fn test_format_weight_tool() {
        let policy = build_policy(WeightUnit::Gram, None, true, true, 1).unwrap();
        assert_eq!(format_weight(200.0, policy).unwrap().formatted, "7.1 oz");

        let policy = build_policy(WeightUnit::Kilogram, None, true, false, 2).unwrap();
        assert_eq!(format_weight(1000.0, policy).unwrap().formatted, "1.00 kg");

        assert!(format_weight(-5.0, policy).is_err());
    }

    #[test]
    fn test_build_policy_rejects_huge_precision() {
        let err = build_policy(WeightUnit::Gram, Some(70_000), true, false, 2).unwrap_err();
        assert_eq!(err, "precision must be 0..=10, got 70000");
        assert!(build_policy(WeightUnit::Gram, None, true, true, u32::MAX).is_err());
        assert!(build_policy(WeightUnit::Gram, Some(10), true, false, 2).is_ok());
        // precision only matters in imperial mode
        assert!(build_policy(WeightUnit::Gram, None, true, false, 999).is_ok());
    }

    #[test]
    fn test_parse_weight_tool_null_on_invalid() {
        let resp = parse_weight_input("abc", "g").unwrap();
        assert!(!resp.valid);
        assert_eq!(resp.grams, None);

        let resp = parse_weight_input("2.5", "kg").unwrap();
        assert!(resp.valid);
        assert!((resp.grams.unwrap() - 2500.0).abs() < 1e-9);

        assert!(parse_weight_input("2", "stone").is_err());
    }
}
