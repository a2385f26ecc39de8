//! Weight unit types and conversion constants
//!
//! All weights are stored canonically in grams. Units only exist at the
//! display and input boundaries.

use serde::{Deserialize, Serialize};

use super::error::{WeightError, WeightResult};

// ============================================================================
// Conversion Factors (grams -> unit)
// ============================================================================

/// Most decimal places any display format will render
pub const MAX_DECIMALS: u32 = 10;

/// Kilograms per gram
pub const KG_PER_G: f64 = 0.001;
/// Ounces per gram
pub const OZ_PER_G: f64 = 0.035274;
/// Pounds per gram
pub const LB_PER_G: f64 = 0.00220462;
/// Ounces per pound
pub const OZ_PER_LB: f64 = 16.0;

/// A mass unit a user can display or enter weights in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Gram,
    Kilogram,
    Ounce,
    Pound,
}

impl WeightUnit {
    pub const ALL: [WeightUnit; 4] = [
        WeightUnit::Gram,
        WeightUnit::Kilogram,
        WeightUnit::Ounce,
        WeightUnit::Pound,
    ];

    /// Multiplicative factor from grams to this unit
    pub fn factor(&self) -> f64 {
        match self {
            WeightUnit::Gram => 1.0,
            WeightUnit::Kilogram => KG_PER_G,
            WeightUnit::Ounce => OZ_PER_G,
            WeightUnit::Pound => LB_PER_G,
        }
    }

    /// Short display label, also used as the database representation
    pub fn label(&self) -> &'static str {
        match self {
            WeightUnit::Gram => "g",
            WeightUnit::Kilogram => "kg",
            WeightUnit::Ounce => "oz",
            WeightUnit::Pound => "lb",
        }
    }

    /// Decimal places used when the caller doesn't ask for a specific precision
    pub fn default_decimals(&self) -> u32 {
        match self {
            WeightUnit::Gram => 0,
            WeightUnit::Kilogram | WeightUnit::Ounce | WeightUnit::Pound => 2,
        }
    }

    /// Parse from a unit name or abbreviation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" => Some(WeightUnit::Gram),
            "kg" | "kgs" | "kilogram" | "kilograms" => Some(WeightUnit::Kilogram),
            "oz" | "ounce" | "ounces" => Some(WeightUnit::Ounce),
            "lb" | "lbs" | "pound" | "pounds" => Some(WeightUnit::Pound),
            _ => None,
        }
    }

    /// Convert to database string
    pub fn to_db_str(&self) -> &'static str {
        self.label()
    }

    /// Parse a stored unit, falling back to grams for unknown values
    pub fn from_db_str(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How a weight gets rendered for display.
///
/// The two policies are not interchangeable: `Fixed` always renders in one
/// unit, `ImperialAuto` switches between "x oz" and "x lb y oz".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FormatPolicy {
    Fixed {
        unit: WeightUnit,
        /// Defaults to the unit's own precision when absent
        decimals: Option<u32>,
        show_unit: bool,
    },
    ImperialAuto {
        precision: u32,
    },
}

impl FormatPolicy {
    /// Fixed-unit policy with the unit's default decimals and label shown
    pub fn fixed(unit: WeightUnit) -> Self {
        FormatPolicy::Fixed {
            unit,
            decimals: None,
            show_unit: true,
        }
    }

    /// Reject decimal counts above `MAX_DECIMALS`
    pub fn validate(self) -> WeightResult<Self> {
        let precision = match self {
            FormatPolicy::Fixed { decimals, .. } => decimals.unwrap_or(0),
            FormatPolicy::ImperialAuto { precision } => precision,
        };
        if precision > MAX_DECIMALS {
            return Err(WeightError::PrecisionOutOfRange {
                precision,
                max: MAX_DECIMALS,
            });
        }
        Ok(self)
    }
}

impl Default for FormatPolicy {
    fn default() -> Self {
        FormatPolicy::fixed(WeightUnit::Gram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!(WeightUnit::from_str("g"), Some(WeightUnit::Gram));
        assert_eq!(WeightUnit::from_str("Grams"), Some(WeightUnit::Gram));
        assert_eq!(WeightUnit::from_str(" kg "), Some(WeightUnit::Kilogram));
        assert_eq!(WeightUnit::from_str("ounces"), Some(WeightUnit::Ounce));
        assert_eq!(WeightUnit::from_str("LBS"), Some(WeightUnit::Pound));
        assert_eq!(WeightUnit::from_str("stone"), None);
        assert_eq!(WeightUnit::from_str(""), None);
    }

    #[test]
    fn test_factors() {
        assert_eq!(WeightUnit::Gram.factor(), 1.0);
        assert_eq!(WeightUnit::Kilogram.factor(), 0.001);
        assert_eq!(WeightUnit::Ounce.factor(), 0.035274);
        assert_eq!(WeightUnit::Pound.factor(), 0.00220462);
    }

    #[test]
    fn test_default_decimals() {
        assert_eq!(WeightUnit::Gram.default_decimals(), 0);
        assert_eq!(WeightUnit::Kilogram.default_decimals(), 2);
        assert_eq!(WeightUnit::Ounce.default_decimals(), 2);
        assert_eq!(WeightUnit::Pound.default_decimals(), 2);
    }

    #[test]
    fn test_db_round_trip() {
        for unit in WeightUnit::ALL {
            assert_eq!(WeightUnit::from_db_str(unit.to_db_str()), unit);
        }
        assert_eq!(WeightUnit::from_db_str("garbage"), WeightUnit::Gram);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&WeightUnit::Kilogram).unwrap();
        assert_eq!(json, "\"kilogram\"");
        let policy: FormatPolicy =
            serde_json::from_str(r#"{"mode":"imperial_auto","precision":1}"#).unwrap();
        assert_eq!(policy, FormatPolicy::ImperialAuto { precision: 1 });
    }

    #[test]
    fn test_validate_precision() {
        assert!(FormatPolicy::ImperialAuto { precision: MAX_DECIMALS }.validate().is_ok());
        assert_eq!(
            FormatPolicy::ImperialAuto { precision: 400 }.validate(),
            Err(WeightError::PrecisionOutOfRange { precision: 400, max: MAX_DECIMALS })
        );

        let fixed = FormatPolicy::Fixed {
            unit: WeightUnit::Gram,
            decimals: Some(70_000),
            show_unit: true,
        };
        assert!(fixed.validate().is_err());
        assert!(FormatPolicy::fixed(WeightUnit::Ounce).validate().is_ok());
    }
}
