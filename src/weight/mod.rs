//! Weight calculation module
//!
//! Handles unit conversion, display formatting and pack weight aggregation.

pub mod breakdown;
pub mod converter;
pub mod error;
pub mod units;

pub use breakdown::{
    compute_breakdown, CategorySummary, CategoryWeight, GearLineItem, WeightBreakdown,
    WeightSummary, DEFAULT_CATEGORY_COLOR, UNCATEGORIZED_NAME,
};
pub use converter::{
    convert_between, convert_to_grams, convert_weight, format_imperial, format_weight,
    format_with_policy, parse_weight_input,
};
pub use error::{WeightError, WeightResult};
pub use units::{FormatPolicy, WeightUnit, MAX_DECIMALS};
