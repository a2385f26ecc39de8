//! Pack weight aggregation
//!
//! Turns a pack list's line items into total, base, worn and consumable
//! weights plus a per-category breakdown. Everything here works in grams.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::converter::format_with_policy;
use super::error::{WeightError, WeightResult};
use super::units::FormatPolicy;

/// Category name used for gear without a category
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";
/// Color used for gear without a category
pub const DEFAULT_CATEGORY_COLOR: &str = "#6b7280";

/// One gear item's entry in a pack list, as seen by the aggregation.
///
/// Only built through `GearLineItem::new`, so the weight is always finite
/// and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GearLineItem {
    weight_grams: f64,
    quantity: u32,
    is_included: bool,
    is_worn: bool,
    is_consumable: bool,
    category_id: Option<i64>,
    category_name: String,
    category_color: String,
}

impl GearLineItem {
    /// Build a line item with default flags (included, not worn, not consumable)
    /// in the uncategorized group.
    ///
    /// Fails if the weight is negative or not finite.
    pub fn new(weight_grams: f64, quantity: u32) -> WeightResult<Self> {
        if !weight_grams.is_finite() || weight_grams < 0.0 {
            return Err(WeightError::InvalidInput {
                value: weight_grams,
            });
        }
        Ok(Self {
            weight_grams,
            quantity,
            is_included: true,
            is_worn: false,
            is_consumable: false,
            category_id: None,
            category_name: UNCATEGORIZED_NAME.to_string(),
            category_color: DEFAULT_CATEGORY_COLOR.to_string(),
        })
    }

    pub fn included(mut self, is_included: bool) -> Self {
        self.is_included = is_included;
        self
    }

    pub fn worn(mut self, is_worn: bool) -> Self {
        self.is_worn = is_worn;
        self
    }

    pub fn consumable(mut self, is_consumable: bool) -> Self {
        self.is_consumable = is_consumable;
        self
    }

    /// Assign a category. A `None` id keeps the item uncategorized.
    pub fn category(mut self, id: Option<i64>, name: impl Into<String>, color: impl Into<String>) -> Self {
        self.category_id = id;
        self.category_name = name.into();
        self.category_color = color.into();
        self
    }

    pub fn weight_grams(&self) -> f64 {
        self.weight_grams
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn is_included(&self) -> bool {
        self.is_included
    }

    pub fn is_worn(&self) -> bool {
        self.is_worn
    }

    pub fn is_consumable(&self) -> bool {
        self.is_consumable
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category_id
    }

    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    pub fn category_color(&self) -> &str {
        &self.category_color
    }

    /// Weight of this line (unit weight times quantity)
    pub fn line_weight(&self) -> f64 {
        self.weight_grams * f64::from(self.quantity)
    }

    /// Counts toward base weight: carried in the pack and not used up
    pub fn is_base(&self) -> bool {
        !self.is_worn && !self.is_consumable
    }
}

/// Weight of one category within a pack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub category_id: Option<i64>,
    pub category_name: String,
    pub category_color: String,
    pub weight: f64,
    /// Share of the total weight, 0-100
    pub percentage: f64,
    pub item_count: usize,
}

/// Computed weight totals for a pack list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightBreakdown {
    pub total_weight: f64,
    pub base_weight: f64,
    pub worn_weight: f64,
    pub consumable_weight: f64,
    /// Every line item handed in, included or not
    pub item_count: usize,
    pub included_item_count: usize,
    pub category_breakdown: Vec<CategoryWeight>,
}

/// Aggregate line items into a breakdown.
///
/// Only included items contribute weight. Categories appear in the order
/// their first included item appears.
pub fn compute_breakdown(items: &[GearLineItem]) -> WeightBreakdown {
    let mut breakdown = WeightBreakdown {
        item_count: items.len(),
        ..WeightBreakdown::default()
    };

    let mut group_index: HashMap<Option<i64>, usize> = HashMap::new();

    for item in items.iter().filter(|i| i.is_included) {
        let weight = item.line_weight();

        breakdown.included_item_count += 1;
        breakdown.total_weight += weight;
        if item.is_base() {
            breakdown.base_weight += weight;
        }
        if item.is_worn {
            breakdown.worn_weight += weight;
        }
        if item.is_consumable {
            breakdown.consumable_weight += weight;
        }

        let idx = *group_index.entry(item.category_id).or_insert_with(|| {
            breakdown.category_breakdown.push(CategoryWeight {
                category_id: item.category_id,
                category_name: item.category_name.clone(),
                category_color: item.category_color.clone(),
                weight: 0.0,
                percentage: 0.0,
                item_count: 0,
            });
            breakdown.category_breakdown.len() - 1
        });

        let group = &mut breakdown.category_breakdown[idx];
        group.weight += weight;
        group.item_count += 1;
    }

    let total = breakdown.total_weight;
    for group in &mut breakdown.category_breakdown {
        group.percentage = if total > 0.0 {
            group.weight / total * 100.0
        } else {
            0.0
        };
    }

    tracing::debug!(
        "Computed breakdown: {} items ({} included), total {:.1}g, base {:.1}g, {} categories",
        breakdown.item_count,
        breakdown.included_item_count,
        breakdown.total_weight,
        breakdown.base_weight,
        breakdown.category_breakdown.len()
    );

    breakdown
}

impl WeightBreakdown {
    /// Categories ordered heaviest first. Ties keep their original order.
    pub fn sorted_by_weight(mut self) -> Self {
        self.category_breakdown
            .sort_by(|a, b| b.weight.total_cmp(&a.weight));
        self
    }

    /// Render every weight in the breakdown under the given policy
    pub fn summarize(&self, policy: &FormatPolicy) -> WeightSummary {
        WeightSummary {
            policy: *policy,
            total: format_with_policy(self.total_weight, policy),
            base: format_with_policy(self.base_weight, policy),
            worn: format_with_policy(self.worn_weight, policy),
            consumable: format_with_policy(self.consumable_weight, policy),
            categories: self
                .category_breakdown
                .iter()
                .map(|c| CategorySummary {
                    category_name: c.category_name.clone(),
                    weight: format_with_policy(c.weight, policy),
                    percentage: format!("{:.1}%", c.percentage),
                })
                .collect(),
        }
    }
}

/// A breakdown rendered for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSummary {
    pub policy: FormatPolicy,
    pub total: String,
    pub base: String,
    pub worn: String,
    pub consumable: String,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category_name: String,
    pub weight: String,
    pub percentage: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight::WeightUnit;

    fn item(weight: f64, qty: u32, cat: i64, name: &str) -> GearLineItem {
        GearLineItem::new(weight, qty)
            .unwrap()
            .category(Some(cat), name, "#112233")
    }

    fn sample_items() -> Vec<GearLineItem> {
        vec![
            item(100.0, 2, 1, "A"),
            item(50.0, 1, 2, "B").worn(true),
            item(30.0, 1, 1, "A").included(false),
        ]
    }

    #[test]
    fn test_empty_breakdown() {
        let b = compute_breakdown(&[]);
        assert_eq!(b.total_weight, 0.0);
        assert_eq!(b.base_weight, 0.0);
        assert_eq!(b.worn_weight, 0.0);
        assert_eq!(b.consumable_weight, 0.0);
        assert_eq!(b.item_count, 0);
        assert!(b.category_breakdown.is_empty());
    }

    #[test]
    fn test_sample_breakdown() {
        let b = compute_breakdown(&sample_items());
        assert_eq!(b.total_weight, 250.0);
        assert_eq!(b.base_weight, 200.0);
        assert_eq!(b.worn_weight, 50.0);
        assert_eq!(b.consumable_weight, 0.0);
        assert_eq!(b.item_count, 3);
        assert_eq!(b.included_item_count, 2);

        assert_eq!(b.category_breakdown.len(), 2);
        let a = &b.category_breakdown[0];
        assert_eq!(a.category_id, Some(1));
        assert_eq!(a.category_name, "A");
        assert_eq!(a.weight, 200.0);
        assert!((a.percentage - 80.0).abs() < 1e-9);
        let bb = &b.category_breakdown[1];
        assert_eq!(bb.category_id, Some(2));
        assert_eq!(bb.weight, 50.0);
        assert!((bb.percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_excluded_items_still_counted() {
        let items = vec![item(10.0, 1, 1, "A").included(false); 4];
        let b = compute_breakdown(&items);
        assert_eq!(b.item_count, 4);
        assert_eq!(b.included_item_count, 0);
        assert_eq!(b.total_weight, 0.0);
        assert!(b.category_breakdown.is_empty());
    }

    #[test]
    fn test_consumable_and_worn_excluded_from_base() {
        let items = vec![
            item(400.0, 1, 1, "Food").consumable(true),
            item(200.0, 1, 2, "Clothing").worn(true),
            item(100.0, 1, 2, "Clothing").worn(true).consumable(true),
            item(900.0, 1, 3, "Shelter"),
        ];
        let b = compute_breakdown(&items);
        assert_eq!(b.total_weight, 1600.0);
        assert_eq!(b.base_weight, 900.0);
        assert_eq!(b.worn_weight, 300.0);
        assert_eq!(b.consumable_weight, 500.0);
    }

    #[test]
    fn test_zero_quantity_and_zero_weight() {
        let items = vec![item(500.0, 0, 1, "A"), item(0.0, 3, 2, "B")];
        let b = compute_breakdown(&items);
        assert_eq!(b.total_weight, 0.0);
        assert_eq!(b.included_item_count, 2);
        assert_eq!(b.category_breakdown.len(), 2);
        assert!(b.category_breakdown.iter().all(|c| c.percentage == 0.0));
    }

    #[test]
    fn test_category_order_is_first_appearance() {
        let items = vec![
            item(10.0, 1, 3, "C").included(false),
            item(10.0, 1, 2, "B"),
            item(500.0, 1, 1, "A"),
            item(10.0, 1, 3, "C"),
            item(10.0, 1, 2, "B"),
        ];
        let b = compute_breakdown(&items);
        let ids: Vec<_> = b.category_breakdown.iter().map(|c| c.category_id).collect();
        assert_eq!(ids, vec![Some(2), Some(1), Some(3)]);
        assert_eq!(b.category_breakdown[0].item_count, 2);
    }

    #[test]
    fn test_uncategorized_group() {
        let items = vec![
            GearLineItem::new(75.0, 1).unwrap(),
            item(25.0, 1, 1, "A"),
            GearLineItem::new(25.0, 2).unwrap(),
        ];
        let b = compute_breakdown(&items);
        assert_eq!(b.category_breakdown[0].category_id, None);
        assert_eq!(b.category_breakdown[0].category_name, UNCATEGORIZED_NAME);
        assert_eq!(b.category_breakdown[0].weight, 125.0);
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let items = vec![
            item(123.4, 3, 1, "A"),
            item(77.7, 1, 2, "B"),
            item(5.5, 7, 3, "C"),
            item(1000.0, 1, 4, "D").worn(true),
        ];
        let b = compute_breakdown(&items);
        let sum: f64 = b.category_breakdown.iter().map(|c| c.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let items = sample_items();
        let first = compute_breakdown(&items);
        let second = compute_breakdown(&items);
        assert_eq!(first, second);
        assert_eq!(first.total_weight.to_bits(), second.total_weight.to_bits());
    }

    #[test]
    fn test_sorted_by_weight() {
        let items = vec![
            item(10.0, 1, 1, "Light"),
            item(300.0, 1, 2, "Heavy"),
            item(10.0, 1, 3, "AlsoLight"),
        ];
        let b = compute_breakdown(&items).sorted_by_weight();
        let names: Vec<_> = b.category_breakdown.iter().map(|c| c.category_name.as_str()).collect();
        assert_eq!(names, vec!["Heavy", "Light", "AlsoLight"]);
    }

    #[test]
    fn test_new_rejects_bad_weight() {
        assert!(GearLineItem::new(-1.0, 1).is_err());
        assert!(GearLineItem::new(f64::NAN, 1).is_err());
        assert!(GearLineItem::new(f64::INFINITY, 2).is_err());
        assert!(GearLineItem::new(0.0, 1).is_ok());
    }

    #[test]
    fn test_summarize() {
        let b = compute_breakdown(&sample_items());
        let s = b.summarize(&FormatPolicy::fixed(WeightUnit::Gram));
        assert_eq!(s.total, "250 g");
        assert_eq!(s.base, "200 g");
        assert_eq!(s.worn, "50 g");
        assert_eq!(s.categories[0].percentage, "80.0%");

        let s = b.summarize(&FormatPolicy::ImperialAuto { precision: 1 });
        assert_eq!(s.total, "8.8 oz");
    }
}
