//! Points-program domain types: catalog items, price tiers, and the per-item
//! reward economics computed from them.
//!
//! Money is carried as `f64` dollars and rounded only at the export edge;
//! point costs are whole points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ProgramConfig;

// ─── Catalog ────────────────────────────────────────────────────────────────

/// A redeemable catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub retail_price: f64,
    /// Whether the item participates in tiering and calculation.
    pub included: bool,
}

impl Item {
    pub fn new(name: impl Into<String>, retail_price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            retail_price,
            included: true,
        }
    }
}

// ─── Tiers ──────────────────────────────────────────────────────────────────

/// A price bracket of catalog items sharing one suggested point cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Position in the ascending tier order, starting at 0.
    pub id: u8,
    pub name: String,
    pub min_price: f64,
    /// Highest member price. The last tier accepts anything above it.
    pub max_price: f64,
    pub avg_price: f64,
    pub item_count: usize,
    pub total_value: f64,
    pub payback_rate: f64,
    pub suggested_point_cost: u64,
    /// Point cost the generator derived from the current configuration.
    pub generated_point_cost: u64,
    /// Set by a manual edit; cleared only by regeneration or reset.
    pub overridden: bool,
}

impl Tier {
    /// Whether `price` falls in this tier's range. `unbounded` lifts the
    /// upper limit, used for the last tier.
    pub fn contains(&self, price: f64, unbounded: bool) -> bool {
        price >= self.min_price && (unbounded || price <= self.max_price)
    }

    /// Manual edit relative to the generated value. Zero for untouched tiers.
    pub fn point_cost_delta(&self) -> i64 {
        self.suggested_point_cost as i64 - self.generated_point_cost as i64
    }
}

// ─── Results ────────────────────────────────────────────────────────────────

/// Reward economics for one included item, derived from its retail price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardResult {
    pub item_id: Uuid,
    pub name: String,
    pub retail_price: f64,
    pub tier_id: u8,
    pub tier: String,
    pub tier_suggested_cost: u64,
    pub tier_payback: f64,
    pub point_cost: u64,
    pub customer_spend_required: f64,
    pub profit_from_spend: f64,
    pub effective_cost: f64,
    /// Reward cost as a percentage of the profit it took to earn it.
    /// `None` when the spend yields no profit.
    pub profit_impact: Option<f64>,
}

/// Reward economics for one included item, derived from its tier's current
/// (possibly edited) point cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPointsRow {
    pub item_id: Uuid,
    pub name: String,
    pub retail_price: f64,
    pub tier_id: u8,
    pub tier: String,
    pub tier_point_cost: u64,
    pub tier_payback: f64,
    pub overridden: bool,
    pub customer_spend: f64,
    pub profit_from_spend: f64,
    pub profit_impact: Option<f64>,
}

/// Output of one per-item calculation, replaced wholesale on recalculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub results: Vec<RewardResult>,
    pub config: ProgramConfig,
    pub computed_at: DateTime<Utc>,
}

/// Portfolio-level aggregates over a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub item_count: usize,
    pub total_retail_value: f64,
    pub total_point_cost: u64,
    pub average_point_cost: f64,
    pub average_profit_impact: Option<f64>,
    pub max_profit_impact: Option<f64>,
}

impl ResultSet {
    pub fn new(results: Vec<RewardResult>, config: ProgramConfig) -> Self {
        Self {
            results,
            config,
            computed_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summary(&self) -> ResultSummary {
        let item_count = self.results.len();
        let total_retail_value = self.results.iter().map(|r| r.retail_price).sum();
        let total_point_cost = self
            .results
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.point_cost));
        let average_point_cost = if item_count > 0 {
            total_point_cost as f64 / item_count as f64
        } else {
            0.0
        };

        let impacts: Vec<f64> = self.results.iter().filter_map(|r| r.profit_impact).collect();
        let average_profit_impact = if impacts.is_empty() {
            None
        } else {
            Some(impacts.iter().sum::<f64>() / impacts.len() as f64)
        };
        let max_profit_impact = impacts.iter().copied().reduce(f64::max);

        ResultSummary {
            item_count,
            total_retail_value,
            total_point_cost,
            average_point_cost,
            average_profit_impact,
            max_profit_impact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(min: f64, max: f64) -> Tier {
        Tier {
            id: 0,
            name: "Tier 1".into(),
            min_price: min,
            max_price: max,
            avg_price: (min + max) / 2.0,
            item_count: 2,
            total_value: min + max,
            payback_rate: 5.0,
            suggested_point_cost: 1000,
            generated_point_cost: 1000,
            overridden: false,
        }
    }

    fn result(price: f64, points: u64, impact: Option<f64>) -> RewardResult {
        RewardResult {
            item_id: Uuid::new_v4(),
            name: format!("item-{points}"),
            retail_price: price,
            tier_id: 0,
            tier: "Tier 1".into(),
            tier_suggested_cost: points,
            tier_payback: 5.0,
            point_cost: points,
            customer_spend_required: price / 0.05,
            profit_from_spend: price / 0.05 * 0.7,
            effective_cost: price,
            profit_impact: impact,
        }
    }

    #[test]
    fn test_tier_contains_inclusive_bounds() {
        let t = tier(1.0, 5.0);
        assert!(t.contains(1.0, false));
        assert!(t.contains(5.0, false));
        assert!(!t.contains(5.01, false));
        assert!(t.contains(500.0, true));
        assert!(!t.contains(0.99, true));
    }

    #[test]
    fn test_point_cost_delta() {
        let mut t = tier(1.0, 5.0);
        assert_eq!(t.point_cost_delta(), 0);
        t.suggested_point_cost = 750;
        assert_eq!(t.point_cost_delta(), -250);
    }

    #[test]
    fn test_new_item_is_included() {
        let item = Item::new("Mug", 12.5);
        assert!(item.included);
        assert_eq!(item.name, "Mug");
    }

    #[test]
    fn test_summary_skips_missing_impact() {
        let set = ResultSet::new(
            vec![
                result(2.0, 4000, Some(10.0)),
                result(4.0, 8000, Some(20.0)),
                result(0.0, 0, None),
            ],
            ProgramConfig::default(),
        );
        let summary = set.summary();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total_point_cost, 12000);
        assert!((summary.total_retail_value - 6.0).abs() < 1e-9);
        assert!((summary.average_point_cost - 4000.0).abs() < 1e-9);
        assert_eq!(summary.average_profit_impact, Some(15.0));
        assert_eq!(summary.max_profit_impact, Some(20.0));
    }

    #[test]
    fn test_summary_total_saturates() {
        let set = ResultSet::new(
            vec![result(1e17, u64::MAX, None), result(1e17, u64::MAX, None)],
            ProgramConfig::default(),
        );
        let summary = set.summary();
        assert_eq!(summary.total_point_cost, u64::MAX);
        assert_eq!(summary.average_point_cost, u64::MAX as f64 / 2.0);
    }

    #[test]
    fn test_summary_of_empty_set() {
        let summary = ResultSet::new(Vec::new(), ProgramConfig::default()).summary();
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.average_point_cost, 0.0);
        assert_eq!(summary.average_profit_impact, None);
    }
}
