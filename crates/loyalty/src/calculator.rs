//! Reward economics: assigns each included item to a tier and computes the
//! customer spend, point cost, and profit impact of redeeming it.
//!
//! Profit on spend is `spend * (100 - cogs_margin) / 100` in both lenses.

use rewards_core::{
    ProgramConfig, ResultSet, RewardResult, RewardsError, RewardsResult, Tier, TierPointsRow,
};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::tiers::TierSet;

/// Dollars a customer must spend to earn back `price` at `payback_rate` percent.
pub fn customer_spend_for(price: f64, payback_rate: f64) -> f64 {
    price / (payback_rate / 100.0)
}

/// Whole points needed to redeem an item priced at `price`.
pub fn points_for_price(price: f64, payback_rate: f64, points_per_dollar: f64) -> u64 {
    let points = (customer_spend_for(price, payback_rate) * points_per_dollar).round();
    if points.is_finite() && points > 0.0 {
        points as u64
    } else {
        0
    }
}

/// Reward cost as a percentage of profit. `None` when there is no profit to
/// measure against.
pub fn profit_impact(cost: f64, profit: f64) -> Option<f64> {
    if profit > 0.0 {
        Some(cost / profit * 100.0)
    } else {
        None
    }
}

/// Stateless computation over a catalog and tier set.
pub struct RewardCalculator {
    config: ProgramConfig,
}

impl RewardCalculator {
    pub fn new(config: &ProgramConfig) -> Self {
        Self { config: *config }
    }

    /// Per-item lens: point cost derived from each item's own retail price
    /// at its tier's payback rate. Sorted ascending by point cost; equal
    /// costs keep catalog order.
    pub fn calculate(&self, catalog: &Catalog, tiers: &TierSet) -> RewardsResult<ResultSet> {
        self.check_preconditions(catalog, tiers)?;

        let mut results = Vec::with_capacity(catalog.included_count());
        for item in catalog.included() {
            let Some(tier) = tiers.tier_for_price(item.retail_price) else {
                return Err(RewardsError::NoTiers);
            };
            results.push(self.price_item(item.id, &item.name, item.retail_price, tier));
        }
        results.sort_by_key(|r| r.point_cost);

        metrics::counter!("rewards.calculations").increment(1);
        info!(items = results.len(), tiers = tiers.len(), "Rewards calculated");

        Ok(ResultSet::new(results, self.config))
    }

    /// Tier lens: figures derived from each tier's current point cost, so
    /// manual edits show up without regenerating tiers.
    pub fn calculate_tier_points(
        &self,
        catalog: &Catalog,
        tiers: &TierSet,
    ) -> RewardsResult<Vec<TierPointsRow>> {
        self.check_preconditions(catalog, tiers)?;

        let mut rows = Vec::with_capacity(catalog.included_count());
        for item in catalog.included() {
            let Some(tier) = tiers.tier_for_price(item.retail_price) else {
                return Err(RewardsError::NoTiers);
            };
            let customer_spend = tier.suggested_point_cost as f64 / self.config.points_per_dollar;
            let profit_from_spend = customer_spend * self.config.profit_fraction();

            rows.push(TierPointsRow {
                item_id: item.id,
                name: item.name.clone(),
                retail_price: item.retail_price,
                tier_id: tier.id,
                tier: tier.name.clone(),
                tier_point_cost: tier.suggested_point_cost,
                tier_payback: tier.payback_rate,
                overridden: tier.overridden,
                customer_spend,
                profit_from_spend,
                profit_impact: profit_impact(item.retail_price, profit_from_spend),
            });
        }
        rows.sort_by_key(|r| r.tier_point_cost);

        debug!(items = rows.len(), "Tier point view computed");
        Ok(rows)
    }

    fn price_item(&self, item_id: uuid::Uuid, name: &str, retail_price: f64, tier: &Tier) -> RewardResult {
        let customer_spend_required = customer_spend_for(retail_price, tier.payback_rate);
        let point_cost =
            points_for_price(retail_price, tier.payback_rate, self.config.points_per_dollar);
        let profit_from_spend = customer_spend_required * self.config.profit_fraction();
        let effective_cost = retail_price;

        RewardResult {
            item_id,
            name: name.to_string(),
            retail_price,
            tier_id: tier.id,
            tier: tier.name.clone(),
            tier_suggested_cost: tier.suggested_point_cost,
            tier_payback: tier.payback_rate,
            point_cost,
            customer_spend_required,
            profit_from_spend,
            effective_cost,
            profit_impact: profit_impact(effective_cost, profit_from_spend),
        }
    }

    fn check_preconditions(&self, catalog: &Catalog, tiers: &TierSet) -> RewardsResult<()> {
        if catalog.included_count() == 0 {
            warn!("No items included, calculation skipped");
            return Err(RewardsError::NoIncludedItems);
        }
        if tiers.is_empty() {
            warn!("No tiers generated, calculation skipped");
            return Err(RewardsError::NoTiers);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::TierGenerator;
    use rewards_core::{TierConfig, TierNaming};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn config(ppd: f64, payback: f64, cogs: f64) -> ProgramConfig {
        ProgramConfig::new(ppd, payback, cogs).unwrap()
    }

    fn setup(prices: &[f64], program: &ProgramConfig) -> (Catalog, TierSet) {
        let catalog = Catalog::from_entries(
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| (format!("item-{i}"), *p)),
        );
        let tiers = TierGenerator::new(
            program,
            &TierConfig {
                tier_count: 5,
                naming: TierNaming::Sequential,
            },
        )
        .generate(&catalog);
        (catalog, tiers)
    }

    #[test]
    fn test_point_cost_example() {
        // $3.50 at 7% payback -> $50 spend -> 5000 points
        let program = config(100.0, 7.0, 30.0);
        let (catalog, tiers) = setup(&[3.50], &program);
        let set = RewardCalculator::new(&program).calculate(&catalog, &tiers).unwrap();

        let r = &set.results[0];
        assert!(approx(r.customer_spend_required, 50.0));
        assert_eq!(r.point_cost, 5000);
        assert!(approx(r.profit_from_spend, 35.0));
        assert!(approx(r.effective_cost, 3.50));
        assert!(approx(r.profit_impact.unwrap(), 10.0));
    }

    #[test]
    fn test_point_cost_formula_holds() {
        let program = config(37.0, 3.3, 45.0);
        let prices = [0.99, 4.25, 19.99, 250.0, 1234.56, 7.0];
        let (catalog, tiers) = setup(&prices, &program);
        let set = RewardCalculator::new(&program).calculate(&catalog, &tiers).unwrap();

        for r in &set.results {
            let expected = ((r.retail_price / (3.3 / 100.0)) * 37.0).round() as u64;
            assert_eq!(r.point_cost, expected);
        }
    }

    #[test]
    fn test_results_sorted_stable() {
        let program = config(100.0, 5.0, 30.0);
        let catalog = Catalog::from_entries(vec![
            ("big", 9.0),
            ("twin-a", 2.0),
            ("small", 1.0),
            ("twin-b", 2.0),
        ]);
        let tiers = TierGenerator::new(&program, &TierConfig::default()).generate(&catalog);
        let set = RewardCalculator::new(&program).calculate(&catalog, &tiers).unwrap();

        let names: Vec<&str> = set.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["small", "twin-a", "twin-b", "big"]);
    }

    #[test]
    fn test_every_item_assigned_once() {
        let program = config(100.0, 5.0, 30.0);
        let prices: Vec<f64> = (0..37).map(|i| 1.0 + (i * 7 % 23) as f64).collect();
        let (catalog, tiers) = setup(&prices, &program);
        let set = RewardCalculator::new(&program).calculate(&catalog, &tiers).unwrap();

        assert_eq!(set.len(), catalog.included_count());
        let mut ids: Vec<_> = set.results.iter().map(|r| r.item_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), prices.len());
        for r in &set.results {
            let tier = tiers.get(r.tier_id).unwrap();
            let last = r.tier_id as usize == tiers.len() - 1;
            assert!(tier.contains(r.retail_price, last));
        }
    }

    #[test]
    fn test_recalculation_is_idempotent() {
        let program = config(100.0, 5.0, 30.0);
        let (catalog, tiers) = setup(&[1.0, 4.0, 9.0, 16.0, 25.0, 36.0], &program);
        let calc = RewardCalculator::new(&program);
        let first = calc.calculate(&catalog, &tiers).unwrap();
        let second = calc.calculate(&catalog, &tiers).unwrap();
        assert_eq!(first.results, second.results);
    }

    #[test]
    fn test_empty_preconditions() {
        let program = config(100.0, 5.0, 30.0);
        let calc = RewardCalculator::new(&program);

        let (mut catalog, tiers) = setup(&[1.0, 2.0], &program);
        let err = calc.calculate(&catalog, &TierSet::default()).unwrap_err();
        assert!(matches!(err, RewardsError::NoTiers));

        catalog.exclude_all();
        let err = calc.calculate(&catalog, &tiers).unwrap_err();
        assert!(matches!(err, RewardsError::NoIncludedItems));
        let err = calc.calculate_tier_points(&catalog, &tiers).unwrap_err();
        assert!(matches!(err, RewardsError::NoIncludedItems));
    }

    #[test]
    fn test_full_cogs_has_no_profit_impact() {
        let program = config(100.0, 5.0, 100.0);
        let (catalog, tiers) = setup(&[5.0], &program);
        let set = RewardCalculator::new(&program).calculate(&catalog, &tiers).unwrap();
        assert_eq!(set.results[0].profit_from_spend, 0.0);
        assert_eq!(set.results[0].profit_impact, None);
    }

    #[test]
    fn test_tier_points_reflect_manual_edit() {
        let program = config(100.0, 5.0, 30.0);
        let (catalog, mut tiers) = setup(&[6.0], &program);
        tiers.set_point_cost(0, 3000).unwrap();

        let rows = RewardCalculator::new(&program)
            .calculate_tier_points(&catalog, &tiers)
            .unwrap();
        let row = &rows[0];
        assert_eq!(row.tier_point_cost, 3000);
        assert!(row.overridden);
        assert!(approx(row.customer_spend, 30.0));
        assert!(approx(row.profit_from_spend, 21.0));
        assert!(approx(row.profit_impact.unwrap(), 6.0 / 21.0 * 100.0));
    }

    #[test]
    fn test_per_item_ignores_manual_edit() {
        let program = config(100.0, 5.0, 30.0);
        let (catalog, mut tiers) = setup(&[6.0], &program);
        tiers.set_point_cost(0, 3000).unwrap();

        let set = RewardCalculator::new(&program).calculate(&catalog, &tiers).unwrap();
        assert_eq!(set.results[0].point_cost, 12_000);
        assert_eq!(set.results[0].tier_suggested_cost, 3000);
        assert_eq!(tiers.get(0).unwrap().suggested_point_cost, 3000);
    }

    #[test]
    fn test_points_for_zero_price() {
        assert_eq!(points_for_price(0.0, 5.0, 100.0), 0);
        assert_eq!(profit_impact(0.0, 0.0), None);
    }
}
