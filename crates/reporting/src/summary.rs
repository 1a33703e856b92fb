//! Tier summaries for display: price range, membership, and value per tier.

use rewards_core::Tier;
use rewards_loyalty::{Catalog, TierSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    pub id: u8,
    pub name: String,
    pub price_range: String,
    pub item_count: usize,
    pub total_value: f64,
    pub avg_price: f64,
    pub suggested_point_cost: u64,
    pub generated_point_cost: u64,
    pub overridden: bool,
}

pub fn format_price_range(tier: &Tier, is_last: bool) -> String {
    if is_last {
        format!("${:.2}+", tier.min_price)
    } else {
        format!("${:.2} - ${:.2}", tier.min_price, tier.max_price)
    }
}

/// Summaries built from the catalog's current inclusion state, so toggling an
/// item after generation shows up in the counts.
pub fn tier_summaries(tiers: &TierSet, catalog: &Catalog) -> Vec<TierSummary> {
    let mut counts = vec![0usize; tiers.len()];
    let mut totals = vec![0f64; tiers.len()];
    for item in catalog.included() {
        let Some(tier) = tiers.tier_for_price(item.retail_price) else {
            continue;
        };
        if let Some(pos) = tiers.tiers().iter().position(|t| t.id == tier.id) {
            counts[pos] += 1;
            totals[pos] += item.retail_price;
        }
    }

    let last = tiers.len().saturating_sub(1);
    tiers
        .tiers()
        .iter()
        .enumerate()
        .map(|(i, tier)| TierSummary {
            id: tier.id,
            name: tier.name.clone(),
            price_range: format_price_range(tier, i == last),
            item_count: counts[i],
            total_value: totals[i],
            avg_price: if counts[i] > 0 {
                totals[i] / counts[i] as f64
            } else {
                0.0
            },
            suggested_point_cost: tier.suggested_point_cost,
            generated_point_cost: tier.generated_point_cost,
            overridden: tier.overridden,
        })
        .collect()
}

/// Fixed-width text table for terminal output.
pub fn render_table(summaries: &[TierSummary]) -> String {
    let mut out = format!(
        "{:<4} {:<18} {:<20} {:>6} {:>12} {:>12} {:>10}\n",
        "ID", "Name", "Price Range", "Items", "Total Value", "Points", "Edited"
    );
    for s in summaries {
        out.push_str(&format!(
            "{:<4} {:<18} {:<20} {:>6} {:>12.2} {:>12} {:>10}\n",
            s.id,
            s.name,
            s.price_range,
            s.item_count,
            s.total_value,
            s.suggested_point_cost,
            if s.overridden { "yes" } else { "no" }
        ));
    }
    out
}
