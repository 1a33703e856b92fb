//! Manual overrides of a tier's suggested point cost.

use rewards_core::{RewardsError, RewardsResult, Tier};
use tracing::info;

use crate::tiers::{tier_label, TierSet};

/// Coerce free-form user input into a point cost. Anything that is not a
/// non-negative finite number becomes 0.
pub fn parse_point_cost_input(raw: &str) -> u64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v.round() as u64,
        _ => 0,
    }
}

impl TierSet {
    /// Replace one tier's suggested point cost. Ranges, order, and every other
    /// field stay as they are.
    pub fn set_point_cost(&mut self, tier_id: u8, points: u64) -> RewardsResult<&Tier> {
        let tier = self
            .tiers
            .iter_mut()
            .find(|t| t.id == tier_id)
            .ok_or(RewardsError::TierNotFound(tier_id))?;

        tier.suggested_point_cost = points;
        tier.overridden = true;

        metrics::counter!("rewards.tier_overrides").increment(1);
        info!(
            tier_id,
            points,
            generated = tier.generated_point_cost,
            "Tier point cost overridden"
        );
        Ok(&*tier)
    }

    pub fn set_point_cost_input(&mut self, tier_id: u8, raw: &str) -> RewardsResult<&Tier> {
        self.set_point_cost(tier_id, parse_point_cost_input(raw))
    }

    /// Drop every manual override, restoring generated point costs and the
    /// labels derived from them.
    pub fn reset_overrides(&mut self) {
        let naming = self.naming();
        for (index, tier) in self.tiers.iter_mut().enumerate() {
            if !tier.overridden {
                continue;
            }
            tier.suggested_point_cost = tier.generated_point_cost;
            tier.name = tier_label(naming, index, tier.generated_point_cost);
            tier.overridden = false;
        }
    }

    pub fn overridden(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter().filter(|t| t.overridden)
    }
}
