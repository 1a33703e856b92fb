//! Tier generation: splits the included catalog into price quantiles and
//! derives a suggested point cost per tier from the program economics.

use rewards_core::{ProgramConfig, Tier, TierConfig, TierNaming, MAX_TIER_COUNT};
use tracing::{debug, info};

use crate::calculator::points_for_price;
use crate::catalog::Catalog;

/// Round a point cost to a figure that reads well on a reward menu.
pub fn nice_round(points: u64) -> u64 {
    let step = match points {
        p if p >= 10_000 => 5_000,
        p if p >= 5_000 => 1_000,
        p if p >= 1_000 => 500,
        p if p >= 500 => 100,
        _ => 50,
    };
    points.saturating_add(step / 2) / step * step
}

/// `12345` -> `"12,345"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn tier_label(naming: TierNaming, index: usize, point_cost: u64) -> String {
    match naming {
        TierNaming::PointCost => format!("{} Points", group_thousands(nice_round(point_cost))),
        TierNaming::Sequential => format!("Tier {}", index + 1),
    }
}

// ─── Tier Set ───────────────────────────────────────────────────────────────

/// The active tiers, ordered by ascending price range.
#[derive(Debug, Clone, Default)]
pub struct TierSet {
    pub(crate) tiers: Vec<Tier>,
    naming: TierNaming,
}

impl TierSet {
    pub fn empty(naming: TierNaming) -> Self {
        Self {
            tiers: Vec::new(),
            naming,
        }
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn get(&self, id: u8) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    pub fn naming(&self) -> TierNaming {
        self.naming
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tier for an item priced at `price`: the first tier whose range holds
    /// it, with the last tier open-ended. Prices outside every range fall
    /// back to the last tier.
    pub fn tier_for_price(&self, price: f64) -> Option<&Tier> {
        let last = self.tiers.len().checked_sub(1)?;
        let found = self
            .tiers
            .iter()
            .enumerate()
            .find(|(i, t)| t.contains(price, *i == last))
            .map(|(_, t)| t);
        if found.is_none() {
            debug!(price, "Price outside every tier range, using last tier");
        }
        found.or_else(|| self.tiers.last())
    }

    /// Re-derive tier economics after a configuration change. Every tier picks
    /// up the new payback rate and generated point cost; only tiers without a
    /// manual override take the new value as their suggested point cost.
    pub fn apply_config(&mut self, config: &ProgramConfig) {
        let naming = self.naming;
        let mut kept = 0usize;
        for (index, tier) in self.tiers.iter_mut().enumerate() {
            tier.payback_rate = config.payback_rate;
            tier.generated_point_cost =
                points_for_price(tier.avg_price, config.payback_rate, config.points_per_dollar);
            if tier.overridden {
                kept += 1;
                continue;
            }
            tier.suggested_point_cost = tier.generated_point_cost;
            tier.name = tier_label(naming, index, tier.suggested_point_cost);
        }
        info!(
            tiers = self.tiers.len(),
            overrides_kept = kept,
            payback_rate = config.payback_rate,
            points_per_dollar = config.points_per_dollar,
            "Tier costs recomputed"
        );
    }
}

/// Start index of each run of equal prices in a sorted slice.
fn price_runs(sorted: &[f64]) -> Vec<usize> {
    (0..sorted.len())
        .filter(|&i| i == 0 || sorted[i] != sorted[i - 1])
        .collect()
}

// ─── Generator ──────────────────────────────────────────────────────────────

/// Quantile tier generator.
pub struct TierGenerator {
    program: ProgramConfig,
    tiers: TierConfig,
}

impl TierGenerator {
    pub fn new(program: &ProgramConfig, tiers: &TierConfig) -> Self {
        Self {
            program: *program,
            tiers: tiers.clone(),
        }
    }

    /// Partition the catalog's included items into at most `tier_count`
    /// contiguous price groups. Group boundaries aim for `floor(i * n / k)`
    /// but never split a run of equal prices, so no two tiers share a price.
    /// With at least `tier_count` distinct prices every tier is non-empty.
    pub fn generate(&self, catalog: &Catalog) -> TierSet {
        let mut prices: Vec<f64> = catalog.included().map(|i| i.retail_price).collect();
        prices.sort_by(|a, b| a.total_cmp(b));

        let n = prices.len();
        let naming = self.tiers.naming;
        let runs = price_runs(&prices);
        let k = self.tiers.tier_count.min(runs.len()).min(MAX_TIER_COUNT);

        let mut tiers = Vec::with_capacity(k);
        let mut next_run = 0;
        for i in 0..k {
            let groups_after = k - i - 1;
            let target = (i + 1) * n / k;
            let start = runs[next_run];
            next_run += 1;
            while next_run < runs.len() - groups_after && runs[next_run] < target {
                next_run += 1;
            }
            let end = runs.get(next_run).copied().unwrap_or(n);
            tiers.push(self.build_tier(i, &prices[start..end], naming));
        }

        metrics::counter!("rewards.tiers_generated").increment(1);
        info!(items = n, tiers = tiers.len(), "Tiers generated");

        TierSet { tiers, naming }
    }

    fn build_tier(&self, index: usize, group: &[f64], naming: TierNaming) -> Tier {
        let total_value: f64 = group.iter().sum();
        let avg_price = total_value / group.len() as f64;
        let point_cost = points_for_price(
            avg_price,
            self.program.payback_rate,
            self.program.points_per_dollar,
        );

        Tier {
            id: index as u8,
            name: tier_label(naming, index, point_cost),
            min_price: group[0],
            max_price: group[group.len() - 1],
            avg_price,
            item_count: group.len(),
            total_value,
            payback_rate: self.program.payback_rate,
            suggested_point_cost: point_cost,
            generated_point_cost: point_cost,
            overridden: false,
        }
    }
}
