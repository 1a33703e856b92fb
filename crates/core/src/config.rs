use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RewardsError, RewardsResult};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `REWARDS_CALCULATOR__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub program: ProgramConfig,
    #[serde(default)]
    pub tiers: TierConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

// ─── Program Economics ──────────────────────────────────────────────────────

/// The three economic parameters every tier and reward figure derives from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Points a customer earns per dollar spent.
    #[serde(default = "default_points_per_dollar")]
    pub points_per_dollar: f64,
    /// Percentage of customer spend returned as point value, in (0, 100].
    #[serde(default = "default_payback_rate")]
    pub payback_rate: f64,
    /// Cost-of-goods percentage of customer spend, in [0, 100].
    #[serde(default = "default_cogs_margin")]
    pub cogs_margin: f64,
}

fn default_points_per_dollar() -> f64 {
    100.0
}
fn default_payback_rate() -> f64 {
    5.0
}
fn default_cogs_margin() -> f64 {
    30.0
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            points_per_dollar: default_points_per_dollar(),
            payback_rate: default_payback_rate(),
            cogs_margin: default_cogs_margin(),
        }
    }
}

impl ProgramConfig {
    /// Build a validated configuration.
    pub fn new(points_per_dollar: f64, payback_rate: f64, cogs_margin: f64) -> RewardsResult<Self> {
        let config = Self {
            points_per_dollar,
            payback_rate,
            cogs_margin,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make downstream math divide by zero or
    /// produce non-finite figures.
    pub fn validate(&self) -> RewardsResult<()> {
        if !self.points_per_dollar.is_finite() || self.points_per_dollar <= 0.0 {
            return Err(invalid(
                "points_per_dollar",
                format!("must be greater than 0, got {}", self.points_per_dollar),
            ));
        }
        if !self.payback_rate.is_finite() || self.payback_rate <= 0.0 || self.payback_rate > 100.0 {
            return Err(invalid(
                "payback_rate",
                format!("must be within (0, 100], got {}", self.payback_rate),
            ));
        }
        if !self.cogs_margin.is_finite() || !(0.0..=100.0).contains(&self.cogs_margin) {
            return Err(invalid(
                "cogs_margin",
                format!("must be within [0, 100], got {}", self.cogs_margin),
            ));
        }
        Ok(())
    }

    /// Payback rate as a fraction of spend.
    pub fn payback_fraction(&self) -> f64 {
        self.payback_rate / 100.0
    }

    /// Share of customer spend left after cost of goods.
    pub fn profit_fraction(&self) -> f64 {
        (100.0 - self.cogs_margin) / 100.0
    }
}

fn invalid(field: &'static str, reason: String) -> RewardsError {
    RewardsError::InvalidConfiguration { field, reason }
}

// ─── Tier Generation ────────────────────────────────────────────────────────

/// How generated tiers are labelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierNaming {
    /// "20,000 Points", from the nice-rounded suggested point cost.
    #[default]
    PointCost,
    /// "Tier 1", "Tier 2", ...
    Sequential,
}

/// Tier ids are `u8`, so a tier set holds at most 256 tiers.
pub const MAX_TIER_COUNT: usize = u8::MAX as usize + 1;

#[derive(Debug, Clone, Deserialize)]
pub struct TierConfig {
    #[serde(default = "default_tier_count")]
    pub tier_count: usize,
    #[serde(default)]
    pub naming: TierNaming,
}

fn default_tier_count() -> usize {
    5
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            tier_count: default_tier_count(),
            naming: TierNaming::default(),
        }
    }
}

// ─── Session ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle minutes before the session is cleared.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
}

fn default_ttl_minutes() -> i64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional file and environment variables,
    /// then validate the program economics.
    pub fn load(path: Option<&str>) -> RewardsResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("REWARDS_CALCULATOR")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: AppConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        debug!(
            file = ?path,
            points_per_dollar = loaded.program.points_per_dollar,
            payback_rate = loaded.program.payback_rate,
            cogs_margin = loaded.program.cogs_margin,
            "Configuration loaded"
        );
        Ok(loaded)
    }

    pub fn validate(&self) -> RewardsResult<()> {
        self.program.validate()?;
        if self.tiers.tier_count == 0 || self.tiers.tier_count > MAX_TIER_COUNT {
            return Err(invalid(
                "tier_count",
                format!(
                    "must be within [1, {}], got {}",
                    MAX_TIER_COUNT, self.tiers.tier_count
                ),
            ));
        }
        if self.session.ttl_minutes <= 0 {
            return Err(invalid("ttl_minutes", "must be positive".into()));
        }
        Ok(())
    }
}
