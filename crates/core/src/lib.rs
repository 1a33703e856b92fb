pub mod config;
pub mod error;
pub mod rewards;

pub use config::{
    AppConfig, ProgramConfig, SessionConfig, TierConfig, TierNaming, MAX_TIER_COUNT,
};
pub use error::{RewardsError, RewardsResult};
pub use rewards::{Item, ResultSet, ResultSummary, RewardResult, Tier, TierPointsRow};
