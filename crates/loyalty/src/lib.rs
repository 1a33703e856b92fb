//! Points-program engine: catalog handling, quantile tier generation, manual
//! tier overrides, and per-item reward economics.

pub mod calculator;
pub mod catalog;
pub mod editor;
pub mod ingest;
pub mod session;
pub mod tiers;

pub use calculator::RewardCalculator;
pub use catalog::Catalog;
pub use editor::parse_point_cost_input;
pub use ingest::{load_catalog, parse_price};
pub use session::{Notice, NoticeKind, RewardsSession};
pub use tiers::{nice_round, TierGenerator, TierSet};
