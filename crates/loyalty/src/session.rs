//! Session store: owns the current configuration, catalog, tiers, and
//! results, and replaces each collection wholesale on every operation.

use chrono::{DateTime, Duration, Utc};
use rewards_core::{
    AppConfig, ProgramConfig, ResultSet, RewardsError, RewardsResult, Tier, TierConfig,
    TierPointsRow,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculator::RewardCalculator;
use crate::catalog::Catalog;
use crate::tiers::{TierGenerator, TierSet};

/// Informational message for the user. Raised for recoverable conditions
/// that leave the session unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    NoIncludedItems,
    NoTiers,
    InvalidConfiguration,
    NotFound,
    SessionExpired,
}

pub struct RewardsSession {
    id: Uuid,
    initial_program: ProgramConfig,
    program: ProgramConfig,
    tier_config: TierConfig,
    ttl: Duration,
    catalog: Catalog,
    tiers: TierSet,
    results: Option<ResultSet>,
    notices: Vec<Notice>,
    started_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl RewardsSession {
    pub fn new(config: &AppConfig) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        info!(
            session_id = %id,
            points_per_dollar = config.program.points_per_dollar,
            payback_rate = config.program.payback_rate,
            cogs_margin = config.program.cogs_margin,
            tier_count = config.tiers.tier_count,
            "Rewards session started"
        );
        Self {
            id,
            initial_program: config.program,
            program: config.program,
            tier_config: config.tiers.clone(),
            ttl: Duration::minutes(config.session.ttl_minutes),
            catalog: Catalog::default(),
            tiers: TierSet::empty(config.tiers.naming),
            results: None,
            notices: Vec::new(),
            started_at: now,
            last_activity: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn program(&self) -> &ProgramConfig {
        &self.program
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tiers(&self) -> &TierSet {
        &self.tiers
    }

    /// Results of the last successful calculation, if any.
    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    // ─── Catalog ────────────────────────────────────────────────────────────

    /// Replace the catalog. Tiers and results built from the old catalog are
    /// discarded.
    pub fn load_catalog(&mut self, catalog: Catalog) {
        self.touch();
        info!(items = catalog.len(), "Catalog replaced");
        self.catalog = catalog;
        self.tiers = TierSet::empty(self.tier_config.naming);
        self.results = None;
    }

    pub fn toggle_item(&mut self, id: &Uuid) -> RewardsResult<bool> {
        self.touch();
        let result = self.catalog.toggle(id);
        self.record(result)
    }

    // ─── Configuration ──────────────────────────────────────────────────────

    /// Apply new program economics. Tier costs are recomputed (manual
    /// overrides kept); results stay as they are until the next calculation.
    pub fn update_config(&mut self, program: ProgramConfig) -> RewardsResult<()> {
        self.touch();
        if let Err(e) = program.validate() {
            return self.record(Err(e));
        }
        self.program = program;
        self.tiers.apply_config(&self.program);
        Ok(())
    }

    // ─── Tiers ──────────────────────────────────────────────────────────────

    /// Regenerate tiers from the included items. Drops every manual override.
    pub fn generate_tiers(&mut self) -> &TierSet {
        self.touch();
        self.tiers = TierGenerator::new(&self.program, &self.tier_config).generate(&self.catalog);
        &self.tiers
    }

    pub fn set_tier_point_cost(&mut self, tier_id: u8, points: u64) -> RewardsResult<Tier> {
        self.touch();
        let result = self.tiers.set_point_cost(tier_id, points).cloned();
        self.record(result)
    }

    pub fn set_tier_point_cost_input(&mut self, tier_id: u8, raw: &str) -> RewardsResult<Tier> {
        self.touch();
        let result = self.tiers.set_point_cost_input(tier_id, raw).cloned();
        self.record(result)
    }

    // ─── Calculation ────────────────────────────────────────────────────────

    /// Run the per-item calculation. On an empty catalog or tier set the
    /// previous results are kept and a notice is raised.
    pub fn calculate(&mut self) -> RewardsResult<&ResultSet> {
        self.touch();
        let outcome = RewardCalculator::new(&self.program).calculate(&self.catalog, &self.tiers);
        match outcome {
            Ok(set) => Ok(&*self.results.insert(set)),
            Err(e) => Err(self.raise(e)),
        }
    }

    /// Figures from each tier's current point cost, reflecting manual edits.
    pub fn tier_points_view(&mut self) -> RewardsResult<Vec<TierPointsRow>> {
        self.touch();
        let outcome =
            RewardCalculator::new(&self.program).calculate_tier_points(&self.catalog, &self.tiers);
        self.record(outcome)
    }

    // ─── Notices ────────────────────────────────────────────────────────────

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Clear everything back to a fresh session.
    pub fn reset(&mut self) {
        info!(session_id = %self.id, "Rewards session reset");
        self.program = self.initial_program;
        self.catalog = Catalog::default();
        self.tiers = TierSet::empty(self.tier_config.naming);
        self.results = None;
        self.notices.clear();
        self.last_activity = Utc::now();
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.last_activity > self.ttl
    }

    /// Reset the session if it has been idle longer than its ttl.
    /// Returns true when a reset happened.
    pub fn expire_if_idle(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_expired(now) {
            return false;
        }
        metrics::counter!("rewards.sessions_expired").increment(1);
        self.reset();
        self.push_notice(NoticeKind::SessionExpired, "Session expired, all data cleared".into());
        true
    }

    fn record<T>(&mut self, result: RewardsResult<T>) -> RewardsResult<T> {
        result.map_err(|e| self.raise(e))
    }

    fn raise(&mut self, err: RewardsError) -> RewardsError {
        let kind = match &err {
            RewardsError::NoIncludedItems => Some(NoticeKind::NoIncludedItems),
            RewardsError::NoTiers => Some(NoticeKind::NoTiers),
            RewardsError::InvalidConfiguration { .. } => Some(NoticeKind::InvalidConfiguration),
            RewardsError::TierNotFound(_) | RewardsError::ItemNotFound(_) => {
                Some(NoticeKind::NotFound)
            }
            _ => None,
        };
        if let Some(kind) = kind {
            self.push_notice(kind, err.to_string());
        }
        err
    }

    fn push_notice(&mut self, kind: NoticeKind, message: String) {
        warn!(session_id = %self.id, kind = ?kind, %message, "Notice raised");
        self.notices.push(Notice {
            kind,
            message,
            raised_at: Utc::now(),
        });
    }
}
