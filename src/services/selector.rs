use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{DemographicFilter, PreferenceCollector, StrategyId},
    services::{
        providers::RecommendationService,
        strategy::{StrategyInput, StrategyLane},
    },
};

/// Path segment that always resolves to the active strategy
pub const ACTIVE_ALIAS: &str = "active";

/// Top-level coordinator: one active strategy, three independent lanes
///
/// Switching only changes which lane is displayed. It never cancels, resets
/// or restarts a lane; an inactive lane keeps its input and its last
/// state, and a request it had in flight still lands in its own state.
pub struct StrategySelector {
    active: RwLock<StrategyId>,
    default: Arc<StrategyLane>,
    demographic: Arc<StrategyLane>,
    curated: Arc<StrategyLane>,
}

impl StrategySelector {
    /// Creates the three lanes around a shared, read-only service
    pub fn new(service: Arc<dyn RecommendationService>, config: &Config) -> Self {
        let filter = DemographicFilter::new(config.default_min_age, config.default_max_age, "");

        Self {
            active: RwLock::new(StrategyId::Default),
            default: Arc::new(StrategyLane::new(
                StrategyInput::Default(PreferenceCollector::new()),
                config.default_top_k,
                service.clone(),
            )),
            demographic: Arc::new(StrategyLane::new(
                StrategyInput::Demographic(filter),
                config.demographic_top_k,
                service.clone(),
            )),
            curated: Arc::new(StrategyLane::new(
                StrategyInput::Curated(PreferenceCollector::new()),
                config.curated_top_k,
                service,
            )),
        }
    }

    pub async fn active(&self) -> StrategyId {
        *self.active.read().await
    }

    /// Makes `strategy` the displayed one; returns whether anything changed
    pub async fn switch_to(&self, strategy: StrategyId) -> bool {
        let mut active = self.active.write().await;
        if *active == strategy {
            return false;
        }

        tracing::info!(from = %*active, to = %strategy, "Switching active strategy");
        *active = strategy;
        true
    }

    pub fn lane(&self, strategy: StrategyId) -> &Arc<StrategyLane> {
        match strategy {
            StrategyId::Default => &self.default,
            StrategyId::Demographic => &self.demographic,
            StrategyId::Curated => &self.curated,
        }
    }

    /// Parses a path segment, mapping `active` to the current strategy
    pub async fn resolve(&self, key: &str) -> AppResult<StrategyId> {
        if key == ACTIVE_ALIAS {
            return Ok(self.active().await);
        }
        key.parse()
    }

    /// Fails unless `strategy` is the active one
    ///
    /// Only the displayed strategy accepts input and submissions.
    pub async fn ensure_active(&self, strategy: StrategyId) -> AppResult<()> {
        if self.active().await == strategy {
            Ok(())
        } else {
            Err(AppError::InactiveStrategy(strategy))
        }
    }
}
