use std::sync::Arc;

use crate::config::Config;
use crate::services::{RecommendationService, RemoteRecommender, StrategySelector};

/// Shared application state
///
/// Holds no mutable data itself: each strategy lane guards its own state.
#[derive(Clone)]
pub struct AppState {
    pub selector: Arc<StrategySelector>,
}

impl AppState {
    /// Creates state backed by the given recommendation service
    pub fn new(service: Arc<dyn RecommendationService>, config: &Config) -> Self {
        Self {
            selector: Arc::new(StrategySelector::new(service, config)),
        }
    }

    /// Creates state talking to the remote service named in the config
    pub fn from_config(config: &Config) -> Self {
        let service = RemoteRecommender::new(config.recommender_url.clone());
        Self::new(Arc::new(service), config)
    }
}
