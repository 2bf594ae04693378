//! Translates a strategy's current input into a request for the remote service.
//!
//! Every function here is total: inputs are already sanitized by the
//! collector and filter, so building cannot fail.

use crate::models::{
    CuratedRequest, DefaultRequest, DemographicFilter, DemographicRequest, PreferenceItem,
    RecommendationRequest,
};
use crate::services::strategy::StrategyInput;

/// An empty item list is valid: the service answers it with popular books.
pub fn build_default(items: &[PreferenceItem], limit: u32) -> RecommendationRequest {
    RecommendationRequest::Default(DefaultRequest {
        books: project_values(items),
        top_k: limit,
    })
}

pub fn build_demographic(filter: &DemographicFilter, limit: u32) -> RecommendationRequest {
    RecommendationRequest::Demographic(DemographicRequest {
        age_range: filter.age_range(),
        country: filter.country().to_string(),
        top_k: limit,
    })
}

pub fn build_curated(items: &[PreferenceItem], limit: u32) -> RecommendationRequest {
    RecommendationRequest::Curated(CuratedRequest {
        books: project_values(items),
        top_k: limit,
    })
}

/// Builds the request matching a lane's input
pub fn build(input: &StrategyInput, limit: u32) -> RecommendationRequest {
    match input {
        StrategyInput::Default(collector) => build_default(collector.list(), limit),
        StrategyInput::Demographic(filter) => build_demographic(filter, limit),
        StrategyInput::Curated(collector) => build_curated(collector.list(), limit),
    }
}

fn project_values(items: &[PreferenceItem]) -> Vec<String> {
    items.iter().map(|item| item.value.clone()).collect()
}
