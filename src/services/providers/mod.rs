/// Recommendation service abstraction
///
/// The remote engine is opaque to this crate: ranking, collaborative filtering
/// and the popularity fallback all happen behind this trait. `remote` talks to
/// it over HTTP; tests substitute mocks.
use crate::{
    error::RecommendationError,
    models::{
        CuratedRequest, DefaultRequest, DemographicRequest, RecommendationRequest,
        RecommendationResult,
    },
};

pub mod remote;

pub use remote::RemoteRecommender;

pub type RecommendationOutcome = Result<RecommendationResult, RecommendationError>;

/// Trait for recommendation backends
///
/// Every call is a single, independent request/response exchange. No retry,
/// timeout or caching happens at this layer; the lifecycle controller above
/// decides whether to call again.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationService: Send + Sync {
    /// Recommendations from a list of books; an empty list yields popular books
    async fn fetch_default(&self, request: &DefaultRequest) -> RecommendationOutcome;

    /// Recommendations for readers matching an age range and country
    async fn fetch_demographic(&self, request: &DemographicRequest) -> RecommendationOutcome;

    /// Recommendations for a new user from the books they picked
    async fn fetch_curated(&self, request: &CuratedRequest) -> RecommendationOutcome;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Routes a built request to the matching service call
pub async fn dispatch(
    service: &dyn RecommendationService,
    request: &RecommendationRequest,
) -> RecommendationOutcome {
    tracing::debug!(strategy = %request.strategy(), "Dispatching recommendation request");

    match request {
        RecommendationRequest::Default(body) => service.fetch_default(body).await,
        RecommendationRequest::Demographic(body) => service.fetch_demographic(body).await,
        RecommendationRequest::Curated(body) => service.fetch_curated(body).await,
    }
}
