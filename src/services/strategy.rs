use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, RecommendationError},
    models::{
        DemographicFilter, PreferenceCollector, PreferenceItem, RecommendationRequest,
        RequestState, StrategyId,
    },
    services::{
        lifecycle::{LifecycleController, Ticket},
        providers::{self, RecommendationService},
        request_builder,
    },
};

/// What a strategy collects from the user before submitting
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyInput {
    Default(PreferenceCollector),
    Demographic(DemographicFilter),
    Curated(PreferenceCollector),
}

impl StrategyInput {
    fn collector(&self, strategy: StrategyId) -> AppResult<&PreferenceCollector> {
        match self {
            StrategyInput::Default(collector) | StrategyInput::Curated(collector) => Ok(collector),
            StrategyInput::Demographic(_) => Err(no_collector(strategy)),
        }
    }

    fn collector_mut(&mut self, strategy: StrategyId) -> AppResult<&mut PreferenceCollector> {
        match self {
            StrategyInput::Default(collector) | StrategyInput::Curated(collector) => Ok(collector),
            StrategyInput::Demographic(_) => Err(no_collector(strategy)),
        }
    }
}

fn no_collector(strategy: StrategyId) -> AppError {
    AppError::InvalidInput(format!("Strategy {} does not collect books", strategy))
}

/// Point-in-time copy of a lane, for rendering
#[derive(Debug, Clone, Serialize)]
pub struct LaneSnapshot {
    pub strategy: StrategyId,
    pub state: RequestState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PreferenceItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<DemographicFilter>,
}

/// A request that has been admitted but not yet sent
#[derive(Debug)]
pub struct Submission {
    ticket: Ticket,
    request: RecommendationRequest,
}

impl Submission {
    pub fn seq(&self) -> u64 {
        self.ticket.seq()
    }
}

struct LaneInner {
    input: StrategyInput,
    controller: LifecycleController,
}

/// One strategy's input and request lifecycle, owned exclusively
///
/// Lanes share nothing mutable with each other, so a request in flight on
/// one lane never blocks or disturbs another.
pub struct StrategyLane {
    strategy: StrategyId,
    limit: u32,
    service: Arc<dyn RecommendationService>,
    inner: RwLock<LaneInner>,
}

impl StrategyLane {
    pub fn new(
        input: StrategyInput,
        limit: u32,
        service: Arc<dyn RecommendationService>,
    ) -> Self {
        let strategy = match input {
            StrategyInput::Default(_) => StrategyId::Default,
            StrategyInput::Demographic(_) => StrategyId::Demographic,
            StrategyInput::Curated(_) => StrategyId::Curated,
        };

        Self {
            strategy,
            limit,
            service,
            inner: RwLock::new(LaneInner {
                input,
                controller: LifecycleController::new(),
            }),
        }
    }

    pub fn strategy(&self) -> StrategyId {
        self.strategy
    }

    pub async fn state(&self) -> RequestState {
        self.inner.read().await.controller.state().clone()
    }

    pub async fn snapshot(&self) -> LaneSnapshot {
        let inner = self.inner.read().await;
        let (items, filter) = match &inner.input {
            StrategyInput::Default(collector) | StrategyInput::Curated(collector) => {
                (Some(collector.list().to_vec()), None)
            }
            StrategyInput::Demographic(filter) => (None, Some(filter.clone())),
        };

        LaneSnapshot {
            strategy: self.strategy,
            state: inner.controller.state().clone(),
            items,
            filter,
        }
    }

    // Collector operations

    pub async fn add_item(&self, raw: &str) -> AppResult<Option<PreferenceItem>> {
        let mut inner = self.inner.write().await;
        Ok(inner.input.collector_mut(self.strategy)?.add(raw))
    }

    pub async fn remove_item(&self, id: Uuid) -> AppResult<Option<PreferenceItem>> {
        let mut inner = self.inner.write().await;
        Ok(inner.input.collector_mut(self.strategy)?.remove(id))
    }

    pub async fn clear_items(&self) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.input.collector_mut(self.strategy)?.clear();
        Ok(())
    }

    pub async fn items(&self) -> AppResult<Vec<PreferenceItem>> {
        let inner = self.inner.read().await;
        Ok(inner.input.collector(self.strategy)?.list().to_vec())
    }

    // Filter operations

    pub async fn set_filter(&self, filter: DemographicFilter) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match &mut inner.input {
            StrategyInput::Demographic(current) => {
                *current = filter;
                Ok(())
            }
            _ => Err(AppError::InvalidInput(format!(
                "Strategy {} has no demographic filter",
                self.strategy
            ))),
        }
    }

    // Submission

    /// Admits a submission and builds its request from the current input
    ///
    /// Returns `None` (and changes nothing) while a request is pending.
    pub async fn begin(&self) -> Option<Submission> {
        let mut inner = self.inner.write().await;

        let Some(ticket) = inner.controller.begin() else {
            tracing::debug!(
                strategy = %self.strategy,
                "Submission suppressed, request already pending"
            );
            return None;
        };

        let request = request_builder::build(&inner.input, self.limit);

        tracing::info!(
            strategy = %self.strategy,
            seq = ticket.seq(),
            service = self.service.name(),
            "Submitting recommendation request"
        );

        Some(Submission { ticket, request })
    }

    /// Sends an admitted submission and records the outcome
    ///
    /// The lock is not held while the request is in flight.
    pub async fn run(&self, submission: Submission) {
        let outcome = providers::dispatch(self.service.as_ref(), &submission.request).await;

        if let Err(e) = &outcome {
            tracing::warn!(
                strategy = %self.strategy,
                seq = submission.seq(),
                error = %e,
                "Recommendation request failed"
            );
        }

        let mut inner = self.inner.write().await;
        if inner.controller.complete(submission.ticket, outcome) {
            tracing::info!(
                strategy = %self.strategy,
                seq = submission.seq(),
                status = status_name(inner.controller.state()),
                "Recommendation request completed"
            );
        }
    }

    /// Submits and waits for the outcome; returns whether a request was sent
    pub async fn submit(&self) -> bool {
        match self.begin().await {
            Some(submission) => {
                self.run(submission).await;
                true
            }
            None => false,
        }
    }

    /// Submits without waiting; the lane is `Pending` when this returns `true`
    ///
    /// The request runs to completion on the runtime even if nobody is
    /// looking at this lane any more. If the request task dies without
    /// completing, its ticket is failed so the lane accepts submissions again.
    pub async fn submit_detached(self: &Arc<Self>) -> bool {
        let Some(submission) = self.begin().await else {
            return false;
        };

        let ticket = submission.ticket;
        let worker = Arc::clone(self);
        let handle = tokio::spawn(async move { worker.run(submission).await });

        let lane = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                lane.abandon(ticket, e.to_string()).await;
            }
        });

        true
    }

    async fn abandon(&self, ticket: Ticket, reason: String) {
        tracing::error!(
            strategy = %self.strategy,
            seq = ticket.seq(),
            reason = %reason,
            "Recommendation task ended without an outcome"
        );

        let mut inner = self.inner.write().await;
        inner
            .controller
            .complete(ticket, Err(RecommendationError::Interrupted(reason)));
    }
}

fn status_name(state: &RequestState) -> &'static str {
    match state {
        RequestState::Idle => "idle",
        RequestState::Pending { .. } => "pending",
        RequestState::Fulfilled { .. } => "fulfilled",
        RequestState::Failed { .. } => "failed",
    }
}
