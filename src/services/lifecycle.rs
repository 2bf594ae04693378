//! Per-strategy request lifecycle: `Idle → Pending → Fulfilled | Failed`.
//!
//! At most one request is in flight per controller. Each submission gets a
//! sequence number; only the response carrying the latest one is applied.

use chrono::Utc;

use crate::models::{ErrorInfo, RequestState};
use crate::services::providers::RecommendationOutcome;

/// Proof that a submission was accepted; handed back on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct LifecycleController {
    state: RequestState,
    latest_seq: u64,
}

impl LifecycleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Enters `Pending` and issues a ticket
    ///
    /// Returns `None` while a request is already pending: overlapping
    /// submissions are rejected, not queued.
    pub fn begin(&mut self) -> Option<Ticket> {
        if self.state.is_pending() {
            return None;
        }

        self.latest_seq += 1;
        self.state = RequestState::Pending { since: Utc::now() };

        Some(Ticket {
            seq: self.latest_seq,
        })
    }

    /// Applies a response; returns `false` if it was stale and discarded
    ///
    /// Success replaces any earlier error, failure drops any earlier result.
    pub fn complete(&mut self, ticket: Ticket, outcome: RecommendationOutcome) -> bool {
        if ticket.seq != self.latest_seq || !self.state.is_pending() {
            tracing::debug!(
                ticket = ticket.seq,
                latest = self.latest_seq,
                "Discarding stale recommendation response"
            );
            return false;
        }

        self.state = match outcome {
            Ok(result) => RequestState::Fulfilled {
                result,
                completed_at: Utc::now(),
            },
            Err(err) => RequestState::Failed {
                error: ErrorInfo::from(&err),
                failed_at: Utc::now(),
            },
        };

        true
    }
}
