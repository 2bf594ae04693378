use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt::Display, str::FromStr};

use crate::error::{AppError, ErrorKind, RecommendationError};

pub mod demographic;
pub mod preference;

pub use demographic::DemographicFilter;
pub use preference::{PreferenceCollector, PreferenceItem};

/// One of the three independent recommendation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// Book-based, falling back to popularity when no books are given
    Default,
    /// Filtered by reader age range and country
    Demographic,
    /// Curated list for a new user; the service requires at least one book
    #[serde(alias = "new_user", alias = "newUser")]
    Curated,
}

impl StrategyId {
    pub const ALL: [StrategyId; 3] = [
        StrategyId::Default,
        StrategyId::Demographic,
        StrategyId::Curated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Default => "default",
            StrategyId::Demographic => "demographic",
            StrategyId::Curated => "curated",
        }
    }
}

impl Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(StrategyId::Default),
            "demographic" => Ok(StrategyId::Demographic),
            "curated" | "new_user" | "newUser" => Ok(StrategyId::Curated),
            other => Err(AppError::NotFound(format!("Unknown strategy: {}", other))),
        }
    }
}

// ============================================================================
// Remote Service Types
// ============================================================================

/// A book record as returned by the recommendation service
///
/// Passed through untouched; only the fields the display layer needs get
/// typed accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookRecord(Map<String, Value>);

impl BookRecord {
    pub const TITLE: &'static str = "Book-Title";
    pub const AUTHOR: &'static str = "Book-Author";
    pub const COVER_IMAGE_URL: &'static str = "Image-URL-M";
    pub const YEAR: &'static str = "Year-Of-Publication";

    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn title(&self) -> Option<&str> {
        self.text(Self::TITLE)
    }

    pub fn author(&self) -> Option<&str> {
        self.text(Self::AUTHOR)
    }

    pub fn cover_image_url(&self) -> Option<&str> {
        self.text(Self::COVER_IMAGE_URL)
    }

    pub fn year(&self) -> Option<&str> {
        self.text(Self::YEAR)
    }

    /// Any field, including ones the service adds that we know nothing about
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

/// Result set of one successful call, in the order the service returned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub books: Vec<BookRecord>,
    /// Optional notice from the service, e.g. that popular books were used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /recommend`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRequest {
    pub books: Vec<String>,
    pub top_k: u32,
}

/// Body of `POST /recommend_by_demographics`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicRequest {
    pub age_range: [u32; 2],
    pub country: String,
    pub top_k: u32,
}

/// Body of `POST /recommend_new_user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedRequest {
    pub books: Vec<String>,
    pub top_k: u32,
}

/// A request built fresh for one submission; never mutated afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationRequest {
    Default(DefaultRequest),
    Demographic(DemographicRequest),
    Curated(CuratedRequest),
}

impl RecommendationRequest {
    pub fn strategy(&self) -> StrategyId {
        match self {
            RecommendationRequest::Default(_) => StrategyId::Default,
            RecommendationRequest::Demographic(_) => StrategyId::Demographic,
            RecommendationRequest::Curated(_) => StrategyId::Curated,
        }
    }
}

// ============================================================================
// Request Lifecycle Types
// ============================================================================

/// What the presentation layer shows for a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&RecommendationError> for ErrorInfo {
    fn from(err: &RecommendationError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Progress of the latest request of one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    Pending {
        since: DateTime<Utc>,
    },
    Fulfilled {
        result: RecommendationResult,
        completed_at: DateTime<Utc>,
    },
    Failed {
        error: ErrorInfo,
        failed_at: DateTime<Utc>,
    },
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending { .. })
    }

    pub fn result(&self) -> Option<&RecommendationResult> {
        match self {
            RequestState::Fulfilled { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            RequestState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
