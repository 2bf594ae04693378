/// HTTP client for the remote recommendation engine
///
/// Endpoints (all `POST`, JSON in and out):
/// 1. `/recommend`: books → recommendations (popular books when none are given)
/// 2. `/recommend_by_demographics`: age range + country → recommendations
/// 3. `/recommend_new_user`: books → recommendations (400 when none are given)
///
/// Every successful body must carry a `recommendations` array of objects;
/// anything else is a failure, never an empty success.
use crate::{
    error::RecommendationError,
    models::{
        BookRecord, CuratedRequest, DefaultRequest, DemographicRequest, RecommendationResult,
    },
    services::providers::{RecommendationOutcome, RecommendationService},
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Serialize;
use serde_json::Value;

const DEFAULT_PATH: &str = "/recommend";
const DEMOGRAPHIC_PATH: &str = "/recommend_by_demographics";
const CURATED_PATH: &str = "/recommend_new_user";

#[derive(Clone)]
pub struct RemoteRecommender {
    http_client: HttpClient,
    api_url: String,
}

impl RemoteRecommender {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(HttpClient::new(), api_url)
    }

    pub fn with_client(http_client: HttpClient, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            api_url,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> RecommendationOutcome {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, endpoint = %path, "Recommendation request failed");
                RecommendationError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                endpoint = %path,
                status = %status,
                body = %body,
                "Recommendation service returned an error status"
            );
            return Err(RecommendationError::Status {
                status: status.as_u16(),
                message: status_message(status, &body),
            });
        }

        let text = response.text().await?;
        let payload: Value = serde_json::from_str(&text).map_err(|e| {
            RecommendationError::MalformedResponse(format!("body is not valid JSON: {}", e))
        })?;
        let result = parse_recommendations(payload)?;

        tracing::info!(
            endpoint = %path,
            results = result.books.len(),
            fallback = result.message.is_some(),
            "Recommendations received"
        );

        Ok(result)
    }
}

#[async_trait::async_trait]
impl RecommendationService for RemoteRecommender {
    async fn fetch_default(&self, request: &DefaultRequest) -> RecommendationOutcome {
        tracing::debug!(
            books = request.books.len(),
            top_k = request.top_k,
            "Requesting default recommendations"
        );
        self.post(DEFAULT_PATH, request).await
    }

    async fn fetch_demographic(&self, request: &DemographicRequest) -> RecommendationOutcome {
        tracing::debug!(
            age_range = ?request.age_range,
            country = %request.country,
            top_k = request.top_k,
            "Requesting demographic recommendations"
        );
        self.post(DEMOGRAPHIC_PATH, request).await
    }

    async fn fetch_curated(&self, request: &CuratedRequest) -> RecommendationOutcome {
        tracing::debug!(
            books = request.books.len(),
            top_k = request.top_k,
            "Requesting curated recommendations"
        );
        self.post(CURATED_PATH, request).await
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Extracts the result set from a 2xx body
///
/// `recommendations` must be an array whose every element is an object.
/// The records are kept as-is, in order.
pub fn parse_recommendations(payload: Value) -> Result<RecommendationResult, RecommendationError> {
    let Value::Object(mut body) = payload else {
        return Err(RecommendationError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    let Some(recommendations) = body.remove("recommendations") else {
        let detail = match body.get("error").and_then(Value::as_str) {
            Some(error) => format!("missing `recommendations` field ({})", error),
            None => "missing `recommendations` field".to_string(),
        };
        return Err(RecommendationError::MalformedResponse(detail));
    };

    let Value::Array(entries) = recommendations else {
        return Err(RecommendationError::MalformedResponse(
            "`recommendations` is not an array".to_string(),
        ));
    };

    let books = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(fields) => Ok(BookRecord::new(fields)),
            other => Err(RecommendationError::MalformedResponse(format!(
                "recommendation {} is not an object: {}",
                index, other
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(RecommendationResult { books, message })
}

/// Human-readable message for a non-2xx response
///
/// Prefers the service's own `{"error": "..."}` text, then the raw body,
/// then the canonical status reason.
fn status_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        if let Some(error) = fields.get("error").and_then(Value::as_str) {
            return error.to_string();
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
