use axum::{
    extract::{FromRequest, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DemographicFilter, PreferenceItem, StrategyId};
use crate::services::{selector::ACTIVE_ALIAS, LaneSnapshot};

use super::AppState;

/// `Json` body extractor whose rejections render as `{ "error": ... }`
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SwitchStrategyRequest {
    pub strategy: StrategyId,
}

#[derive(Debug, Serialize)]
pub struct SwitchStrategyResponse {
    pub active: StrategyId,
    pub changed: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    /// `None` when the input was blank after normalization
    pub added: Option<PreferenceItem>,
    pub items: Vec<PreferenceItem>,
}

#[derive(Debug, Serialize)]
pub struct RemoveItemResponse {
    pub removed: Option<PreferenceItem>,
    pub items: Vec<PreferenceItem>,
}

#[derive(Debug, Serialize)]
pub struct StrategyView {
    pub active: bool,
    #[serde(flatten)]
    pub lane: LaneSnapshot,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub active: StrategyId,
    pub strategies: Vec<StrategyView>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// `false` when a request was already pending and nothing was sent
    pub accepted: bool,
    #[serde(flatten)]
    pub view: StrategyView,
}

async fn view(state: &AppState, strategy: StrategyId) -> StrategyView {
    let lane = state.selector.lane(strategy).snapshot().await;
    StrategyView {
        active: state.selector.active().await == strategy,
        lane,
    }
}

/// Resolves a path key and requires it to be the active strategy
async fn resolve_active(state: &AppState, key: &str) -> AppResult<StrategyId> {
    let strategy = state.selector.resolve(key).await?;
    state.selector.ensure_active(strategy).await?;
    Ok(strategy)
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// All strategies with their state
pub async fn get_strategies(State(state): State<AppState>) -> Json<OverviewResponse> {
    let mut strategies = Vec::with_capacity(StrategyId::ALL.len());
    for strategy in StrategyId::ALL {
        strategies.push(view(&state, strategy).await);
    }

    Json(OverviewResponse {
        active: state.selector.active().await,
        strategies,
    })
}

/// Change which strategy is displayed (`PUT /strategies/active`)
pub async fn switch_strategy(
    State(state): State<AppState>,
    Path(key): Path<String>,
    AppJson(request): AppJson<SwitchStrategyRequest>,
) -> AppResult<Json<SwitchStrategyResponse>> {
    if key != ACTIVE_ALIAS {
        return Err(AppError::NotFound(format!(
            "Only /strategies/{} can be replaced",
            ACTIVE_ALIAS
        )));
    }

    let changed = state.selector.switch_to(request.strategy).await;
    Ok(Json(SwitchStrategyResponse {
        active: request.strategy,
        changed,
    }))
}

/// One strategy's state and input
pub async fn get_strategy(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<StrategyView>> {
    let strategy = state.selector.resolve(&key).await?;
    Ok(Json(view(&state, strategy).await))
}

/// Submit the strategy's current input to the recommendation service
///
/// Answers as soon as the request is in flight; poll the strategy for the
/// outcome.
pub async fn submit(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    let strategy = resolve_active(&state, &key).await?;
    let accepted = state.selector.lane(strategy).submit_detached().await;

    let status = if accepted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(SubmitResponse {
            accepted,
            view: view(&state, strategy).await,
        }),
    ))
}

/// Entered book identifiers, in order
pub async fn get_items(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<Vec<PreferenceItem>>> {
    let strategy = state.selector.resolve(&key).await?;
    let items = state.selector.lane(strategy).items().await?;
    Ok(Json(items))
}

/// Add a book identifier
pub async fn add_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
    AppJson(request): AppJson<AddItemRequest>,
) -> AppResult<Json<AddItemResponse>> {
    let strategy = resolve_active(&state, &key).await?;
    let lane = state.selector.lane(strategy);

    let added = lane.add_item(&request.text).await?;
    let items = lane.items().await?;

    Ok(Json(AddItemResponse { added, items }))
}

/// Remove a book identifier by id; unknown ids are ignored
pub async fn remove_item(
    State(state): State<AppState>,
    Path((key, item_id)): Path<(String, String)>,
) -> AppResult<Json<RemoveItemResponse>> {
    let strategy = resolve_active(&state, &key).await?;
    let item_id = Uuid::parse_str(&item_id)
        .map_err(|e| AppError::InvalidInput(format!("Invalid item id {}: {}", item_id, e)))?;
    let lane = state.selector.lane(strategy);

    let removed = lane.remove_item(item_id).await?;
    let items = lane.items().await?;

    Ok(Json(RemoveItemResponse { removed, items }))
}

/// Remove every book identifier
pub async fn clear_items(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<StatusCode> {
    let strategy = resolve_active(&state, &key).await?;
    state.selector.lane(strategy).clear_items().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the demographic filter
pub async fn set_filter(
    State(state): State<AppState>,
    Path(key): Path<String>,
    AppJson(filter): AppJson<DemographicFilter>,
) -> AppResult<Json<StrategyView>> {
    let strategy = resolve_active(&state, &key).await?;
    state.selector.lane(strategy).set_filter(filter).await?;
    Ok(Json(view(&state, strategy).await))
}
