use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the API router the presentation layer talks to
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/strategies", get(handlers::get_strategies))
        // `PUT /strategies/active` switches; `GET /strategies/active` reads it
        .route(
            "/strategies/:key",
            get(handlers::get_strategy).put(handlers::switch_strategy),
        )
        .route("/strategies/:key/submit", post(handlers::submit))
        .route(
            "/strategies/:key/items",
            get(handlers::get_items)
                .post(handlers::add_item)
                .delete(handlers::clear_items),
        )
        .route("/strategies/:key/items/:item_id", delete(handlers::remove_item))
        .route("/strategies/:key/filter", put(handlers::set_filter))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
