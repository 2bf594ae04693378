use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use mockall::{mock, predicate::eq};
use serde_json::{json, Value};
use tokio::sync::Notify;

use book_recs::api::{create_router, AppState};
use book_recs::config::Config;
use book_recs::error::RecommendationError;
use book_recs::models::{
    BookRecord, CuratedRequest, DefaultRequest, DemographicRequest, RecommendationResult,
};
use book_recs::services::providers::{RecommendationOutcome, RecommendationService};

mock! {
    pub Recommender {}

    #[async_trait]
    impl RecommendationService for Recommender {
        async fn fetch_default(&self, request: &DefaultRequest) -> RecommendationOutcome;
        async fn fetch_demographic(&self, request: &DemographicRequest) -> RecommendationOutcome;
        async fn fetch_curated(&self, request: &CuratedRequest) -> RecommendationOutcome;
        fn name(&self) -> &'static str;
    }
}

fn titled(title: &str) -> RecommendationResult {
    let record: BookRecord = serde_json::from_value(json!({ "Book-Title": title })).unwrap();
    RecommendationResult {
        books: vec![record],
        message: None,
    }
}

/// Holds every request until released
struct GatedRecommender {
    gate: Notify,
}

#[async_trait]
impl RecommendationService for GatedRecommender {
    async fn fetch_default(&self, _request: &DefaultRequest) -> RecommendationOutcome {
        self.gate.notified().await;
        Ok(titled("gated"))
    }

    async fn fetch_demographic(&self, _request: &DemographicRequest) -> RecommendationOutcome {
        self.gate.notified().await;
        Ok(titled("gated"))
    }

    async fn fetch_curated(&self, _request: &CuratedRequest) -> RecommendationOutcome {
        self.gate.notified().await;
        Ok(titled("gated"))
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

fn create_test_server(mut service: MockRecommender) -> TestServer {
    service.expect_name().return_const("mock");
    let state = AppState::new(Arc::new(service), &Config::default());
    TestServer::new(create_router(state)).unwrap()
}

/// Polls a strategy until its request is no longer pending
async fn settled(server: &TestServer, key: &str) -> Value {
    for _ in 0..100 {
        let view: Value = server.get(&format!("/strategies/{}", key)).await.json();
        if view["state"]["status"] != "pending" {
            return view;
        }
        tokio::task::yield_now().await;
    }
    panic!("strategy {} never settled", key);
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(MockRecommender::new());
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_overview_lists_three_idle_strategies() {
    let server = create_test_server(MockRecommender::new());

    let overview: Value = server.get("/strategies").await.json();
    assert_eq!(overview["active"], "default");

    let strategies = overview["strategies"].as_array().unwrap();
    assert_eq!(strategies.len(), 3);
    for strategy in strategies {
        assert_eq!(strategy["state"]["status"], "idle");
    }
    assert_eq!(strategies[1]["strategy"], "demographic");
    assert_eq!(strategies[1]["filter"]["min_age"], 18);
    assert_eq!(strategies[1]["filter"]["max_age"], 35);
}

#[tokio::test]
async fn test_switch_strategy_is_idempotent() {
    let server = create_test_server(MockRecommender::new());

    let first: Value = server
        .put("/strategies/active")
        .json(&json!({ "strategy": "demographic" }))
        .await
        .json();
    assert_eq!(first, json!({ "active": "demographic", "changed": true }));

    let second: Value = server
        .put("/strategies/active")
        .json(&json!({ "strategy": "demographic" }))
        .await
        .json();
    assert_eq!(second["changed"], false);

    let active: Value = server.get("/strategies/active").await.json();
    assert_eq!(active["strategy"], "demographic");
    assert_eq!(active["active"], true);
}

#[tokio::test]
async fn test_unknown_strategy_is_not_found() {
    let server = create_test_server(MockRecommender::new());
    let response = server.get("/strategies/trending").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("trending"));
}

#[tokio::test]
async fn test_add_and_remove_items() {
    let server = create_test_server(MockRecommender::new());

    let added: Value = server
        .post("/strategies/default/items")
        .json(&json!({ "text": " 0-441-01359-7 " }))
        .await
        .json();
    assert_eq!(added["added"]["value"], "0441013597");
    let item_id = added["added"]["id"].as_str().unwrap().to_string();

    let blank: Value = server
        .post("/strategies/default/items")
        .json(&json!({ "text": "   " }))
        .await
        .json();
    assert!(blank["added"].is_null());
    assert_eq!(blank["items"].as_array().unwrap().len(), 1);

    let path = format!("/strategies/default/items/{}", item_id);
    let removed: Value = server.delete(&path).await.json();
    assert_eq!(removed["removed"]["value"], "0441013597");
    assert!(removed["items"].as_array().unwrap().is_empty());

    // removing again is a no-op
    let again = server.delete(&path).await;
    again.assert_status_ok();
    assert!(again.json::<Value>()["removed"].is_null());
}

#[tokio::test]
async fn test_items_rejected_for_demographic_strategy() {
    let server = create_test_server(MockRecommender::new());
    server
        .put("/strategies/active")
        .json(&json!({ "strategy": "demographic" }))
        .await;

    let response = server
        .post("/strategies/demographic/items")
        .json(&json!({ "text": "123" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mutations_on_inactive_strategy_conflict() {
    let server = create_test_server(MockRecommender::new());

    server
        .post("/strategies/curated/items")
        .json(&json!({ "text": "123" }))
        .await
        .assert_status(StatusCode::CONFLICT);
    server
        .post("/strategies/curated/submit")
        .await
        .assert_status(StatusCode::CONFLICT);

    // reads still work
    server.get("/strategies/curated").await.assert_status_ok();
}

#[tokio::test]
async fn test_default_submit_fulfills_with_service_result() {
    let mut service = MockRecommender::new();
    service
        .expect_fetch_default()
        .with(eq(DefaultRequest {
            books: vec!["123".to_string(), "456".to_string()],
            top_k: 5,
        }))
        .times(1)
        .returning(|_| Ok(titled("X")));
    let server = create_test_server(service);

    for text in ["123", "456"] {
        server
            .post("/strategies/default/items")
            .json(&json!({ "text": text }))
            .await
            .assert_status_ok();
    }

    let response = server.post("/strategies/default/submit").await;
    response.assert_status(StatusCode::ACCEPTED);
    let submitted: Value = response.json();
    assert_eq!(submitted["accepted"], true);
    assert_eq!(submitted["state"]["status"], "pending");

    let view = settled(&server, "default").await;
    assert_eq!(view["state"]["status"], "fulfilled");
    assert_eq!(
        view["state"]["result"]["books"],
        json!([{ "Book-Title": "X" }])
    );
}

#[tokio::test]
async fn test_demographic_submit_uses_ordered_range() {
    let mut service = MockRecommender::new();
    service
        .expect_fetch_demographic()
        .with(eq(DemographicRequest {
            age_range: [18, 35],
            country: "USA".to_string(),
            top_k: 10,
        }))
        .times(1)
        .returning(|_| Ok(titled("Y")));
    let server = create_test_server(service);

    server
        .put("/strategies/active")
        .json(&json!({ "strategy": "demographic" }))
        .await;

    let view: Value = server
        .put("/strategies/active/filter")
        .json(&json!({ "min_age": 35, "max_age": 18, "country": " USA " }))
        .await
        .json();
    assert_eq!(view["filter"]["min_age"], 35);

    server
        .post("/strategies/active/submit")
        .await
        .assert_status(StatusCode::ACCEPTED);

    let view = settled(&server, "demographic").await;
    assert_eq!(view["state"]["status"], "fulfilled");
}

#[tokio::test]
async fn test_transport_failure_records_failed_state() {
    let mut service = MockRecommender::new();
    service.expect_fetch_curated().times(1).returning(|_| {
        Err(RecommendationError::Transport(
            "error sending request: connection refused".to_string(),
        ))
    });
    let server = create_test_server(service);

    server
        .put("/strategies/active")
        .json(&json!({ "strategy": "newUser" }))
        .await;
    server
        .post("/strategies/curated/items")
        .json(&json!({ "text": "123" }))
        .await;
    server.post("/strategies/curated/submit").await;

    let view = settled(&server, "curated").await;
    assert_eq!(view["state"]["status"], "failed");
    assert_eq!(view["state"]["error"]["kind"], "transport");
    assert!(!view["state"]["error"]["message"]
        .as_str()
        .unwrap()
        .is_empty());
    assert!(view["state"].get("result").is_none());
}

#[tokio::test]
async fn test_switching_away_keeps_state() {
    let mut service = MockRecommender::new();
    service
        .expect_fetch_default()
        .times(1)
        .returning(|_| Ok(titled("X")));
    let server = create_test_server(service);

    server.post("/strategies/default/submit").await;
    let before = settled(&server, "default").await;

    server
        .put("/strategies/active")
        .json(&json!({ "strategy": "curated" }))
        .await;
    server
        .put("/strategies/active")
        .json(&json!({ "strategy": "default" }))
        .await;

    let after: Value = server.get("/strategies/default").await.json();
    assert_eq!(before["state"], after["state"]);
}

#[tokio::test]
async fn test_submit_while_pending_is_suppressed() {
    let service = Arc::new(GatedRecommender {
        gate: Notify::new(),
    });
    let state = AppState::new(service.clone(), &Config::default());
    let server = TestServer::new(create_router(state)).unwrap();

    let first = server.post("/strategies/default/submit").await;
    first.assert_status(StatusCode::ACCEPTED);
    let first: Value = first.json();
    assert_eq!(first["accepted"], true);

    let second = server.post("/strategies/default/submit").await;
    second.assert_status_ok();
    let second: Value = second.json();
    assert_eq!(second["accepted"], false);
    assert_eq!(second["state"], first["state"]);
    assert_eq!(second["state"]["status"], "pending");

    service.gate.notify_one();
    let view = settled(&server, "default").await;
    assert_eq!(view["state"]["result"]["books"][0]["Book-Title"], "gated");
}

#[tokio::test]
async fn test_clear_items_empties_working_set() {
    let server = create_test_server(MockRecommender::new());

    for text in ["123", "456"] {
        server
            .post("/strategies/default/items")
            .json(&json!({ "text": text }))
            .await;
    }

    server
        .delete("/strategies/default/items")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let items: Value = server.get("/strategies/default/items").await.json();
    assert_eq!(items, json!([]));
}

#[tokio::test]
async fn test_malformed_filter_body_renders_json_error() {
    let server = create_test_server(MockRecommender::new());
    server
        .put("/strategies/active")
        .json(&json!({ "strategy": "demographic" }))
        .await;

    let response = server
        .put("/strategies/demographic/filter")
        .json(&json!({ "min_age": "abc", "max_age": 30 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("min_age"));

    // the stored filter is untouched
    let view: Value = server.get("/strategies/demographic").await.json();
    assert_eq!(view["filter"]["min_age"], 18);
}

#[tokio::test]
async fn test_non_json_item_body_renders_json_error() {
    let server = create_test_server(MockRecommender::new());

    let response = server.post("/strategies/default/items").text("123").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(!response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .is_empty());

    let unknown = server
        .put("/strategies/active")
        .json(&json!({ "strategy": "trending" }))
        .await;
    unknown.assert_status(StatusCode::BAD_REQUEST);
    assert!(unknown.json::<Value>()["error"].is_string());
}
