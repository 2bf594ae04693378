pub mod lifecycle;
pub mod providers;
pub mod request_builder;
pub mod selector;
pub mod strategy;

pub use providers::{RecommendationService, RemoteRecommender};
pub use selector::StrategySelector;
pub use strategy::{LaneSnapshot, StrategyInput, StrategyLane};
