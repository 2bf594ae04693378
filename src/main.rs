use anyhow::Context;
use book_recs::{
    api::{create_router, AppState},
    config::Config,
};
use tracing_subscriber::EnvFilter;

// Single-threaded: lanes suspend at the network boundary and resume in turn.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        recommender_url = %config.recommender_url,
        default_top_k = config.default_top_k,
        demographic_top_k = config.demographic_top_k,
        curated_top_k = config.curated_top_k,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config);
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
