use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use xg_value::config::AppConfig;
use xg_value::{build_state, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables and configuration
    let config = AppConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        "Tracking {} leagues, cache TTL {:?}, {} concurrent upstream calls",
        config.leagues.len(),
        config.cache_ttl,
        config.max_concurrency
    );

    let state = build_state(&config)?;
    let app = routes::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Serving /api/games at http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
