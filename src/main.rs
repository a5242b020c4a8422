use anyhow::Context;
use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xlsxcatalog::config::load_config;
use xlsxcatalog::server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.filter.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match config.source() {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("Using default embedded configuration"),
    }

    config.validate()?;

    let extractor = config
        .extractor()
        .context("invalid catalog configuration")?;
    let catalog_path = config.catalog_path();
    info!("Serving catalog from {}", catalog_path.display());

    let origin = HeaderValue::from_str(&config.cors.allowed_origin)?;
    let app = router(AppState::new(extractor, catalog_path), origin);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
