use std::sync::Arc;

use anyhow::{Context, Result};
use api::{AppConfig, AppContext, logging, routes};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    logging::init_tracing(config.log_format);

    let ctx = Arc::new(AppContext::from_config(&config).await);
    let app = routes::router(ctx);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!(
        "Server listening on http://{} (reports in {:?})",
        config.server.bind,
        config.server.output_dir
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
