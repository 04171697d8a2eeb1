use anyhow::Context;

use copydesk_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    copydesk_observability::init();

    let config = ApiConfig::from_env()?;
    let app = copydesk_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
