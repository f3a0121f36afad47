use anyhow::Context;

use tutoria_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tutoria_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let app = tutoria_api::app::build_app(&config).context("failed to build application")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
