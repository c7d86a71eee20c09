use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pathshala_portal::config::PortalConfig;
use pathshala_portal::services::backend::HttpBackend;
use pathshala_portal::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PortalConfig::from_env().context("failed to load configuration")?;
    tracing::info!("Backend: {}", config.backend_url);
    tracing::info!("Local offset: {}", config.local_offset);
    tracing::info!("Sessions lapse after {} idle minutes", config.session_idle_minutes);

    let backend = HttpBackend::new(&config).context("failed to build backend client")?;
    let addr = config.bind_address();
    let state = AppState::new(config, Arc::new(backend));

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Portal listening on {}", addr);
    // peer addresses key the admin login lock
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("server error")?;
    Ok(())
}
