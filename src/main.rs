use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use gigigo_relay::{
    create_router,
    state::{AppConfig, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("gigigo_relay=debug,tower_http=info")
        }))
        .init();

    // Unusable credentials stop the process here
    let config = AppConfig::from_env()?;
    tracing::info!(
        "Starting relay ({}) for Firebase project {}",
        config.environment,
        config.service_account.project_id
    );

    let port = config.port;
    let app_state = AppState::new(config)?;
    let app = create_router(Arc::new(app_state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
