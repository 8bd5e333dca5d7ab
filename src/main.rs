use std::net::SocketAddr;

use mediscope_gateway::config::{GenerationConfig, ServiceKind};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mediscope_gateway=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let service = ServiceKind::from_env()?;
    let config = GenerationConfig::from_env();
    let state = mediscope_gateway::build_state(&config)?;
    let app = mediscope_gateway::build_app(service, state);

    let addr = SocketAddr::from(([0, 0, 0, 0], service.port_from_env()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, service = service.name(), "service listening");

    axum::serve(listener, app).await?;
    Ok(())
}
