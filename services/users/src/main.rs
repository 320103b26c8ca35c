use anyhow::Result;
use common::config::ServiceConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use users::{repositories::UserRepository, routes, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting users service");

    let bind_address = config.bind_address();
    let app_state = AppState::new(config, UserRepository::new());

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Users service listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
