use std::net::SocketAddr;

use finlit_marketplace::jobs::start_listing_expiration_sweep;
use finlit_marketplace::routes::create_routes;
use finlit_marketplace::{AppConfig, AppState};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting financial literacy marketplace server...");

    let config = AppConfig::from_env();
    info!("Server configuration loaded");

    let app_state = AppState::new(config.clone()).await?;
    info!("Application state initialized");

    start_listing_expiration_sweep(
        app_state.listing_service.clone(),
        config.sweep_interval_secs,
    );

    let app = create_routes(app_state.clone())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = config.server_address().parse()?;
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", config.server_address());

    axum::serve(listener, app).await?;

    Ok(())
}
