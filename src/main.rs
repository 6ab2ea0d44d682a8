use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use cart_rs::{
    build_cart_service, create_app, init_observability, shutdown_observability, Config, Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_environment().context("Failed to load configuration")?;

    init_observability(&config.observability).context("Failed to initialize observability")?;

    info!(
        "Starting {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!(
        "Storage backend: {:?}, region: {}",
        config.database.storage_backend, config.database.region
    );

    let metrics = Arc::new(Metrics::new()?);

    let cart_service = build_cart_service(&config.database)
        .await
        .context("Failed to initialize storage")?;
    info!("Services initialized successfully");

    let app = create_app(Arc::new(cart_service), metrics, &config.server);

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_observability().await;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
