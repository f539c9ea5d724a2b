use ride_insights::logging::{debug_logging_enabled, init_default_logging};
use ride_insights::server::{create_router, AppState};
use ride_insights::settings::DashboardSettings;
use std::error::Error;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if !debug_logging_enabled() {
        init_default_logging();
    }

    let settings = DashboardSettings::from_env()?;
    let addr = settings.bind_addr;
    let app_state = AppState::new(settings);

    // Warm the cache so the first page view does not pay for the load.
    // A failure here is not fatal: the page shows the error and the next request retries.
    if let Err(e) = app_state.cache.get().await {
        warn!(error = %e, path = %app_state.cache.path().display(), "Initial dataset load failed");
    }

    let app = create_router(app_state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Ride insights dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
