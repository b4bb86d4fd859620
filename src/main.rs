//! Keystone Server entry point.

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use keystone_http::AppState;
use keystone_server::config::Config;
use keystone_service::ServiceState;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let service = ServiceState::new(&config.service_config());
    let state = AppState::new(service, config.http_config());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        debug = config.debug,
        maintenance = config.maintenance,
        "Keystone Server starting",
    );
    if config.debug {
        tracing::warn!("debug mode enabled, API error bodies include raw failure detail");
    }

    let app = keystone_http::router(state.clone());

    let addr = SocketAddr::new(config.host.parse().expect("invalid host"), config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    // Spawn report-throttle cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
            cleanup_state.reporter().cleanup();
        }
    });

    tracing::info!(%addr, "Keystone Server ready");

    keystone_http::serve(listener, app, shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("Keystone Server shut down");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install signal handler");
    tracing::info!("Shutdown signal received");
}
