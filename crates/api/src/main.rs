use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schoolhub_api::config::ServerConfig;
use schoolhub_api::drafts::start_draft_sweeper;
use schoolhub_api::router::build_app_router;
use schoolhub_api::state::AppState;
use schoolhub_iomad::IomadClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "schoolhub_api=debug,schoolhub_iomad=debug,schoolhub_core=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- LMS client ---
    // The service token stays on this side; the browser only ever holds a
    // SchoolHub JWT.
    let iomad = Arc::new(IomadClient::new(&config.iomad).expect("Failed to build IOMAD client"));
    tracing::info!(
        base_url = %iomad.base_url(),
        service = %iomad.service(),
        "IOMAD client ready"
    );

    // --- App state ---
    let state = AppState::new(
        config.clone(),
        iomad.clone(),
        iomad.clone(),
        iomad,
    );

    // --- Background tasks ---
    let sweeper_handle = start_draft_sweeper(state.drafts.clone());

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    sweeper_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
