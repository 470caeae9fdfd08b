use clap::Parser; // for cli
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use ravehouse_api::app;
use ravehouse_api::config::{Args, DeploymentMode};
use ravehouse_api::rate_limit::RateLimiter;
use ravehouse_api::state::AppState;
use ravehouse_api::sweeper::expiry_sweeper;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();
    let deployment = DeploymentMode::detect(args.trusted_edge);

    let state = Arc::new(AppState::new(
        RateLimiter::new(args.rate_limit, Duration::from_secs(args.rate_window)),
        deployment,
    ));

    if args.sweep_interval > 0 {
        let sweeper_state = state.clone();
        let sweep_interval = Duration::from_secs(args.sweep_interval);
        tokio::spawn(async move {
            expiry_sweeper(sweeper_state, sweep_interval).await;
        });
    }

    let app = app(state.clone());

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on {addr}");
    info!("Deployment mode: {deployment}");
    info!(
        "Rate limit: {} requests per {} seconds",
        state.rate_limiter.max_requests(),
        state.rate_limiter.window().as_secs()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
