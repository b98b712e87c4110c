//! Keystore Identity - Entry point.

use keystore_identity::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::{Config, LogConfig, LogFormat},
    load_keystores, KeystoreRegistry,
};
use std::future::IntoFuture;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log);

    info!("Starting Keystore Identity service");

    let entries = match load_keystores(&config.keystore_path).await {
        Ok(k) => k,
        Err(e) => {
            error!("Failed to load keystores: {}", e);
            std::process::exit(1);
        }
    };

    let keystores: Vec<_> = entries.iter().flatten().cloned().collect();
    if keystores.len() < entries.len() {
        info!(
            "Skipped {} subdirectories in keystore directory",
            entries.len() - keystores.len()
        );
    }

    let registry = KeystoreRegistry::new(config.info.clone().into());
    registry.set_keystores(keystores).await;
    info!("Registry ready with {} accounts", registry.count().await);

    let rate_limit = RateLimitState::new(config.rate_limit.requests_per_minute);
    if rate_limit.is_enabled() {
        info!(
            "Rate limiting enabled: {} requests per minute",
            config.rate_limit.requests_per_minute
        );
    }

    let app = create_router_with_rate_limit(AppState::new(registry), rate_limit);

    let addr = match config.listen_addr() {
        Ok(a) => a,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Listening on {}", addr);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut graceful_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = graceful_rx.wait_for(|stop| *stop).await;
        })
        .into_future();

    // Bound how long in-flight requests may hold up the exit
    let mut deadline_rx = shutdown_rx;
    let timeout = config.shutdown_timeout();
    let deadline = async move {
        let _ = deadline_rx.wait_for(|stop| *stop).await;
        tokio::time::sleep(timeout).await;
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        _ = deadline => {
            warn!("Shutdown timeout of {:?} elapsed, dropping open connections", timeout);
        }
    }

    info!("Server stopped");
}

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    match log.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
