use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use taketemp::{config::Config, create_app, startup};

#[derive(Parser, Debug)]
#[command(name = "taketemp", about = "Temperature self-report service", version)]
struct Cli {
    /// Port to listen on, overrides the PORT environment variable
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env_with_port(cli.port) {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to start server: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = match startup::prepare(config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Unable to start server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let address = state.config.server_address();
    let app = create_app(state);

    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", address, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Server started on {} at {}", address, chrono::Utc::now());

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server shut down");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
}
