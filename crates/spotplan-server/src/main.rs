//! SpotPlan: spot registry with best-effort itinerary generation.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use spotplan_core::SpotPlanConfig;
use spotplan_server::cli::{self, Command};
use spotplan_server::{import, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = Command::parse(&args);

    // Commands that need no configuration
    match &command {
        Command::Help => {
            cli::print_help();
            return Ok(());
        }
        Command::MissingImportFile => {
            eprintln!("Usage: spotplan import <spots.json> [data-dir]");
            std::process::exit(1);
        }
        Command::Unknown(name) => {
            eprintln!("Unknown command: {}. Use 'spotplan help' for usage.", name);
            std::process::exit(1);
        }
        Command::Serve | Command::Import { .. } => {}
    }

    let config = SpotPlanConfig::from_env()?;

    if let Command::Import { file, data_dir } = command {
        let config = match data_dir {
            Some(dir) => config.with_data_dir(dir),
            None => config,
        };
        let report = import::run_import(&file, &config.data_dir);
        import::print_report(&report);
        std::process::exit(if report.errors.is_empty() { 0 } else { 1 });
    }

    info!("Data directory: {}", config.data_dir.display());
    let port = config.port;

    let state = Arc::new(AppState::new(config)?);
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("SpotPlan server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("SpotPlan server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
