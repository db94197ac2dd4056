use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use guild_transfer::{
    cli::{Cli, Request},
    config::Config,
    error::AppError,
    service::{clean::CleanService, migrate::MigrationService},
    startup,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cancel = setup_signal_handler();

    match run(cli, cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), AppError> {
    let request = cli.command.into_request()?;
    let config = Config::from_env()?;

    let client = startup::connect_to_discord(&config).await?;

    match request {
        Request::Migrate(request) => {
            let report = MigrationService::new(client, request.scope, cancel.clone())
                .migrate(request.source, request.destination)
                .await?;

            if request.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            tracing::info!("Migration complete: {} messages", report.total_messages());
        }
        Request::Clean(request) => {
            let report = CleanService::new(client, request.scope, cancel.clone())
                .clean(request.server)
                .await?;
            tracing::info!("Cleanup complete: {} markers removed", report.markers_removed);
        }
    }

    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }

    Ok(())
}

/// Cancels the returned token on SIGINT or SIGTERM.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();

    for kind in [SignalKind::interrupt(), SignalKind::terminate()] {
        let token = cancel.clone();
        match signal(kind) {
            Ok(mut stream) => {
                tokio::spawn(async move {
                    stream.recv().await;
                    tracing::warn!("Received shutdown signal, finishing in-flight messages");
                    token.cancel();
                });
            }
            Err(e) => tracing::warn!("Failed to install signal handler: {}", e),
        }
    }

    cancel
}

/// Cancels the returned token on Ctrl-C.
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl-C, finishing in-flight messages");
            token.cancel();
        }
    });

    cancel
}
