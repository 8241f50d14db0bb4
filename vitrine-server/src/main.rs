//! # Vitrine Server
//!
//! Serves a directory of media items as a browsable catalog:
//!
//! - **Listing**: cached, refreshed periodically, newest items first
//! - **Detail**: descriptor metadata, ordered fanart and the video path
//! - **Files**: posters, fanart and video with range support
//! - **Enqueue**: deduplicated acquisition jobs run by an external program

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_server::{
    infra::{
        config::{Config, ConfigLoad, ConfigLoader, ConfigOverrides},
        startup::{bootstrap, spawn_background_tasks},
    },
    routes,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "vitrine-server", version)]
#[command(about = "Media catalog server with file serving and acquisition enqueueing")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "VITRINE_CONFIG")]
    config: Option<PathBuf>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Directory whose subdirectories are catalog items (overrides config)
    #[arg(long, env = "VITRINE_LIBRARY_ROOT")]
    library_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new().with_overrides(ConfigOverrides {
        host: cli.host,
        port: cli.port,
        library_root: cli.library_root,
    });
    if let Some(path) = cli.config {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad { config, warnings } =
        loader.load().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }

    if let Err(err) = run_server(Arc::new(config)).await {
        error!(error = ?err, "server terminated");
        return Err(err);
    }
    Ok(())
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    info!(
        root = %config.library.root.display(),
        refresh_interval = %humantime::format_duration(config.library.refresh_interval),
        "starting catalog"
    );
    let state = bootstrap(Arc::clone(&config)).await?;
    let refresh = spawn_background_tasks(&state);
    let dispatcher = state.dispatcher.clone();
    let router = routes::create_router(state);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;
    info!(
        "Starting Vitrine server on {}:{}",
        config.server.host, config.server.port
    );

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error");
    refresh.abort();
    if let Some(dispatcher) = dispatcher {
        let dropped = dispatcher.shutdown(config.enqueue.shutdown_grace).await;
        if !dropped.is_empty() {
            warn!(jobs = dropped.len(), "acquisition jobs dropped at shutdown");
        }
    }
    info!("server stopped");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
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
    info!("shutdown signal received");
}
