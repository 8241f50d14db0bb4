use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::info;
use vitrine_core::{
    BuildOutcome, CommandLauncher, DownloadDispatcher, SqliteLedger,
    catalog::spawn_refresh,
};

use crate::infra::{app_state::AppState, config::Config};

/// Builds the application state and runs the first catalog build. A
/// failed first build is fatal.
pub async fn bootstrap(config: Arc<Config>) -> Result<AppState> {
    let dispatcher = if config.enqueue.enabled {
        Some(Arc::new(build_dispatcher(&config)?))
    } else {
        info!("enqueue disabled; acquisition routes are not mounted");
        None
    };

    let state = AppState::new(Arc::clone(&config), dispatcher);
    match state
        .catalog
        .build()
        .await
        .context("initial catalog build failed")?
    {
        BuildOutcome::Rebuilt { items, elapsed } => {
            info!(items, ?elapsed, "initial catalog ready");
        }
        BuildOutcome::Unchanged { items } => {
            info!(items, "initial catalog ready");
        }
    }
    Ok(state)
}

fn build_dispatcher(config: &Config) -> Result<DownloadDispatcher> {
    let enqueue = &config.enqueue;
    let ledger = SqliteLedger::open(
        &enqueue.ledger_path,
        &enqueue.ledger_table,
        &enqueue.ledger_column,
    )
    .context("failed to prepare download ledger")?;
    let launcher = CommandLauncher::new(enqueue.program.clone(), enqueue.args.clone())
        .working_dir(enqueue.working_dir.clone());
    info!(
        ledger = %enqueue.ledger_path.display(),
        program = %enqueue.program,
        max_concurrent_jobs = enqueue.max_concurrent_jobs,
        "enqueue enabled"
    );
    Ok(DownloadDispatcher::new(
        Arc::new(ledger),
        Arc::new(launcher),
        enqueue.max_concurrent_jobs,
    ))
}

/// Starts the periodic catalog refresh. The caller aborts the handle on
/// shutdown.
pub fn spawn_background_tasks(state: &AppState) -> JoinHandle<()> {
    spawn_refresh(
        Arc::clone(&state.catalog),
        state.config.library.refresh_interval,
    )
}
