use dayboard::application::commands::snapshot_impl;
use dayboard::{init_logging, AppState, InfraError};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), InfraError> {
    let workspace_root = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?,
    };

    let state = AppState::new(workspace_root.clone()).await?;
    init_logging(&state.config().log_filter);
    tracing::info!(
        app = %state.config().app_name,
        workspace_root = %workspace_root.display(),
        "started"
    );

    let monitor = state.start_rollover_monitor();
    let snapshot = snapshot_impl(&state)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    monitor.stop().await;
    state.shutdown().await;
    Ok(())
}
