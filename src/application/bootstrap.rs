use crate::infrastructure::config::{ensure_default_configs, load_app_config, AppConfig};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::storage::initialize_database;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BootstrapResult {
    pub database_path: PathBuf,
    pub config: AppConfig,
}

pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, InfraError> {
    let config_dir = workspace_root.join("config");
    let state_dir = workspace_root.join("state");
    let logs_dir = workspace_root.join("logs");

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&state_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    let config = load_app_config(&config_dir)?;
    let database_path = state_dir.join(&config.database_file);
    initialize_database(&database_path)?;

    tracing::debug!(
        workspace_root = %workspace_root.display(),
        database_path = %database_path.display(),
        "workspace ready"
    );
    Ok(BootstrapResult {
        database_path,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_WORKSPACE: AtomicUsize = AtomicUsize::new(0);

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!(
            "dayboard-bootstrap-tests-{}-{}",
            std::process::id(),
            NEXT_TEMP_WORKSPACE.fetch_add(1, Ordering::Relaxed)
        ))
    }

    #[test]
    fn creates_layout_config_and_database() {
        let root = temp_root();
        let result = bootstrap_workspace(&root).expect("bootstrap");

        assert!(root.join("config").join("app.json").is_file());
        assert!(root.join("logs").is_dir());
        assert_eq!(result.database_path, root.join("state").join("dayboard.sqlite"));
        assert!(result.database_path.is_file());
        assert_eq!(result.config, AppConfig::default());

        bootstrap_workspace(&root).expect("bootstrap is repeatable");
        let _ = fs::remove_dir_all(&root);
    }
}
