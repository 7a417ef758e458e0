pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::commands::AppState;
pub use application::planner::{Planner, PlannerSettings, PlannerSnapshot};
pub use infrastructure::error::InfraError;

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
