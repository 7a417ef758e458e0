use crate::application::bootstrap::bootstrap_workspace;
use crate::application::planner::{Planner, PlannerSettings, PlannerSnapshot};
use crate::application::rollover::{spawn_rollover_monitor, RolloverMonitor, RolloverReport};
use crate::domain::calendar::Calendar;
use crate::domain::models::{
    CompletedEntry, DayOfWeek, Reminder, Task, TaskKind, ThemePreference,
};
use crate::domain::reorder::{ReorderOutcome, ReorderRejection};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::key_value_store::{KeyValueStore, SqliteKeyValueStore};
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppState {
    config: AppConfig,
    planner: Arc<Planner>,
}

impl AppState {
    pub async fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        Self::with_calendar(workspace_root, Calendar::default()).await
    }

    pub async fn with_calendar(
        workspace_root: PathBuf,
        calendar: Calendar,
    ) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let store: Arc<dyn KeyValueStore> =
            Arc::new(SqliteKeyValueStore::new(&bootstrap.database_path));
        let settings = PlannerSettings {
            foreground_threshold: bootstrap.config.foreground_threshold,
        };
        let planner = Planner::load(store, calendar, settings).await;

        Ok(Self {
            config: bootstrap.config,
            planner: Arc::new(planner),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn planner(&self) -> &Arc<Planner> {
        &self.planner
    }

    pub fn command_error(&self, command: &str, error: &InfraError) {
        tracing::error!(command, error = %error, "command failed");
    }

    pub fn start_rollover_monitor(&self) -> RolloverMonitor {
        spawn_rollover_monitor(Arc::clone(&self.planner), self.config.rollover_poll)
    }

    pub async fn shutdown(&self) {
        self.planner.flush().await;
    }
}

fn run_command<T>(
    state: &AppState,
    command: &str,
    body: impl FnOnce() -> Result<T, InfraError>,
) -> Result<T, InfraError> {
    body().inspect_err(|error| state.command_error(command, error))
}

fn parse_kind(value: &str) -> Result<TaskKind, InfraError> {
    Ok(value.parse::<TaskKind>()?)
}

fn parse_day(value: &str) -> Result<DayOfWeek, InfraError> {
    Ok(value.parse::<DayOfWeek>()?)
}

fn parse_optional_day(value: Option<String>) -> Result<Option<DayOfWeek>, InfraError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_day)
        .transpose()
}

pub fn add_task_impl(
    state: &AppState,
    task_type: String,
    text: String,
    day: Option<String>,
) -> Result<Option<Task>, InfraError> {
    run_command(state, "add_task", || {
        let kind = parse_kind(&task_type)?;
        let day = parse_optional_day(day)?;
        let created = state.planner.add_task(kind, &text, day)?;
        if created.is_none() {
            tracing::debug!(kind = %kind, "ignored empty task text");
        }
        Ok(created)
    })
}

pub fn remove_task_impl(
    state: &AppState,
    task_id: String,
    task_type: String,
) -> Result<bool, InfraError> {
    run_command(state, "remove_task", || {
        let kind = parse_kind(&task_type)?;
        let removed = state.planner.remove_task(&task_id, kind)?;
        if !removed {
            tracing::debug!(task_id = %task_id, kind = %kind, "remove ignored; task not found");
        }
        Ok(removed)
    })
}

pub fn complete_task_impl(
    state: &AppState,
    task_id: String,
) -> Result<Option<CompletedEntry>, InfraError> {
    run_command(state, "complete_task", || {
        let entry = state.planner.complete_task(&task_id)?;
        if entry.is_none() {
            tracing::debug!(task_id = %task_id, "complete ignored; task not in day view");
        }
        Ok(entry)
    })
}

pub fn clear_completed_impl(state: &AppState, day: Option<String>) -> Result<bool, InfraError> {
    run_command(state, "clear_completed", || {
        let day = parse_optional_day(day)?;
        state.planner.clear_completed(day)
    })
}

pub fn select_day_impl(state: &AppState, day: String) -> Result<PlannerSnapshot, InfraError> {
    run_command(state, "select_day", || {
        state.planner.select_day(parse_day(&day)?)?;
        state.planner.snapshot()
    })
}

// Unknown group names are rejected here and leave every collection untouched.
pub fn reorder_tasks_impl(
    state: &AppState,
    from_group: String,
    from_index: i64,
    to_group: String,
    to_index: i64,
) -> Result<ReorderOutcome, InfraError> {
    let (from_kind, to_kind) = match (from_group.parse::<TaskKind>(), to_group.parse::<TaskKind>()) {
        (Ok(from_kind), Ok(to_kind)) => (from_kind, to_kind),
        (Err(_), _) => return Ok(reject_group(from_group)),
        (_, Err(_)) => return Ok(reject_group(to_group)),
    };
    run_command(state, "reorder_tasks", || {
        state
            .planner
            .reorder(from_kind, from_index, to_kind, to_index)
    })
}

fn reject_group(group: String) -> ReorderOutcome {
    let rejection = ReorderRejection::UnknownGroup(group);
    tracing::warn!(error = %rejection, "rejected reorder");
    ReorderOutcome::Rejected(rejection)
}

pub fn add_reminder_impl(state: &AppState, text: String) -> Result<Option<Reminder>, InfraError> {
    run_command(state, "add_reminder", || state.planner.add_reminder(&text))
}

pub fn toggle_reminder_impl(state: &AppState, reminder_id: String) -> Result<bool, InfraError> {
    run_command(state, "toggle_reminder", || {
        state.planner.toggle_reminder(&reminder_id)
    })
}

pub fn clear_reminders_impl(state: &AppState) -> Result<(), InfraError> {
    run_command(state, "clear_reminders", || state.planner.clear_reminders())
}

pub fn toggle_theme_impl(state: &AppState) -> Result<ThemePreference, InfraError> {
    run_command(state, "toggle_theme", || {
        let theme = state.planner.toggle_theme()?;
        tracing::info!(theme = theme.as_str(), "theme changed");
        Ok(theme)
    })
}

pub fn snapshot_impl(state: &AppState) -> Result<PlannerSnapshot, InfraError> {
    run_command(state, "snapshot", || state.planner.snapshot())
}

pub fn dismiss_error_impl(state: &AppState) {
    state.planner.dismiss_error();
}

pub fn notify_foreground_impl(state: &AppState) -> Result<Option<RolloverReport>, InfraError> {
    run_command(state, "notify_foreground", || state.planner.notify_foreground())
}
