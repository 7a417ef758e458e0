use crate::application::persistence::{Advisory, PersistenceQueue};
use crate::application::rollover::{retire_day, RolloverReport};
use crate::domain::calendar::Calendar;
use crate::domain::day_view::{group_view, DayView};
use crate::domain::models::{
    CompletedEntry, CompletedLog, DayOfWeek, Reminder, Task, TaskCollections, TaskKind,
    ThemePreference,
};
use crate::domain::reorder::{move_item, plan_move, ReorderOutcome};
use crate::domain::text::to_title_case;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::key_value_store::{
    KeyValueStore, COMPLETED_TASKS_KEY, CUSTOM_TASKS_KEY, DAILY_TASKS_KEY, MEDIA_TASKS_KEY,
    REMINDERS_KEY, THEME_KEY, WEEKLY_TASKS_KEY,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const LOAD_FAILURE_MESSAGE: &str = "Failed to load your tasks. Please try restarting the app.";
const DEFAULT_FOREGROUND_THRESHOLD: Duration = Duration::from_millis(60_000);
const REMINDER_ID_PREFIX: char = 'r';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stored {
    Tasks(TaskKind),
    Completed,
    Reminders,
    Theme,
}

impl Stored {
    fn key(self) -> &'static str {
        match self {
            Self::Tasks(kind) => tasks_key(kind),
            Self::Completed => COMPLETED_TASKS_KEY,
            Self::Reminders => REMINDERS_KEY,
            Self::Theme => THEME_KEY,
        }
    }
}

pub fn tasks_key(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Daily => DAILY_TASKS_KEY,
        TaskKind::Weekly => WEEKLY_TASKS_KEY,
        TaskKind::Media => MEDIA_TASKS_KEY,
        TaskKind::Custom => CUSTOM_TASKS_KEY,
    }
}

/// Issues `<prefix><millis>` ids that never repeat within a planner: when
/// the clock has not moved on, the previous value plus one is used.
#[derive(Debug, Default)]
struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    fn seed<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        let highest = ids
            .into_iter()
            .filter_map(|id| id.get(1..).and_then(|digits| digits.parse::<i64>().ok()))
            .max()
            .unwrap_or(0);
        self.last.fetch_max(highest, Ordering::SeqCst);
    }

    fn next(&self, prefix: char, now_millis: i64) -> String {
        let mut issued = now_millis;
        let _ = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                issued = now_millis.max(last.saturating_add(1));
                Some(issued)
            });
        format!("{prefix}{issued}")
    }
}

#[derive(Debug, Clone)]
pub struct PlannerSettings {
    pub foreground_threshold: Duration,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            foreground_threshold: DEFAULT_FOREGROUND_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerSnapshot {
    pub selected_day: DayOfWeek,
    pub current_date: String,
    pub day_tasks: Vec<Task>,
    pub completed_tasks: Vec<CompletedEntry>,
    pub reminders: Vec<Reminder>,
    pub theme: ThemePreference,
    pub error: Option<String>,
}

#[derive(Debug)]
struct PlannerState {
    collections: TaskCollections,
    completed: CompletedLog,
    reminders: Vec<Reminder>,
    theme: ThemePreference,
    selected_day: DayOfWeek,
    current_date: String,
    day_view: DayView,
    last_active_millis: i64,
}

impl PlannerState {
    fn refresh_view(&mut self) -> &[Task] {
        self.day_view
            .refresh(&self.collections, self.selected_day, &self.completed)
    }
}

pub struct Planner {
    state: Mutex<PlannerState>,
    calendar: Calendar,
    ids: IdGenerator,
    persistence: PersistenceQueue,
    advisory: Advisory,
    settings: PlannerSettings,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("calendar", &self.calendar)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Planner {
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        calendar: Calendar,
        settings: PlannerSettings,
    ) -> Self {
        let advisory = Advisory::default();
        let defaults = TaskCollections::with_defaults();
        let mut collections = TaskCollections::default();
        for kind in TaskKind::ALL {
            let loaded = load_value::<Vec<Task>>(store.as_ref(), tasks_key(kind), &advisory)
                .await
                .map(|tasks| retain_valid(tasks, kind))
                .unwrap_or_else(|| defaults.get(kind).to_vec());
            *collections.get_mut(kind) = loaded;
        }
        let completed = load_value::<CompletedLog>(store.as_ref(), COMPLETED_TASKS_KEY, &advisory)
            .await
            .unwrap_or_default();
        let reminders = load_value::<Vec<Reminder>>(store.as_ref(), REMINDERS_KEY, &advisory)
            .await
            .unwrap_or_default();
        let theme = load_theme(store.as_ref()).await;

        let ids = IdGenerator::default();
        ids.seed(
            TaskKind::ALL
                .iter()
                .flat_map(|kind| collections.get(*kind).iter().map(|task| task.id.as_str()))
                .chain(reminders.iter().map(|reminder| reminder.id.as_str())),
        );

        let (persistence, _worker) = PersistenceQueue::spawn(store, advisory.clone());
        let state = PlannerState {
            collections,
            completed,
            reminders,
            theme,
            selected_day: calendar.current_day(),
            current_date: calendar.current_date(),
            day_view: DayView::dirty(),
            last_active_millis: calendar.now_millis(),
        };
        tracing::info!(
            selected_day = %state.selected_day,
            current_date = %state.current_date,
            "planner loaded"
        );

        Self {
            state: Mutex::new(state),
            calendar,
            ids,
            persistence,
            advisory,
            settings,
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, PlannerState>, InfraError> {
        self.state
            .lock()
            .map_err(|error| InfraError::StatePoisoned(format!("planner state: {error}")))
    }

    fn persist(&self, state: &PlannerState, stored: &[Stored]) {
        for unit in stored {
            let snapshot = match unit {
                Stored::Tasks(kind) => serde_json::to_string(state.collections.get(*kind)),
                Stored::Completed => serde_json::to_string(&state.completed),
                Stored::Reminders => serde_json::to_string(&state.reminders),
                Stored::Theme => serde_json::to_string(&state.theme),
            };
            match snapshot {
                Ok(value) => self.persistence.enqueue(unit.key(), value),
                Err(error) => {
                    tracing::error!(key = unit.key(), error = %error, "failed to encode snapshot")
                }
            }
        }
    }

    pub fn add_task(
        &self,
        kind: TaskKind,
        text: &str,
        day: Option<DayOfWeek>,
    ) -> Result<Option<Task>, InfraError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let mut state = self.lock_state()?;
        let day = match kind {
            TaskKind::Daily => None,
            _ => Some(day.unwrap_or(state.selected_day)),
        };
        let task = Task {
            id: self.ids.next(kind.id_prefix(), self.calendar.now_millis()),
            text: to_title_case(trimmed),
            completed: false,
            kind,
            day,
            skip_weekends: None,
            date: (kind == TaskKind::Custom).then(|| state.current_date.clone()),
        };
        state.collections.get_mut(kind).push(task.clone());

        if kind == TaskKind::Custom {
            if task.day == Some(state.selected_day) {
                state.day_view.append_custom(task.clone());
            }
        } else {
            state.day_view.mark_dirty();
        }
        self.persist(&state, &[Stored::Tasks(kind)]);
        drop(state);

        tracing::info!(task_id = %task.id, kind = %kind, "added task");
        Ok(Some(task))
    }

    pub fn add_custom_task(&self, text: &str) -> Result<Option<Task>, InfraError> {
        self.add_task(TaskKind::Custom, text, None)
    }

    pub fn remove_task(&self, id: &str, kind: TaskKind) -> Result<bool, InfraError> {
        let mut state = self.lock_state()?;
        let tasks = state.collections.get_mut(kind);
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        state.day_view.mark_dirty();
        self.persist(&state, &[Stored::Tasks(kind)]);
        drop(state);

        tracing::info!(task_id = %id, kind = %kind, "removed task");
        Ok(true)
    }

    pub fn complete_task(&self, id: &str) -> Result<Option<CompletedEntry>, InfraError> {
        let mut state = self.lock_state()?;
        state.refresh_view();
        let Some(task) = state.day_view.find(id).cloned() else {
            return Ok(None);
        };

        let entry = task.completed_entry();
        let day = state.selected_day;
        state.completed.append(day, entry.clone());
        let mut touched = vec![Stored::Completed];
        if task.kind == TaskKind::Custom {
            if let Some(custom) = state.collections.custom.iter_mut().find(|candidate| candidate.id == id) {
                custom.completed = true;
            }
            touched.push(Stored::Tasks(TaskKind::Custom));
        }
        state.day_view.remove(id);
        self.persist(&state, &touched);
        drop(state);

        tracing::info!(task_id = %id, day = %day, "completed task");
        Ok(Some(entry))
    }

    pub fn clear_completed(&self, day: Option<DayOfWeek>) -> Result<bool, InfraError> {
        let mut state = self.lock_state()?;
        let day = day.unwrap_or(state.selected_day);
        if !state.completed.clear(day) {
            return Ok(false);
        }
        if day == state.selected_day {
            state.day_view.mark_dirty();
        }
        self.persist(&state, &[Stored::Completed]);
        drop(state);

        tracing::info!(day = %day, "cleared completed tasks");
        Ok(true)
    }

    pub fn select_day(&self, day: DayOfWeek) -> Result<(), InfraError> {
        let mut state = self.lock_state()?;
        if state.selected_day != day {
            state.selected_day = day;
            state.day_view.mark_dirty();
        }
        Ok(())
    }

    pub fn reorder(
        &self,
        from_group: TaskKind,
        from_index: i64,
        to_group: TaskKind,
        to_index: i64,
    ) -> Result<ReorderOutcome, InfraError> {
        if from_group != to_group {
            return Ok(ReorderOutcome::Unchanged);
        }

        let mut state = self.lock_state()?;
        let len = state.collections.get(from_group).len();
        let (from, to) = match plan_move(len, from_index, to_index) {
            Ok(Some(positions)) => positions,
            Ok(None) => return Ok(ReorderOutcome::Unchanged),
            Err(rejection) => {
                tracing::warn!(group = %from_group, error = %rejection, "rejected reorder");
                return Ok(ReorderOutcome::Rejected(rejection));
            }
        };
        move_item(state.collections.get_mut(from_group), from, to);

        let day = state.selected_day;
        let sublist = group_view(
            state.collections.get(from_group),
            day,
            &state.completed.completed_ids(day),
        );
        state.day_view.replace_group(from_group, sublist);
        self.persist(&state, &[Stored::Tasks(from_group)]);
        drop(state);

        tracing::debug!(group = %from_group, from, to, "reordered task");
        Ok(ReorderOutcome::Moved {
            kind: from_group,
            from,
            to,
        })
    }

    pub fn add_reminder(&self, text: &str) -> Result<Option<Reminder>, InfraError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let reminder = Reminder {
            id: self.ids.next(REMINDER_ID_PREFIX, self.calendar.now_millis()),
            text: to_title_case(trimmed),
            completed: false,
        };
        let mut state = self.lock_state()?;
        state.reminders.push(reminder.clone());
        self.persist(&state, &[Stored::Reminders]);
        Ok(Some(reminder))
    }

    pub fn toggle_reminder(&self, id: &str) -> Result<bool, InfraError> {
        let mut state = self.lock_state()?;
        let Some(reminder) = state.reminders.iter_mut().find(|reminder| reminder.id == id) else {
            return Ok(false);
        };
        reminder.completed = !reminder.completed;
        self.persist(&state, &[Stored::Reminders]);
        Ok(true)
    }

    pub fn clear_reminders(&self) -> Result<(), InfraError> {
        let mut state = self.lock_state()?;
        state.reminders.clear();
        self.persist(&state, &[Stored::Reminders]);
        Ok(())
    }

    pub fn toggle_theme(&self) -> Result<ThemePreference, InfraError> {
        let mut state = self.lock_state()?;
        state.theme = state.theme.toggled();
        self.persist(&state, &[Stored::Theme]);
        Ok(state.theme)
    }

    /// Runs the day transition when the calendar date differs from the last
    /// one seen. The date comparison and the transition happen under one
    /// lock, so concurrent triggers apply it at most once per date change.
    pub fn check_for_rollover(&self) -> Result<Option<RolloverReport>, InfraError> {
        let mut state = self.lock_state()?;
        Ok(self.roll_over_if_needed(&mut state))
    }

    pub fn notify_foreground(&self) -> Result<Option<RolloverReport>, InfraError> {
        let mut state = self.lock_state()?;
        let now = self.calendar.now_millis();
        let inactive_millis = now.saturating_sub(state.last_active_millis);
        state.last_active_millis = now;
        let threshold = i64::try_from(self.settings.foreground_threshold.as_millis()).unwrap_or(i64::MAX);
        if inactive_millis <= threshold {
            return Ok(None);
        }
        Ok(self.roll_over_if_needed(&mut state))
    }

    fn roll_over_if_needed(&self, state: &mut PlannerState) -> Option<RolloverReport> {
        let new_date = self.calendar.current_date();
        if new_date == state.current_date {
            return None;
        }
        state.current_date = new_date.clone();
        let yesterday = self.calendar.yesterday();
        let report = retire_day(
            &mut state.collections.custom,
            &mut state.completed,
            yesterday,
            &new_date,
        );
        state.day_view.mark_dirty();
        self.persist(state, &[Stored::Tasks(TaskKind::Custom), Stored::Completed]);

        tracing::info!(
            new_date = %report.new_date,
            retired_day = %report.retired_day,
            advanced = report.advanced_task_ids.len(),
            "rolled over to new date"
        );
        Some(report)
    }

    pub fn day_view(&self) -> Result<Vec<Task>, InfraError> {
        let mut state = self.lock_state()?;
        Ok(state.refresh_view().to_vec())
    }

    pub fn completed_for(&self, day: DayOfWeek) -> Result<Vec<CompletedEntry>, InfraError> {
        Ok(self.lock_state()?.completed.entries(day).to_vec())
    }

    pub fn tasks(&self, kind: TaskKind) -> Result<Vec<Task>, InfraError> {
        Ok(self.lock_state()?.collections.get(kind).to_vec())
    }

    pub fn reminders(&self) -> Result<Vec<Reminder>, InfraError> {
        Ok(self.lock_state()?.reminders.clone())
    }

    pub fn selected_day(&self) -> Result<DayOfWeek, InfraError> {
        Ok(self.lock_state()?.selected_day)
    }

    pub fn current_date(&self) -> Result<String, InfraError> {
        Ok(self.lock_state()?.current_date.clone())
    }

    pub fn theme(&self) -> Result<ThemePreference, InfraError> {
        Ok(self.lock_state()?.theme)
    }

    pub fn error(&self) -> Option<String> {
        self.advisory.current()
    }

    pub fn dismiss_error(&self) {
        self.advisory.dismiss();
    }

    pub fn snapshot(&self) -> Result<PlannerSnapshot, InfraError> {
        let mut state = self.lock_state()?;
        let day_tasks = state.refresh_view().to_vec();
        Ok(PlannerSnapshot {
            selected_day: state.selected_day,
            current_date: state.current_date.clone(),
            day_tasks,
            completed_tasks: state.completed.entries(state.selected_day).to_vec(),
            reminders: state.reminders.clone(),
            theme: state.theme,
            error: self.advisory.current(),
        })
    }

    pub async fn flush(&self) {
        self.persistence.flush().await;
    }
}

async fn load_value<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    advisory: &Advisory,
) -> Option<T> {
    match store.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, error = %error, "stored value is unreadable; using default");
                advisory.report(LOAD_FAILURE_MESSAGE);
                None
            }
        },
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(key, error = %error, "failed to read stored value; using default");
            advisory.report(LOAD_FAILURE_MESSAGE);
            None
        }
    }
}

async fn load_theme(store: &dyn KeyValueStore) -> ThemePreference {
    match store.get(THEME_KEY).await {
        Ok(Some(raw)) => ThemePreference::parse_stored(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "unknown theme preference; using default");
            ThemePreference::default()
        }),
        Ok(None) => ThemePreference::default(),
        Err(error) => {
            tracing::warn!(error = %error, "failed to read theme preference; using default");
            ThemePreference::default()
        }
    }
}

fn retain_valid(tasks: Vec<Task>, kind: TaskKind) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|task| match task.validate(kind) {
            Ok(()) => true,
            Err(reason) => {
                tracing::warn!(key = tasks_key(kind), reason = %reason, "dropping invalid stored task");
                false
            }
        })
        .collect()
}
