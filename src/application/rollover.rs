use crate::application::planner::Planner;
use crate::domain::models::{CompletedLog, DayOfWeek, Task, TaskKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverReport {
    pub new_date: String,
    pub retired_day: DayOfWeek,
    pub cleared_completions: bool,
    pub advanced_task_ids: Vec<String>,
}

/// End-of-day bookkeeping for the weekday that just ended: drops its
/// completion log and moves its custom tasks to the following weekday.
pub fn retire_day(
    custom_tasks: &mut [Task],
    completed_log: &mut CompletedLog,
    yesterday: DayOfWeek,
    new_date: &str,
) -> RolloverReport {
    let cleared_completions = completed_log.clear(yesterday);
    let next_day = yesterday.next();
    let mut advanced_task_ids = Vec::new();
    for task in custom_tasks
        .iter_mut()
        .filter(|task| task.kind == TaskKind::Custom && task.day == Some(yesterday))
    {
        task.completed = false;
        task.day = Some(next_day);
        task.date = Some(new_date.to_string());
        advanced_task_ids.push(task.id.clone());
    }

    RolloverReport {
        new_date: new_date.to_string(),
        retired_day: yesterday,
        cleared_completions,
        advanced_task_ids,
    }
}

pub struct RolloverMonitor {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl RolloverMonitor {
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RolloverMonitor {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

pub fn spawn_rollover_monitor(planner: Arc<Planner>, period: Duration) -> RolloverMonitor {
    let (shutdown, mut stopped) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = planner.check_for_rollover() {
                        tracing::error!(error = %error, "rollover check failed");
                    }
                }
                changed = stopped.changed() => {
                    if changed.is_err() || *stopped.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("rollover monitor stopped");
    });
    RolloverMonitor {
        shutdown,
        handle: Some(handle),
    }
}
