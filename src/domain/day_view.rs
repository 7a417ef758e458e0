use crate::domain::models::{CompletedLog, DayOfWeek, Task, TaskCollections, TaskKind};
use std::collections::HashSet;

pub fn derive_day_view(
    collections: &TaskCollections,
    day: DayOfWeek,
    completed_log: &CompletedLog,
) -> Vec<Task> {
    let completed_ids = completed_log.completed_ids(day);
    TaskKind::ALL
        .iter()
        .flat_map(|kind| group_view(collections.get(*kind), day, &completed_ids))
        .collect()
}

pub fn group_view(tasks: &[Task], day: DayOfWeek, completed_ids: &HashSet<&str>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.qualifies_for(day) && !completed_ids.contains(task.id.as_str()))
        .cloned()
        .collect()
}

/// Cached projection of the selected day.
///
/// Mutations either patch the cache in place (adding a custom task for the
/// selected day, completing a task) or mark it dirty; a dirty cache is
/// rebuilt from scratch on the next `refresh`. Both paths produce the same
/// list for the same canonical state.
#[derive(Debug, Clone, Default)]
pub struct DayView {
    tasks: Vec<Task>,
    dirty: bool,
}

impl DayView {
    pub fn dirty() -> Self {
        Self {
            tasks: Vec::new(),
            dirty: true,
        }
    }

    #[cfg(test)]
    fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn refresh(
        &mut self,
        collections: &TaskCollections,
        day: DayOfWeek,
        completed_log: &CompletedLog,
    ) -> &[Task] {
        if self.dirty {
            self.tasks = derive_day_view(collections, day, completed_log);
            self.dirty = false;
        }
        &self.tasks
    }

    #[cfg(test)]
    fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn append_custom(&mut self, task: Task) {
        debug_assert_eq!(task.kind, TaskKind::Custom);
        if !self.dirty {
            self.tasks.push(task);
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn replace_group(&mut self, kind: TaskKind, sublist: Vec<Task>) {
        if self.dirty {
            return;
        }
        let existing = std::mem::take(&mut self.tasks);
        let mut rebuilt = Vec::with_capacity(existing.len() + sublist.len());
        let mut sublist = Some(sublist);
        for section in TaskKind::ALL {
            if section == kind {
                rebuilt.extend(sublist.take().unwrap_or_default());
            } else {
                rebuilt.extend(existing.iter().filter(|task| task.kind == section).cloned());
            }
        }
        self.tasks = rebuilt;
    }
}
