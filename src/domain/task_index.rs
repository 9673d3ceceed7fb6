use crate::domain::models::{DateKey, Task, TaskId};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Client-side cache of due tasks grouped by calendar day.
///
/// Each task lives in exactly one list, the one keyed by its due date, and a
/// key never maps to an empty list. The remote store stays the source of
/// truth: `reload` rebuilds everything from a fresh fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskIndex {
    tasks_by_date: BTreeMap<DateKey, Vec<Task>>,
}

impl TaskIndex {
    pub fn reload(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks_by_date.clear();
        for task in tasks {
            self.insert(task);
        }
    }

    /// Appends without checking for an existing entry with the same id.
    pub fn insert(&mut self, task: Task) {
        self.tasks_by_date
            .entry(task.date_key())
            .or_default()
            .push(task);
    }

    /// Replaces the cached copy of `task`, keeping its position when the due
    /// date is unchanged and moving it under the new key otherwise.
    /// Returns false when no cached task has that id.
    pub fn update(&mut self, task: Task) -> bool {
        let Some((cached_key, position)) = self.locate(&task.id) else {
            return false;
        };

        let new_key = task.date_key();
        if cached_key == new_key {
            if let Some(slot) = self
                .tasks_by_date
                .get_mut(&cached_key)
                .and_then(|tasks| tasks.get_mut(position))
            {
                *slot = task;
            }
            return true;
        }

        self.remove_at(&cached_key, position);
        self.insert(task);
        true
    }

    /// Removes the first task with `task_id`, dropping its key if the list
    /// becomes empty. Unknown ids are ignored.
    pub fn remove(&mut self, task_id: &TaskId) -> Option<Task> {
        let (key, position) = self.locate(task_id)?;
        self.remove_at(&key, position)
    }

    pub fn lookup(&self, date_key: &DateKey) -> &[Task] {
        self.tasks_by_date
            .get(date_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn lookup_date(&self, date: NaiveDate) -> &[Task] {
        self.lookup(&DateKey::from_date(date))
    }

    pub fn find(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks_by_date
            .values()
            .flatten()
            .find(|task| &task.id == task_id)
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.find(task_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks_by_date.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks_by_date.is_empty()
    }

    pub fn date_count(&self) -> usize {
        self.tasks_by_date.len()
    }

    fn locate(&self, task_id: &TaskId) -> Option<(DateKey, usize)> {
        self.tasks_by_date.iter().find_map(|(key, tasks)| {
            tasks
                .iter()
                .position(|task| &task.id == task_id)
                .map(|position| (key.clone(), position))
        })
    }

    fn remove_at(&mut self, key: &DateKey, position: usize) -> Option<Task> {
        let tasks = self.tasks_by_date.get_mut(key)?;
        if position >= tasks.len() {
            return None;
        }
        let removed = tasks.remove(position);
        if tasks.is_empty() {
            self.tasks_by_date.remove(key);
        }
        Some(removed)
    }
}
