//! Task list orchestration.
//!
//! # Responsibility
//! - Translate user intents into store round trips.
//! - Keep the in-memory display list mirroring persisted rows.
//!
//! # Invariants
//! - The list matches the store after every returned operation: a failed
//!   write never leaves a phantom, half-toggled, or prematurely removed
//!   task behind.
//! - Each mutating operation completes its store round trip before
//!   returning; `&mut self` receivers keep operations one at a time, so at
//!   most one mutation per task id is ever in flight.
//! - Blank or placeholder input is rejected before any store call.

use crate::model::task::Task;
use crate::repo::task_repo::{RepoError, RepoResult, TaskRepository};
use log::{info, warn};

/// User intent toward the task list, as produced by the visual layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIntent {
    /// Add a task with the given raw input text.
    Add(String),
    /// Flip completion of the task with the given store id.
    Toggle(i64),
    /// Remove the task with the given store id.
    Remove(i64),
}

/// Use-case service keeping an ordered task list in sync with a store.
///
/// The list preserves insertion order, which is also display order.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    tasks: Vec<Task>,
    input_placeholder: Option<String>,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            tasks: Vec::new(),
            input_placeholder: None,
        }
    }

    /// Registers the input-field placeholder text to reject as non-input.
    pub fn with_input_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.input_placeholder = Some(placeholder.into());
        self
    }

    /// Replaces the in-memory list with the store's current rows.
    ///
    /// Called once after connect; the returned snapshot is the first one
    /// the visual layer renders.
    pub fn load_tasks(&mut self) -> RepoResult<&[Task]> {
        self.tasks = self.repo.fetch_all()?;
        info!(
            "event=tasks_loaded module=service status=ok count={}",
            self.tasks.len()
        );
        Ok(&self.tasks)
    }

    /// Current ordered snapshot for rendering.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Validates input and persists a new task.
    ///
    /// # Contract
    /// - Blank or placeholder input returns `Ok(None)` with zero store
    ///   operations issued.
    /// - On store failure the task is not appended to the list.
    /// - On success the store-assigned id is recorded and the appended
    ///   task is returned.
    pub fn add_task(&mut self, input: &str) -> RepoResult<Option<&Task>> {
        let Some(text) = self.accept_input(input) else {
            return Ok(None);
        };

        let mut task = Task::new(text);
        let id = self.repo.add_task(&task)?;
        task.id = Some(id);
        info!("event=task_added module=service status=ok id={id}");

        self.tasks.push(task);
        Ok(self.tasks.last())
    }

    /// Flips completion for `id` and persists the new state.
    ///
    /// # Contract
    /// - Flip-then-persist is one logical unit: a failed write rolls the
    ///   in-memory flip back so `done`/`status` keep the last persisted
    ///   value.
    /// - A missing row resynchronizes the list from the store.
    pub fn toggle_task(&mut self, id: i64) -> RepoResult<&Task> {
        let Some(index) = self.index_of(id) else {
            let err = RepoError::NotFound(id);
            self.recover_not_found(&err);
            return Err(err);
        };

        self.tasks[index].toggle_done();
        let (status, done) = {
            let task = &self.tasks[index];
            (task.status, task.done)
        };

        match self.repo.update_task(status, done, id) {
            Ok(()) => {
                info!("event=task_toggled module=service status=ok id={id} done={done}");
                Ok(&self.tasks[index])
            }
            Err(err) => {
                self.tasks[index].toggle_done();
                warn!("event=task_toggled module=service status=error id={id} error={err}");
                self.recover_not_found(&err);
                Err(err)
            }
        }
    }

    /// Removes the task identified by `id` from the store and the list.
    ///
    /// # Contract
    /// - The store delete runs first; a failed delete leaves the list
    ///   intact.
    /// - A missing row resynchronizes the list from the store.
    pub fn remove_task(&mut self, id: i64) -> RepoResult<()> {
        let Some(index) = self.index_of(id) else {
            let err = RepoError::NotFound(id);
            self.recover_not_found(&err);
            return Err(err);
        };

        match self.repo.remove_task(id) {
            Ok(()) => {
                self.tasks.remove(index);
                info!("event=task_removed module=service status=ok id={id}");
                Ok(())
            }
            Err(err) => {
                warn!("event=task_removed module=service status=error id={id} error={err}");
                self.recover_not_found(&err);
                Err(err)
            }
        }
    }

    /// Dispatches one user intent and reports its completion.
    pub fn apply(&mut self, intent: TaskIntent) -> RepoResult<()> {
        match intent {
            TaskIntent::Add(text) => self.add_task(&text).map(|_| ()),
            TaskIntent::Toggle(id) => self.toggle_task(id).map(|_| ()),
            TaskIntent::Remove(id) => self.remove_task(id),
        }
    }

    fn accept_input(&self, input: &str) -> Option<String> {
        if self.input_placeholder.as_deref() == Some(input) {
            return None;
        }

        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        Some(text.to_string())
    }

    fn index_of(&self, id: i64) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == Some(id))
    }

    /// Reloads the list from the store after a `NotFound`, the one case
    /// where memory and store are known to have diverged.
    fn recover_not_found(&mut self, err: &RepoError) {
        let RepoError::NotFound(id) = err else {
            return;
        };

        match self.repo.fetch_all() {
            Ok(tasks) => {
                info!(
                    "event=tasks_resynced module=service status=ok missing_id={id} count={}",
                    tasks.len()
                );
                self.tasks = tasks;
            }
            Err(resync_err) => {
                warn!(
                    "event=tasks_resynced module=service status=error missing_id={id} error={resync_err}"
                );
            }
        }
    }
}
