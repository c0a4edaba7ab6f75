//! Task lifecycle manager.
//!
//! # Responsibility
//! - Mediate every transition between the active and recycle sets.
//! - Enforce recycle-bin retention on maintenance runs and bin views.
//! - Keep callers independent from persistence details.
//!
//! # Invariants
//! - A task id is in at most one set; moves are by value, never copies.
//! - Each mutating operation runs inside one repository unit of work:
//!   load both sets, mutate in memory, save what it touched, commit.
//!   A failed operation rolls back and leaves storage untouched.
//! - `restored_at` is reset on every delete.

use crate::config::LifecycleConfig;
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::service::retention::RetentionPolicy;
use crate::store::{ActiveSet, RecycleSet, StoreError};
use log::{debug, info, warn};
use mockable::Clock;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Failures surfaced by lifecycle operations.
#[derive(Debug)]
pub enum LifecycleError {
    /// Id absent from the set the operation targets.
    NotFound(TaskId),
    /// Rejected input; no store was touched.
    Validation(TaskValidationError),
    /// Storage read/write failure. Not retried.
    Persistence(RepoError),
    /// Loaded state breaks a set invariant (duplicate or misplaced record).
    InconsistentState(String),
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for LifecycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::NotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<TaskValidationError> for LifecycleError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for LifecycleError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

impl From<StoreError> for LifecycleError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::InconsistentState(other.to_string()),
        }
    }
}

/// One row of the recycle-bin view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecycledEntry {
    pub task: Task,
    /// Epoch milliseconds at which the retention sweep purges this task.
    pub expires_at: i64,
}

/// Recycle-bin contents after read-time compaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecycleBinView {
    /// Clock reading used for the compaction sweep.
    pub viewed_at: i64,
    /// Number of expired tasks purged while opening the view.
    pub purged: usize,
    /// Remaining entries in deletion order.
    pub entries: Vec<RecycledEntry>,
}

/// Owns both task sets through an injected repository and clock.
pub struct LifecycleManager<R: TaskRepository, C: Clock> {
    repo: R,
    clock: Arc<C>,
    retention: RetentionPolicy,
}

impl<R: TaskRepository, C: Clock> LifecycleManager<R, C> {
    /// Creates a manager without touching storage.
    pub fn new(repo: R, clock: Arc<C>, config: LifecycleConfig) -> Self {
        Self {
            repo,
            clock,
            retention: RetentionPolicy::new(config.retention_window_ms()),
        }
    }

    /// Creates a manager and verifies persisted state once.
    ///
    /// # Errors
    /// - `Persistence` when either set cannot be loaded.
    /// - `InconsistentState` when an id appears twice or in both sets.
    pub fn open(repo: R, clock: Arc<C>, config: LifecycleConfig) -> LifecycleResult<Self> {
        let manager = Self::new(repo, clock, config);
        let (active, recycle) = manager.load_sets()?;
        info!(
            "event=lifecycle_open module=lifecycle status=ok active={} recycled={} retention_ms={}",
            active.len(),
            recycle.len(),
            manager.retention.window_ms()
        );
        Ok(manager)
    }

    /// Borrows the repository, e.g. for inspection in tests.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates an active task.
    pub fn create(&mut self, draft: TaskDraft) -> LifecycleResult<Task> {
        self.unit_of_work("task_create", |this| {
            let (mut active, _) = this.load_sets()?;
            let task = active.create(draft, this.now_ms())?.clone();
            this.repo.save_active(active.list())?;
            info!(
                "event=task_create module=lifecycle status=ok task_id={}",
                task.id
            );
            Ok(task)
        })
    }

    pub fn get(&self, id: TaskId) -> LifecycleResult<Task> {
        let (active, _) = self.load_sets()?;
        Ok(active.get(id)?.clone())
    }

    /// Lists active tasks in insertion order.
    pub fn list_active(&self) -> LifecycleResult<Vec<Task>> {
        let (active, _) = self.load_sets()?;
        Ok(active.into_tasks())
    }

    /// Lists active tasks whose category equals `category` exactly.
    pub fn list_active_by_category(&self, category: &str) -> LifecycleResult<Vec<Task>> {
        let category = category.trim();
        Ok(self
            .list_active()?
            .into_iter()
            .filter(|task| task.category.as_deref() == Some(category))
            .collect())
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> LifecycleResult<Task> {
        self.unit_of_work("task_toggle", |this| {
            let (mut active, _) = this.load_sets()?;
            let task = active.toggle_complete(id, this.now_ms())?.clone();
            this.repo.save_active(active.list())?;
            info!(
                "event=task_toggle module=lifecycle status=ok task_id={} completed={}",
                id, task.completed
            );
            Ok(task)
        })
    }

    /// Applies a field patch to an active task.
    ///
    /// An empty patch returns the task unchanged without writing.
    pub fn edit(&mut self, id: TaskId, patch: &TaskPatch) -> LifecycleResult<Task> {
        if patch.is_empty() {
            return self.get(id);
        }
        self.unit_of_work("task_edit", |this| {
            let (mut active, _) = this.load_sets()?;
            let task = active.update(id, patch, this.now_ms())??.clone();
            this.repo.save_active(active.list())?;
            info!("event=task_edit module=lifecycle status=ok task_id={id}");
            Ok(task)
        })
    }

    /// Moves an active task into the recycle bin.
    pub fn delete(&mut self, id: TaskId) -> LifecycleResult<Task> {
        self.unit_of_work("task_delete", |this| {
            let (mut active, mut recycle) = this.load_sets()?;
            let mut task = active.remove(id)?;
            task.mark_deleted(this.now_ms());
            recycle.insert(task.clone())?;
            this.repo.save_both(active.list(), recycle.list())?;
            info!("event=task_delete module=lifecycle status=ok task_id={id}");
            Ok(task)
        })
    }

    /// Moves a recycled task back into the active set.
    pub fn restore(&mut self, id: TaskId) -> LifecycleResult<Task> {
        self.unit_of_work("task_restore", |this| {
            let (mut active, mut recycle) = this.load_sets()?;
            let mut task = recycle.remove(id)?;
            task.mark_restored(this.now_ms());
            active.insert(task.clone())?;
            this.repo.save_both(active.list(), recycle.list())?;
            info!("event=task_restore module=lifecycle status=ok task_id={id}");
            Ok(task)
        })
    }

    /// Permanently removes one recycled task.
    pub fn purge_one(&mut self, id: TaskId) -> LifecycleResult<Task> {
        self.unit_of_work("task_purge", |this| {
            let (_, mut recycle) = this.load_sets()?;
            let task = recycle.remove(id)?;
            this.repo.save_recycle(recycle.list())?;
            info!("event=task_purge module=lifecycle status=ok task_id={id}");
            Ok(task)
        })
    }

    /// Permanently removes every recycled task, returning how many were dropped.
    pub fn empty_recycle_bin(&mut self) -> LifecycleResult<usize> {
        self.unit_of_work("recycle_empty", |this| {
            let (_, mut recycle) = this.load_sets()?;
            let purged = recycle.clear().len();
            if purged > 0 {
                this.repo.save_recycle(recycle.list())?;
            }
            info!("event=recycle_empty module=lifecycle status=ok purged={purged}");
            Ok(purged)
        })
    }

    /// Discards recycled tasks at or past the retention window as of `now`.
    pub fn sweep(&mut self, now: i64) -> LifecycleResult<usize> {
        self.unit_of_work("recycle_sweep", |this| {
            let (_, mut recycle) = this.load_sets()?;
            this.sweep_loaded(&mut recycle, now)
        })
    }

    /// Maintenance trigger: sweeps using the manager clock.
    pub fn run_maintenance(&mut self) -> LifecycleResult<usize> {
        let now = self.now_ms();
        self.sweep(now)
    }

    /// Opens the recycle bin, compacting expired entries first.
    pub fn open_recycle_bin(&mut self) -> LifecycleResult<RecycleBinView> {
        self.unit_of_work("recycle_view", |this| {
            let (_, mut recycle) = this.load_sets()?;
            let now = this.now_ms();
            let purged = this.sweep_loaded(&mut recycle, now)?;
            let retention = this.retention;
            let entries = recycle
                .into_tasks()
                .into_iter()
                .map(|task| {
                    let expires_at = retention.expires_at(task.deleted_at.unwrap_or(now));
                    RecycledEntry { task, expires_at }
                })
                .collect();
            Ok(RecycleBinView {
                viewed_at: now,
                purged,
                entries,
            })
        })
    }

    fn now_ms(&self) -> i64 {
        self.clock.utc().timestamp_millis()
    }

    /// Runs `op` between `begin` and `commit`; rolls back on any error.
    fn unit_of_work<T, F>(&mut self, event: &str, op: F) -> LifecycleResult<T>
    where
        F: FnOnce(&mut Self) -> LifecycleResult<T>,
    {
        self.repo.begin()?;
        let result = op(self).and_then(|value| {
            self.repo.commit()?;
            Ok(value)
        });
        if let Err(err) = &result {
            self.repo.rollback();
            warn!("event={event} module=lifecycle status=error error={err}");
        }
        result
    }

    fn sweep_loaded(&mut self, recycle: &mut RecycleSet, now: i64) -> LifecycleResult<usize> {
        let discarded = self.retention.sweep(recycle, now);
        if !discarded.is_empty() {
            self.repo.save_recycle(recycle.list())?;
        }
        for task in &discarded {
            debug!(
                "event=recycle_sweep_item module=lifecycle task_id={} deleted_at={}",
                task.id,
                task.deleted_at.unwrap_or_default()
            );
        }
        info!(
            "event=recycle_sweep module=lifecycle status=ok now={} discarded={} remaining={}",
            now,
            discarded.len(),
            recycle.len()
        );
        Ok(discarded.len())
    }

    fn load_sets(&self) -> LifecycleResult<(ActiveSet, RecycleSet)> {
        let active = ActiveSet::from_tasks(self.repo.load_active()?)?;
        let recycle = RecycleSet::from_tasks(self.repo.load_recycle()?)?;

        let active_ids: HashSet<TaskId> = active.list().iter().map(|task| task.id).collect();
        if let Some(task) = recycle
            .list()
            .iter()
            .find(|task| active_ids.contains(&task.id))
        {
            warn!(
                "event=lifecycle_load module=lifecycle status=error error_code=id_in_both_sets task_id={}",
                task.id
            );
            return Err(LifecycleError::InconsistentState(format!(
                "task {} is present in both active and recycle sets",
                task.id
            )));
        }

        Ok((active, recycle))
    }
}
