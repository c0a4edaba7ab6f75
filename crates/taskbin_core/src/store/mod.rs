//! In-memory task sets owned by the lifecycle manager.
//!
//! # Responsibility
//! - Hold active and recycled tasks as ordered, id-keyed collections.
//! - Move records by value so no task is referenced by both sets.
//!
//! # Invariants
//! - Insertion order is preserved for listing.
//! - A set never contains two records with the same id.
//! - `RecycleSet` only accepts records with `deleted_at` stamped;
//!   `ActiveSet` only accepts records without it.

use crate::model::task::{Task, TaskId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod active_set;
pub mod recycle_set;

pub use active_set::ActiveSet;
pub use recycle_set::RecycleSet;

pub type StoreResult<T> = Result<T, StoreError>;

/// Set-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(TaskId),
    DuplicateId(TaskId),
    /// Record was offered to the recycle set without `deleted_at`.
    NotRecycled(TaskId),
    /// Record was offered to the active set while still carrying `deleted_at`.
    StillRecycled(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::DuplicateId(id) => write!(f, "task id already present: {id}"),
            Self::NotRecycled(id) => write!(f, "task {id} has no deleted_at stamp"),
            Self::StillRecycled(id) => write!(f, "task {id} still carries deleted_at"),
        }
    }
}

impl Error for StoreError {}

/// Shared ordered storage used by both sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct OrderedTasks {
    items: Vec<Task>,
}

impl OrderedTasks {
    fn from_vec(items: Vec<Task>) -> StoreResult<Self> {
        let mut ordered = Self::default();
        for task in items {
            ordered.push(task)?;
        }
        Ok(ordered)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.items.iter().position(|task| task.id == id)
    }

    fn contains(&self, id: TaskId) -> bool {
        self.position(id).is_some()
    }

    fn push(&mut self, task: Task) -> StoreResult<()> {
        if self.contains(task.id) {
            return Err(StoreError::DuplicateId(task.id));
        }
        self.items.push(task);
        Ok(())
    }

    fn get(&self, id: TaskId) -> StoreResult<&Task> {
        self.items
            .iter()
            .find(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn get_mut(&mut self, id: TaskId) -> StoreResult<&mut Task> {
        self.items
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn remove(&mut self, id: TaskId) -> StoreResult<Task> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        Ok(self.items.remove(index))
    }
}
