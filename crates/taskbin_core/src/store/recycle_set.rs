//! Soft-deleted tasks awaiting purge.

use super::{OrderedTasks, StoreError, StoreResult};
use crate::model::task::{Task, TaskId};

/// Ordered collection of recycled tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecycleSet {
    tasks: OrderedTasks,
}

impl RecycleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a set from persisted records.
    ///
    /// # Errors
    /// - `NotRecycled` when a record lacks `deleted_at`.
    /// - `DuplicateId` when two records share an id.
    pub fn from_tasks(tasks: Vec<Task>) -> StoreResult<Self> {
        if let Some(task) = tasks.iter().find(|task| !task.is_recycled()) {
            return Err(StoreError::NotRecycled(task.id));
        }
        Ok(Self {
            tasks: OrderedTasks::from_vec(tasks)?,
        })
    }

    /// Inserts a record whose `deleted_at` the caller already stamped.
    pub fn insert(&mut self, task: Task) -> StoreResult<()> {
        if !task.is_recycled() {
            return Err(StoreError::NotRecycled(task.id));
        }
        self.tasks.push(task)
    }

    pub fn get(&self, id: TaskId) -> StoreResult<&Task> {
        self.tasks.get(id)
    }

    pub fn remove(&mut self, id: TaskId) -> StoreResult<Task> {
        self.tasks.remove(id)
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks.items
    }

    /// Keeps records matching `keep` and returns the discarded ones in order.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<Task>
    where
        F: FnMut(&Task) -> bool,
    {
        let (kept, discarded): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks.items)
            .into_iter()
            .partition(|task| keep(task));
        self.tasks.items = kept;
        discarded
    }

    /// Drops every record, returning them.
    pub fn clear(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks.items)
    }

    pub fn len(&self) -> usize {
        self.tasks.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.items.is_empty()
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks.items
    }
}

#[cfg(test)]
mod tests {
    use super::RecycleSet;
    use crate::model::task::{Task, TaskDraft};
    use crate::store::StoreError;

    fn recycled(title: &str, deleted_at: i64) -> Task {
        let mut task = Task::from_draft(TaskDraft::new(title), 0).unwrap();
        task.mark_deleted(deleted_at);
        task
    }

    #[test]
    fn insert_requires_deleted_at() {
        let mut set = RecycleSet::new();
        let task = Task::from_draft(TaskDraft::new("live"), 0).unwrap();

        assert_eq!(set.insert(task.clone()), Err(StoreError::NotRecycled(task.id)));
        assert!(set.is_empty());
    }

    #[test]
    fn retain_splits_and_keeps_order() {
        let mut set = RecycleSet::new();
        set.insert(recycled("a", 10)).unwrap();
        set.insert(recycled("b", 20)).unwrap();
        set.insert(recycled("c", 30)).unwrap();

        let discarded = set.retain(|task| task.deleted_at != Some(20));
        assert_eq!(discarded.len(), 1);
        assert_eq!(discarded[0].title, "b");

        let titles: Vec<_> = set.list().iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, ["a", "c"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut set = RecycleSet::new();
        let task = recycled("dup", 1);
        set.insert(task.clone()).unwrap();

        assert_eq!(set.insert(task.clone()), Err(StoreError::DuplicateId(task.id)));
        assert_eq!(set.len(), 1);
    }
}
