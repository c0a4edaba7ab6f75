//! Live tasks in insertion order.

use super::{OrderedTasks, StoreError, StoreResult};
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskValidationError};

/// Ordered collection of live tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet {
    tasks: OrderedTasks,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a set from persisted records.
    ///
    /// # Errors
    /// - `StillRecycled` when a record carries `deleted_at`.
    /// - `DuplicateId` when two records share an id.
    pub fn from_tasks(tasks: Vec<Task>) -> StoreResult<Self> {
        if let Some(task) = tasks.iter().find(|task| task.is_recycled()) {
            return Err(StoreError::StillRecycled(task.id));
        }
        Ok(Self {
            tasks: OrderedTasks::from_vec(tasks)?,
        })
    }

    /// Creates a task from a draft, assigning a fresh id and creation time.
    pub fn create(&mut self, draft: TaskDraft, now: i64) -> Result<&Task, TaskValidationError> {
        let task = Task::from_draft(draft, now)?;
        self.tasks.items.push(task);
        let last = self.tasks.items.len() - 1;
        Ok(&self.tasks.items[last])
    }

    /// Appends a transferred record (e.g. one coming back from the recycle set).
    pub fn insert(&mut self, task: Task) -> StoreResult<()> {
        if task.is_recycled() {
            return Err(StoreError::StillRecycled(task.id));
        }
        self.tasks.push(task)
    }

    pub fn get(&self, id: TaskId) -> StoreResult<&Task> {
        self.tasks.get(id)
    }

    /// Applies a validated patch in place and stamps `updated_at`.
    ///
    /// Returns `Ok(Err(_))` when the id exists but the patch is invalid.
    pub fn update(
        &mut self,
        id: TaskId,
        patch: &TaskPatch,
        now: i64,
    ) -> StoreResult<Result<&Task, TaskValidationError>> {
        let task = self.tasks.get_mut(id)?;
        Ok(match task.apply_patch(patch, now) {
            Ok(()) => Ok(&*task),
            Err(err) => Err(err),
        })
    }

    pub fn toggle_complete(&mut self, id: TaskId, now: i64) -> StoreResult<&Task> {
        let task = self.tasks.get_mut(id)?;
        task.toggle_complete(now);
        Ok(task)
    }

    /// Removes a task and hands ownership to the caller for transfer.
    pub fn remove(&mut self, id: TaskId) -> StoreResult<Task> {
        self.tasks.remove(id)
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks.items
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
    use super::ActiveSet;
    use crate::model::task::{TaskDraft, TaskPatch};
    use crate::store::StoreError;
    use uuid::Uuid;

    #[test]
    fn create_preserves_insertion_order() {
        let mut set = ActiveSet::new();
        set.create(TaskDraft::new("first"), 1).unwrap();
        set.create(TaskDraft::new("second"), 2).unwrap();

        let titles: Vec<_> = set.list().iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
    }

    #[test]
    fn update_stamps_updated_at() {
        let mut set = ActiveSet::new();
        let id = set.create(TaskDraft::new("draft"), 1).unwrap().id;
        let patch = TaskPatch {
            title: Some("final".to_string()),
            ..TaskPatch::default()
        };

        let task = set.update(id, &patch, 7).unwrap().unwrap();
        assert_eq!(task.title, "final");
        assert_eq!(task.updated_at, Some(7));
    }

    #[test]
    fn missing_ids_fail_with_not_found() {
        let mut set = ActiveSet::new();
        let id = Uuid::new_v4();

        assert_eq!(set.get(id).unwrap_err(), StoreError::NotFound(id));
        assert_eq!(set.remove(id).unwrap_err(), StoreError::NotFound(id));
        assert_eq!(set.toggle_complete(id, 1).unwrap_err(), StoreError::NotFound(id));
    }

    #[test]
    fn insert_rejects_recycled_records() {
        let mut set = ActiveSet::new();
        let mut task = crate::model::task::Task::from_draft(TaskDraft::new("x"), 0).unwrap();
        task.mark_deleted(5);

        assert_eq!(set.insert(task.clone()), Err(StoreError::StillRecycled(task.id)));
    }
}
