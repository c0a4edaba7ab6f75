//! Non-durable repository kept entirely in process memory.

use crate::model::task::Task;
use crate::repo::task_repo::{RepoResult, TaskRepository};

/// In-memory task repository, mostly for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskRepository {
    active: Vec<Task>,
    recycle: Vec<Task>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with pre-existing state.
    pub fn with_tasks(active: Vec<Task>, recycle: Vec<Task>) -> Self {
        Self { active, recycle }
    }
}

impl TaskRepository for MemoryTaskRepository {
    fn load_active(&self) -> RepoResult<Vec<Task>> {
        Ok(self.active.clone())
    }

    fn save_active(&mut self, tasks: &[Task]) -> RepoResult<()> {
        self.active = tasks.to_vec();
        Ok(())
    }

    fn load_recycle(&self) -> RepoResult<Vec<Task>> {
        Ok(self.recycle.clone())
    }

    fn save_recycle(&mut self, tasks: &[Task]) -> RepoResult<()> {
        self.recycle = tasks.to_vec();
        Ok(())
    }
}
