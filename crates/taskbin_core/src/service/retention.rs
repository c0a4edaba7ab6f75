//! Recycle-bin retention policy.
//!
//! # Invariants
//! - A recycled task expires once `now - deleted_at >= window`; the exact
//!   boundary counts as expired.
//! - Tasks whose `deleted_at` lies after `now` are never expired.
//! - Sweeping twice with the same `now` discards nothing the second time.

use crate::model::task::Task;
use crate::store::RecycleSet;

/// Age-based expiry rule for recycled tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    window_ms: i64,
}

impl RetentionPolicy {
    pub fn new(window_ms: i64) -> Self {
        Self { window_ms }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Returns whether a task deleted at `deleted_at` is past retention at `now`.
    pub fn is_expired(&self, deleted_at: i64, now: i64) -> bool {
        now.saturating_sub(deleted_at) >= self.window_ms
    }

    /// First instant at which a task deleted at `deleted_at` is purged.
    pub fn expires_at(&self, deleted_at: i64) -> i64 {
        deleted_at.saturating_add(self.window_ms)
    }

    /// Removes expired tasks from `set` and returns them.
    pub fn sweep(&self, set: &mut RecycleSet, now: i64) -> Vec<Task> {
        set.retain(|task| match task.deleted_at {
            Some(deleted_at) => !self.is_expired(deleted_at, now),
            None => true,
        })
    }
}
