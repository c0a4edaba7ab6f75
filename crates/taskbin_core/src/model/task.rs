//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its create/edit request shapes.
//! - Provide lifecycle helpers for recycle-bin transitions.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is non-empty after trimming.
//! - `restored_at`, when set, is never earlier than the `deleted_at` it cleared.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task.
pub type TaskId = Uuid;

/// Maximum accepted title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

static DUE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid due date regex")
});

/// Validation errors for task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    TitleTooLong { chars: usize },
    InvalidDueDate(String),
    EmptyCategory,
    /// `deleted_at` presence disagrees with the set holding the record.
    DeletedAtMismatch { id: TaskId, recycled: bool },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::TitleTooLong { chars } => write!(
                f,
                "task title has {chars} characters; at most {TITLE_MAX_CHARS} allowed"
            ),
            Self::InvalidDueDate(value) => {
                write!(f, "invalid due date `{value}`; expected YYYY-MM-DD")
            }
            Self::EmptyCategory => write!(f, "task category cannot be blank"),
            Self::DeletedAtMismatch { id, recycled: true } => {
                write!(f, "recycled task {id} is missing deleted_at")
            }
            Self::DeletedAtMismatch { id, recycled: false } => {
                write!(f, "active task {id} carries deleted_at")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    /// Calendar date in `YYYY-MM-DD` form.
    pub due_date: Option<String>,
    pub category: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub updated_at: Option<i64>,
    /// Present only while the task is in the recycle set.
    pub deleted_at: Option<i64>,
    /// Most recent restoration; reset on every delete.
    pub restored_at: Option<i64>,
}

impl Task {
    /// Builds a new active task from a validated draft.
    ///
    /// # Errors
    /// - Returns the first field validation failure of `draft`.
    pub fn from_draft(draft: TaskDraft, created_at: i64) -> Result<Self, TaskValidationError> {
        Self::from_draft_with_id(Uuid::new_v4(), draft, created_at)
    }

    /// Same as [`Task::from_draft`] with a caller-provided stable ID.
    ///
    /// Used by import paths and tests that need deterministic identity.
    pub fn from_draft_with_id(
        id: TaskId,
        draft: TaskDraft,
        created_at: i64,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            title: draft.title.trim().to_string(),
            completed: false,
            due_date: draft.due_date.map(|value| value.trim().to_string()),
            category: draft.category.map(|value| value.trim().to_string()),
            created_at,
            updated_at: None,
            deleted_at: None,
            restored_at: None,
        };
        task.validate()?;
        Ok(task)
    }

    /// Validates user-editable fields.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)?;
        if let Some(due_date) = self.due_date.as_deref() {
            validate_due_date(due_date)?;
        }
        if let Some(category) = self.category.as_deref() {
            validate_category(category)?;
        }
        Ok(())
    }

    /// Applies a field patch. Nothing changes when validation fails.
    pub fn apply_patch(&mut self, patch: &TaskPatch, now: i64) -> Result<(), TaskValidationError> {
        let mut next = self.clone();
        if let Some(title) = patch.title.as_deref() {
            next.title = title.trim().to_string();
        }
        if let Some(due_date) = patch.due_date.as_ref() {
            next.due_date = due_date.as_deref().map(|value| value.trim().to_string());
        }
        if let Some(category) = patch.category.as_ref() {
            next.category = category.as_deref().map(|value| value.trim().to_string());
        }
        next.validate()?;
        next.updated_at = Some(now);
        *self = next;
        Ok(())
    }

    /// Flips the completion flag.
    pub fn toggle_complete(&mut self, now: i64) {
        self.completed = !self.completed;
        self.updated_at = Some(now);
    }

    /// Stamps recycle-bin entry.
    ///
    /// `restored_at` is cleared so it always describes the latest restore.
    pub fn mark_deleted(&mut self, now: i64) {
        self.deleted_at = Some(now);
        self.restored_at = None;
    }

    /// Clears recycle-bin state and stamps restoration time.
    pub fn mark_restored(&mut self, now: i64) {
        let deleted_at = self.deleted_at.take().unwrap_or(now);
        self.restored_at = Some(now.max(deleted_at));
    }

    /// Returns whether this task currently belongs in the recycle set.
    pub fn is_recycled(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for task creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Partial edit for an active task.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub due_date: Option<Option<String>>,
    pub category: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.due_date.is_none() && self.category.is_none()
    }
}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    let chars = title.chars().count();
    if chars > TITLE_MAX_CHARS {
        return Err(TaskValidationError::TitleTooLong { chars });
    }
    Ok(())
}

fn validate_due_date(value: &str) -> Result<(), TaskValidationError> {
    if DUE_DATE_RE.is_match(value) {
        Ok(())
    } else {
        Err(TaskValidationError::InvalidDueDate(value.to_string()))
    }
}

fn validate_category(value: &str) -> Result<(), TaskValidationError> {
    if value.trim().is_empty() {
        return Err(TaskValidationError::EmptyCategory);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskDraft, TaskPatch, TaskValidationError};

    #[test]
    fn draft_trims_title_and_rejects_blank() {
        let task = Task::from_draft(TaskDraft::new("  Buy milk "), 10).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.created_at, 10);

        let err = Task::from_draft(TaskDraft::new("   "), 10).unwrap_err();
        assert_eq!(err, TaskValidationError::EmptyTitle);
    }

    #[test]
    fn due_date_requires_calendar_shape() {
        let ok = Task::from_draft(TaskDraft::new("a").with_due_date("2026-02-28"), 0);
        assert!(ok.is_ok());

        let err = Task::from_draft(TaskDraft::new("a").with_due_date("2026-13-01"), 0).unwrap_err();
        assert!(matches!(err, TaskValidationError::InvalidDueDate(_)));
    }

    #[test]
    fn failed_patch_leaves_task_untouched() {
        let mut task = Task::from_draft(TaskDraft::new("keep"), 0).unwrap();
        let patch = TaskPatch {
            title: Some(" ".to_string()),
            category: Some(Some("home".to_string())),
            ..TaskPatch::default()
        };

        assert!(task.apply_patch(&patch, 5).is_err());
        assert_eq!(task.title, "keep");
        assert_eq!(task.category, None);
        assert_eq!(task.updated_at, None);
    }

    #[test]
    fn restore_never_predates_deletion() {
        let mut task = Task::from_draft(TaskDraft::new("clock skew"), 0).unwrap();
        task.mark_deleted(1_000);
        task.mark_restored(500);
        assert_eq!(task.deleted_at, None);
        assert_eq!(task.restored_at, Some(1_000));
    }
}
