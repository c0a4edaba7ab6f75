//! Core domain logic for taskbin.
//! This crate owns the task lifecycle: active tasks, the recycle bin, and
//! its retention sweep.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{parse_retention_window, ConfigError, LifecycleConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskValidationError};
pub use repo::memory_repo::MemoryTaskRepository;
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::lifecycle_service::{
    LifecycleError, LifecycleManager, LifecycleResult, RecycleBinView, RecycledEntry,
};
pub use service::retention::RetentionPolicy;
pub use store::{ActiveSet, RecycleSet, StoreError};

/// Minimal health-check API for front-end wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
