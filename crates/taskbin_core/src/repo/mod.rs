//! Persistence collaborators for the two task sets.
//!
//! # Responsibility
//! - Define the load/save contract the lifecycle manager depends on.
//! - Isolate SQLite query details from lifecycle orchestration.
//!
//! # Invariants
//! - Saves replace the whole persisted set, preserving the given order.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod memory_repo;
pub mod task_repo;
