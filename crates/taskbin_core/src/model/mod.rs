//! Domain model for tracked tasks.
//!
//! # Responsibility
//! - Define the canonical task record shared by active and recycled storage.
//! - Own field-level validation rules applied before any store mutation.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` that is never reused.
//! - `deleted_at` is present only while a task sits in the recycle set.

pub mod task;
