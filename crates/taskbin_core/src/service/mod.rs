//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate set mutations and repository calls into lifecycle APIs.
//! - Keep front-end layers decoupled from storage details.

pub mod lifecycle_service;
pub mod retention;
