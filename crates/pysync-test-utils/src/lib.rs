//! Shared test utilities for the pysync workspace.
//!
//! This crate provides project fixtures so crate test suites do not each
//! hand-roll Pipfile and lock files. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`](project::TestProject) builder for a temporary Python project
//! - [`fixtures`]: named sample projects under `test-fixtures/projects/`

pub mod fixtures;
pub mod project;

pub use project::{LockedPackage, TestProject};
