//! Sync and check orchestration

mod check;
mod engine;

pub use check::{CheckReport, CheckStatus, ConflictKind, ConflictReport};
pub use engine::{SyncEngine, SyncReport};
