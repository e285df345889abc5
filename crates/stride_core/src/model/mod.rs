//! Domain model for the task collection.
//!
//! # Responsibility
//! - Define the canonical task/subtask records the whole core operates on.
//! - Provide id generation and the starter collection used on first run.
//!
//! # Invariants
//! - Every record is identified by a stable numeric id that is never reused.
//! - Persisted field names are fixed by the legacy document shape and must
//!   not drift (see serde renames in `task`).

pub mod defaults;
pub mod ids;
pub mod task;
