//! Persistence adapter contracts and implementations.
//!
//! # Responsibility
//! - Define the load/save contract the task store persists through.
//! - Keep SQLite and serialization details out of the service layer.
//!
//! # Invariants
//! - The persisted document is the whole collection; there is no partial
//!   write path.
//! - Save failures are surfaced to callers, never swallowed.

pub mod task_repo;
