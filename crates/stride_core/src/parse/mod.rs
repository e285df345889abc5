//! Quick-capture text parsing.
//!
//! # Responsibility
//! - Extract urgency and temporal tags from raw task input so a single
//!   text field can drive structured task creation.

pub mod input;
