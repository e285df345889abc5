//! Monotonic id generation for tasks and subtasks.
//!
//! # Responsibility
//! - Assign unique, strictly increasing numeric ids under the single-writer
//!   model.
//!
//! # Invariants
//! - `next` never returns a value twice, even for calls within the same
//!   millisecond.
//! - Ids never go backwards relative to anything already in the collection.

use crate::model::task::Task;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in epoch milliseconds.
///
/// Clamps to zero if the system clock reports a pre-epoch time; id
/// monotonicity is preserved by `IdGenerator` regardless.
pub fn epoch_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Wall-clock-seeded monotonic id source.
///
/// Ids are epoch milliseconds when the clock is ahead of everything seen so
/// far, and `last + 1` otherwise, so same-instant creations still get
/// distinct increasing ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a generator whose floor is the highest id present in the
    /// collection, covering both tasks and their subtasks.
    pub fn seeded(tasks: &[Task]) -> Self {
        let mut generator = Self::new();
        for task in tasks {
            generator.observe(task.id);
            for sub in &task.subtasks {
                generator.observe(sub.id);
            }
        }
        generator
    }

    /// Raises the floor so future ids stay above an externally created one.
    pub fn observe(&mut self, id: i64) {
        if id > self.last {
            self.last = id;
        }
    }

    /// Returns the next unique id.
    pub fn next(&mut self) -> i64 {
        let id = epoch_millis_now().max(self.last + 1);
        self.last = id;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::{epoch_millis_now, IdGenerator};
    use crate::model::task::{Subtask, Task, Urgency};

    #[test]
    fn next_is_strictly_increasing() {
        let mut ids = IdGenerator::new();
        let first = ids.next();
        let second = ids.next();
        let third = ids.next();
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn seeded_generator_stays_above_existing_ids() {
        let far_future = epoch_millis_now() + 1_000_000;
        let mut task = Task::new(far_future, "seeded", Urgency::None, Vec::new(), 0);
        task.subtasks.push(Subtask {
            id: far_future + 5,
            text: "sub".to_string(),
            completed: false,
            is_editing: false,
        });

        let mut ids = IdGenerator::seeded(&[task]);
        assert!(ids.next() > far_future + 5);
    }
}
