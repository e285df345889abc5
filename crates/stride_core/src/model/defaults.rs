//! Starter collection seeded on first run.
//!
//! # Responsibility
//! - Provide the fixed default task set used when no persisted collection
//!   exists or the persisted document is unreadable.
//!
//! # Invariants
//! - Ids are small fixed values well below any wall-clock-derived id, so
//!   later creations can never collide with them.
//! - `created_at` offsets are relative to the seed instant.

use crate::model::task::{Subtask, Task, TaskId, Urgency};

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;
const MINUTE_MS: i64 = 60_000;

fn saved_subtask(id: i64, text: &str) -> Subtask {
    Subtask {
        id,
        text: text.to_string(),
        completed: false,
        is_editing: false,
    }
}

fn starter_task(
    id: TaskId,
    text: &str,
    urgency: Urgency,
    tags: &[&str],
    created_at: i64,
    subtasks: Vec<Subtask>,
) -> Task {
    let mut task = Task::new(
        id,
        text,
        urgency,
        tags.iter().map(|tag| (*tag).to_string()).collect(),
        created_at,
    );
    task.subtasks = subtasks;
    task
}

/// Builds the starter collection with `created_at` stamps relative to
/// `now_ms`.
pub fn starter_tasks(now_ms: i64) -> Vec<Task> {
    vec![
        starter_task(
            1,
            "Prepare English lesson plan for next week's vocational center sessions.",
            Urgency::High,
            &["Internship", "LessonPlan"],
            now_ms - 2 * HOUR_MS,
            vec![
                saved_subtask(11, "Research interactive grammar games for C1 level."),
                saved_subtask(12, "Print handouts for 20 students."),
                saved_subtask(13, "Coordinate with the lead teacher on timing."),
            ],
        ),
        starter_task(
            2,
            "Design a brand strategy and visual identity for an understated, 'Dark Romantic' \
             menswear label focusing on high-quality fabrics and minimalist silhouettes.",
            Urgency::Medium,
            &["DesignStrategy", "Menswear"],
            now_ms - HOUR_MS,
            Vec::new(),
        ),
        starter_task(
            3,
            "Buy ingredients for lamb and prune tagine.",
            Urgency::Low,
            &["CulinaryGoal", "Khenifra"],
            now_ms - DAY_MS,
            vec![
                saved_subtask(31, "Visit the local market in Khenifra for fresh prunes."),
                saved_subtask(32, "Check spice levels for ras el hanout."),
            ],
        ),
        starter_task(
            4,
            "Compare agentic IDE features in Antigravity versus standard VS Code plugins.",
            Urgency::None,
            &["Research"],
            now_ms - 5 * MINUTE_MS,
            Vec::new(),
        ),
        starter_task(
            5,
            "Research technical specifications for civilian-grade body armor and check local \
             range availability or training centers for tactical gear familiarization.",
            Urgency::Low,
            &["Tactical", "DeepDive"],
            now_ms - 12 * HOUR_MS,
            vec![
                saved_subtask(51, "Verify NIJ level ratings."),
                saved_subtask(52, "Compare carrier plate weights."),
            ],
        ),
    ]
}
