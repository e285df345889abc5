use rusqlite::Connection;
use stride_core::db::open_db_in_memory;
use stride_core::{
    CompletionAction, MissingIdPolicy, SqliteTaskRepository, StoreError, TaskDraft, TaskPatch,
    TaskRepository, TaskStore, Urgency,
};

type Store<'conn> = TaskStore<SqliteTaskRepository<'conn>, CompletionAction>;

fn empty_store(conn: &Connection, action: CompletionAction) -> Store<'_> {
    let seeder = SqliteTaskRepository::try_new(conn).unwrap();
    seeder.save_collection(&[]).unwrap();
    TaskStore::open(SqliteTaskRepository::try_new(conn).unwrap(), action).unwrap()
}

#[test]
fn first_open_seeds_starter_collection_sorted_by_urgency() {
    let conn = open_db_in_memory().unwrap();
    let store = TaskStore::open(
        SqliteTaskRepository::try_new(&conn).unwrap(),
        CompletionAction::Stay,
    )
    .unwrap();

    assert_eq!(store.len(), 5);
    // high(1), medium(2), low(3), low(5, stable), none(4)
    let ids: Vec<i64> = store.tasks().iter().map(|task| task.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 5, 4]);

    // The seed is persisted, not just in memory.
    let reread = TaskStore::open(
        SqliteTaskRepository::try_new(&conn).unwrap(),
        CompletionAction::Stay,
    )
    .unwrap();
    assert_eq!(reread.len(), 5);
    assert_eq!(reread.tasks(), store.tasks());
}

#[test]
fn add_task_creates_single_incomplete_task() {
    let conn = open_db_in_memory().unwrap();
    let mut store = empty_store(&conn, CompletionAction::Stay);

    let created = store
        .add_task(TaskDraft::new("Buy milk").with_urgency(Urgency::Low))
        .unwrap();

    assert_eq!(store.len(), 1);
    let task = store.task(created.id).unwrap();
    assert_eq!(task.text, "Buy milk");
    assert_eq!(task.urgency, Urgency::Low);
    assert!(!task.completed);
    assert!(!task.is_archived);
    assert!(task.tags.is_empty());
    assert!(task.subtasks.is_empty());
    assert!(task.created_at > 0);
}

#[test]
fn add_task_rejects_blank_text() {
    let conn = open_db_in_memory().unwrap();
    let mut store = empty_store(&conn, CompletionAction::Stay);

    assert!(matches!(
        store.add_task(TaskDraft::new("")),
        Err(StoreError::EmptyText)
    ));
    assert!(matches!(
        store.add_task(TaskDraft::new("   ")),
        Err(StoreError::EmptyText)
    ));
    assert!(store.is_empty());
}

#[test]
fn add_task_assigns_distinct_increasing_ids() {
    let conn = open_db_in_memory().unwrap();
    let mut store = empty_store(&conn, CompletionAction::Stay);

    let first = store.add_task(TaskDraft::new("first")).unwrap();
    let second = store.add_task(TaskDraft::new("second")).unwrap();
    let third = store.add_task(TaskDraft::new("third")).unwrap();

    assert!(first.id < second.id);
    assert!(second.id < third.id);
}

#[test]
fn update_task_merges_partial_fields() {
    let conn = open_db_in_memory().unwrap();
    let mut store = empty_store(&conn, CompletionAction::Stay);

    let created = store
        .add_task(TaskDraft::new("draft").with_tags(vec!["Errand".to_string()]))
        .unwrap();

    store
        .update_task(
            created.id,
            TaskPatch {
                text: Some("polished".to_string()),
                urgency: Some(Urgency::High),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    let task = store.task(created.id).unwrap();
    assert_eq!(task.text, "polished");
    assert_eq!(task.urgency, Urgency::High);
    // Untouched fields survive the merge.
    assert_eq!(task.tags, vec!["Errand".to_string()]);
    assert!(!task.completed);
    assert_eq!(task.created_at, created.created_at);
}

#[test]
fn update_missing_id_is_a_silent_noop_by_default() {
    let conn = open_db_in_memory().unwrap();
    let mut store = empty_store(&conn, CompletionAction::Stay);
    store.add_task(TaskDraft::new("only")).unwrap();

    store
        .update_task(
            424_242,
            TaskPatch {
                text: Some("ghost".to_string()),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.tasks()[0].text, "only");
}

#[test]
fn strict_policy_signals_missing_task_ids() {
    let conn = open_db_in_memory().unwrap();
    let seeder = SqliteTaskRepository::try_new(&conn).unwrap();
    seeder.save_collection(&[]).unwrap();
    let mut store = TaskStore::with_policy(
        SqliteTaskRepository::try_new(&conn).unwrap(),
        CompletionAction::Stay,
        MissingIdPolicy::Strict,
    )
    .unwrap();

    assert!(matches!(
        store.update_task(7, TaskPatch::default()),
        Err(StoreError::TaskNotFound(7))
    ));
    assert!(matches!(
        store.toggle_task(7),
        Err(StoreError::TaskNotFound(7))
    ));
    assert!(matches!(
        store.delete_task(7),
        Err(StoreError::TaskNotFound(7))
    ));
}

#[test]
fn toggle_task_flips_completion_both_ways() {
    let conn = open_db_in_memory().unwrap();
    let mut store = empty_store(&conn, CompletionAction::Stay);
    let created = store.add_task(TaskDraft::new("flip me")).unwrap();

    store.toggle_task(created.id).unwrap();
    assert!(store.task(created.id).unwrap().completed);

    store.toggle_task(created.id).unwrap();
    assert!(!store.task(created.id).unwrap().completed);
}

#[test]
fn toggle_under_archive_preference_archives_on_completion() {
    let conn = open_db_in_memory().unwrap();
    let mut store = empty_store(&conn, CompletionAction::Archive);
    let created = store.add_task(TaskDraft::new("file me")).unwrap();

    store.toggle_task(created.id).unwrap();
    let task = store.task(created.id).unwrap();
    assert!(task.completed);
    assert!(task.is_archived);

    // Un-completing does not pull the task back out of the archive.
    store.toggle_task(created.id).unwrap();
    let task = store.task(created.id).unwrap();
    assert!(!task.completed);
    assert!(task.is_archived);
}

#[test]
fn delete_task_removes_it_durably() {
    let conn = open_db_in_memory().unwrap();
    let mut store = empty_store(&conn, CompletionAction::Stay);
    let keep = store.add_task(TaskDraft::new("keep")).unwrap();
    let drop = store.add_task(TaskDraft::new("drop")).unwrap();

    store.delete_task(drop.id).unwrap();
    assert!(store.task(drop.id).is_none());
    assert!(store.task(keep.id).is_some());

    let reread = TaskStore::open(
        SqliteTaskRepository::try_new(&conn).unwrap(),
        CompletionAction::Stay,
    )
    .unwrap();
    assert!(reread.task(drop.id).is_none());
    assert!(reread.task(keep.id).is_some());
}

#[test]
fn archive_flag_partitions_active_and_archived_views() {
    let conn = open_db_in_memory().unwrap();
    let mut store = empty_store(&conn, CompletionAction::Stay);
    let active = store.add_task(TaskDraft::new("active")).unwrap();
    let archived = store.add_task(TaskDraft::new("archived")).unwrap();

    store
        .update_task(
            archived.id,
            TaskPatch {
                archived: Some(true),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    let active_ids: Vec<i64> = store.active_tasks().map(|task| task.id).collect();
    let archived_ids: Vec<i64> = store.archived_tasks().map(|task| task.id).collect();
    assert_eq!(active_ids, vec![active.id]);
    assert_eq!(archived_ids, vec![archived.id]);

    // Restore path used by the archive view's "restore" action.
    store
        .update_task(
            archived.id,
            TaskPatch {
                archived: Some(false),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(store.archived_tasks().count(), 0);
}
