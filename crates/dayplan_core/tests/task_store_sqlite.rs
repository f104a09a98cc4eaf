use dayplan_core::db::open_db;
use dayplan_core::{
    NewTask, RepoError, SlotAssignment, SlotCalendar, SqliteTaskRepository, Task,
    TaskAssignmentStore, TaskRepository, TaskStatus,
};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn temp_db() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("dayplan-test.sqlite3");
    (dir, path)
}

fn open_repo(path: &Path) -> SqliteTaskRepository {
    let conn = open_db(path).expect("open db");
    SqliteTaskRepository::try_new(conn).expect("repo init")
}

#[test]
fn create_assigns_unique_store_ids() {
    let (_dir, path) = temp_db();
    let repo = open_repo(&path);

    let first = repo
        .create_task(&NewTask {
            title: "first".to_string(),
            created_at: 1,
        })
        .unwrap();
    let second = repo
        .create_task(&NewTask {
            title: "second".to_string(),
            created_at: 2,
        })
        .unwrap();

    assert_ne!(first, second);
}

#[test]
fn create_rejects_blank_title() {
    let (_dir, path) = temp_db();
    let repo = open_repo(&path);

    let err = repo
        .create_task(&NewTask {
            title: "  ".to_string(),
            created_at: 1,
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.load_all().unwrap().is_empty());
}

#[test]
fn created_rows_survive_reopen_in_creation_order() {
    let (_dir, path) = temp_db();
    let ids = {
        let repo = open_repo(&path);
        let mut ids = Vec::new();
        for (title, created_at) in [("late", 30_i64), ("early", 10), ("middle", 20)] {
            ids.push(
                repo.create_task(&NewTask {
                    title: title.to_string(),
                    created_at,
                })
                .unwrap(),
            );
        }
        ids
    };

    let repo = open_repo(&path);
    let loaded = repo.load_all().unwrap();
    let titles: Vec<&str> = loaded.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, ["early", "middle", "late"]);
    assert!(loaded
        .iter()
        .all(|task| task.status == TaskStatus::Pending));
    assert!(loaded
        .iter()
        .all(|task| task.slot == SlotAssignment::Unscheduled));
    assert_eq!(loaded.len(), ids.len());
}

#[test]
fn upsert_updates_existing_row_and_inserts_missing_row() {
    let (_dir, path) = temp_db();
    let repo = open_repo(&path);

    let id = repo
        .create_task(&NewTask {
            title: "walk".to_string(),
            created_at: 1,
        })
        .unwrap();

    let mut moved = Task::with_id(id, "walk", 1);
    moved.slot = SlotAssignment::At("10:00".to_string());
    repo.upsert_task(&moved).unwrap();

    // Upsert-by-key also accepts a record the store has never seen.
    let external = Task::with_id(Uuid::new_v4(), "imported", 2);
    repo.upsert_task(&external).unwrap();

    let loaded = repo.load_all().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].slot.label(), Some("10:00"));
    assert_eq!(loaded[1].title, "imported");
}

#[test]
fn malformed_persisted_rows_are_rejected_not_masked() {
    let (_dir, path) = temp_db();
    {
        let _ = open_repo(&path);
    }

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO tasks (uuid, title, created_at, status, slot)
         VALUES (?1, ?2, ?3, ?4, NULL);",
        params!["not-a-uuid", "broken", 1_i64, "pending"],
    )
    .unwrap();
    drop(conn);

    let repo = open_repo(&path);
    let err = repo.load_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("tasks.uuid")));
}

#[test]
fn unknown_status_value_is_rejected() {
    let (_dir, path) = temp_db();
    {
        let _ = open_repo(&path);
    }

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO tasks (uuid, title, created_at, status, slot)
         VALUES (?1, ?2, ?3, ?4, NULL);",
        params![Uuid::new_v4().to_string(), "broken", 1_i64, "done"],
    )
    .unwrap();
    drop(conn);

    let repo = open_repo(&path);
    let err = repo.load_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("tasks.status")));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteTaskRepository::try_new(conn).unwrap_err();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn next_session_hydration_wins_over_out_of_band_edits() {
    let (_dir, path) = temp_db();
    let task_id = {
        let mut store =
            TaskAssignmentStore::open(open_repo(&path), SlotCalendar::standard()).unwrap();
        let task = store.create("Buy milk", 1).unwrap();
        store
            .move_to_slot(task.uuid, SlotAssignment::At("09:00".to_string()))
            .unwrap();
        task.uuid
    };

    // An external editor rewrites the durable slot between sessions.
    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE tasks SET slot = '11:00' WHERE uuid = ?1;",
        [task_id.to_string()],
    )
    .unwrap();
    drop(conn);

    let store = TaskAssignmentStore::open(open_repo(&path), SlotCalendar::standard()).unwrap();
    assert!(store.by_bucket("09:00").is_empty());
    assert_eq!(store.by_bucket("11:00").len(), 1);
    assert_eq!(store.get(task_id).unwrap().slot.label(), Some("11:00"));
}

#[test]
fn hydration_rejects_out_of_band_label_outside_the_calendar() {
    let (_dir, path) = temp_db();
    let task_id = {
        let mut store =
            TaskAssignmentStore::open(open_repo(&path), SlotCalendar::standard()).unwrap();
        store.create("Buy milk", 1).unwrap().uuid
    };

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE tasks SET slot = '25:99' WHERE uuid = ?1;",
        [task_id.to_string()],
    )
    .unwrap();
    drop(conn);

    let err = TaskAssignmentStore::open(open_repo(&path), SlotCalendar::standard()).unwrap_err();
    assert!(matches!(
        err,
        dayplan_core::AssignmentError::InvalidSlot(label) if label == "25:99"
    ));
}
