//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level planner functions to Dart via FRB.
//! - Hold the process-wide planner session the UI shell talks to.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The session is initialized once; reconfiguration attempts fail.
//! - Drop events arrive here exactly as the Dart gesture router emits them.

use dayplan_core::db::open_db;
use dayplan_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DaySession, DropApplied, RawDropEvent, SlotCalendar, SqliteTaskRepository, Task,
};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

const PLANNER_DB_FILE_NAME: &str = "dayplan.sqlite3";
const PLANNER_DB_PATH_ENV: &str = "DAYPLAN_DB_PATH";

static PLANNER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: OnceLock<Mutex<DaySession<SqliteTaskRepository>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Idempotent for the same `level + log_dir`; reconfiguration fails.
/// - Never panics; returns empty string on success, error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Response envelope for planner session bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerInitResponse {
    /// Whether a usable session is active after this call.
    pub ok: bool,
    /// Tasks hydrated from the durable store.
    pub task_count: u32,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Generic action response envelope for planner mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Created task ID, when the operation produced one.
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl PlannerActionResponse {
    fn success(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// One task row projected for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerTaskItem {
    /// Stable task ID in string form.
    pub task_id: String,
    pub title: String,
    pub created_at_epoch_ms: i64,
    /// Occupied slot label, or `None` for the unscheduled pool.
    pub slot: Option<String>,
}

/// Response envelope for task list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerTaskListResponse {
    pub items: Vec<PlannerTaskItem>,
    pub message: String,
}

/// Response envelope for pill token queries and toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerPillResponse {
    pub ok: bool,
    pub slot_index: u32,
    pub taken: bool,
    pub message: String,
}

/// Opens the durable store and hydrates the process-wide planner session.
///
/// `db_path` semantics: an explicit non-empty path wins, then the
/// `DAYPLAN_DB_PATH` environment variable, then a file in the OS temp
/// directory.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Idempotent for the same path; a different path is refused.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_init(db_path: String) -> PlannerInitResponse {
    let requested = requested_db_path(&db_path);
    let active = PLANNER_DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return PlannerInitResponse {
            ok: false,
            task_count: 0,
            message: format!(
                "planner already initialized at `{}`; refusing to switch to `{}`",
                active.display(),
                requested.display()
            ),
        };
    }

    if SESSION.get().is_some() {
        return match with_session(|session| session.tasks().len() as u32) {
            Ok(task_count) => PlannerInitResponse {
                ok: true,
                task_count,
                message: "Planner already initialized.".to_string(),
            },
            Err(message) => PlannerInitResponse {
                ok: false,
                task_count: 0,
                message,
            },
        };
    }

    match open_session(active) {
        Ok(session) => {
            let task_count = session.tasks().len() as u32;
            // A racing init may have installed a session first; both used
            // the same pinned path, so either outcome is a ready planner.
            let _ = SESSION.set(Mutex::new(session));
            info!(
                "event=planner_init module=ffi status=ok task_count={task_count} db_path={}",
                active.display()
            );
            PlannerInitResponse {
                ok: true,
                task_count,
                message: "Planner ready.".to_string(),
            }
        }
        Err(message) => PlannerInitResponse {
            ok: false,
            task_count: 0,
            message,
        },
    }
}

/// Creates a task in the unscheduled pool.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns operation result and the store-assigned task ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_create_task(title: String, created_at_epoch_ms: i64) -> PlannerActionResponse {
    match with_session(|session| {
        session
            .tasks_mut()
            .create(title.trim(), created_at_epoch_ms)
    }) {
        Ok(Ok(task)) => {
            PlannerActionResponse::success("Task created.", Some(task.uuid.to_string()))
        }
        Ok(Err(err)) => {
            PlannerActionResponse::failure(format!("planner_create_task failed: {err}"))
        }
        Err(message) => PlannerActionResponse::failure(message),
    }
}

/// Applies one drop event from the Dart gesture router.
///
/// Payload semantics match the core zone grammar: item kinds `task`/`pill`,
/// zones `unscheduled`, `slot:<HH:MM>`, `pill:taken`, `pill:not-taken`.
///
/// # FFI contract
/// - Sync call, DB-backed execution for task drops.
/// - A rejected drop mutates nothing and reports why.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_apply_drop(
    item_kind: String,
    item_id: String,
    destination_zone_id: String,
) -> PlannerActionResponse {
    let raw = RawDropEvent {
        item_kind,
        item_id,
        destination_zone_id,
    };
    match with_session(move |session| session.apply_drop(&raw)) {
        Ok(Ok(DropApplied::TaskMoved)) => PlannerActionResponse::success("Task moved.", None),
        Ok(Ok(DropApplied::PillSet)) => {
            PlannerActionResponse::success("Pill status updated.", None)
        }
        Ok(Err(err)) => PlannerActionResponse::failure(format!("planner_apply_drop failed: {err}")),
        Err(message) => PlannerActionResponse::failure(message),
    }
}

/// Lists the unscheduled pool in insertion order.
///
/// # FFI contract
/// - Sync call, memory-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_unscheduled() -> PlannerTaskListResponse {
    task_list(|session| {
        session
            .tasks()
            .unscheduled()
            .into_iter()
            .map(to_task_item)
            .collect()
    })
}

/// Lists one slot bucket in insertion order.
///
/// # FFI contract
/// - Sync call, memory-backed execution.
/// - An unknown label yields an empty list, not an error.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_bucket(label: String) -> PlannerTaskListResponse {
    task_list(move |session| {
        session
            .tasks()
            .by_bucket(&label)
            .into_iter()
            .map(to_task_item)
            .collect()
    })
}

/// The ordered slot catalog the UI renders as columns.
///
/// # FFI contract
/// - Sync call, non-blocking, session-independent.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_slots() -> Vec<String> {
    SlotCalendar::standard().slots().to_vec()
}

/// Reads one pill token.
///
/// # FFI contract
/// - Sync call, memory-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_pill(slot_index: u32) -> PlannerPillResponse {
    match with_session(move |session| session.pills().get(slot_index as usize).copied()) {
        Ok(Some(token)) => PlannerPillResponse {
            ok: true,
            slot_index,
            taken: token.taken,
            message: String::new(),
        },
        Ok(None) => PlannerPillResponse {
            ok: false,
            slot_index,
            taken: false,
            message: format!("planner_pill failed: unknown slot index {slot_index}"),
        },
        Err(message) => PlannerPillResponse {
            ok: false,
            slot_index,
            taken: false,
            message,
        },
    }
}

/// Sets one pill token's taken flag directly (non-drop UI affordances).
///
/// # FFI contract
/// - Sync call, memory-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn planner_set_pill(slot_index: u32, taken: bool) -> PlannerPillResponse {
    match with_session(move |session| session.pills_mut().set_taken(slot_index as usize, taken)) {
        Ok(Ok(())) => PlannerPillResponse {
            ok: true,
            slot_index,
            taken,
            message: String::new(),
        },
        Ok(Err(err)) => PlannerPillResponse {
            ok: false,
            slot_index,
            taken: false,
            message: format!("planner_set_pill failed: {err}"),
        },
        Err(message) => PlannerPillResponse {
            ok: false,
            slot_index,
            taken: false,
            message,
        },
    }
}

fn requested_db_path(explicit: &str) -> PathBuf {
    let trimmed = explicit.trim();
    if !trimmed.is_empty() {
        return PathBuf::from(trimmed);
    }
    if let Ok(raw) = std::env::var(PLANNER_DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(PLANNER_DB_FILE_NAME)
}

fn open_session(path: &Path) -> Result<DaySession<SqliteTaskRepository>, String> {
    let conn = open_db(path).map_err(|err| format!("planner DB open failed: {err}"))?;
    let repo = SqliteTaskRepository::try_new(conn)
        .map_err(|err| format!("planner repo init failed: {err}"))?;
    DaySession::open(repo, SlotCalendar::standard())
        .map_err(|err| format!("planner hydration failed: {err}"))
}

fn with_session<T>(
    f: impl FnOnce(&mut DaySession<SqliteTaskRepository>) -> T,
) -> Result<T, String> {
    let session = SESSION
        .get()
        .ok_or_else(|| "planner not initialized; call planner_init first".to_string())?;
    let mut guard = session
        .lock()
        .map_err(|_| "planner state poisoned".to_string())?;
    Ok(f(&mut guard))
}

fn task_list(
    f: impl FnOnce(&mut DaySession<SqliteTaskRepository>) -> Vec<PlannerTaskItem>,
) -> PlannerTaskListResponse {
    match with_session(f) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No tasks.".to_string()
            } else {
                format!("{} task(s).", items.len())
            };
            PlannerTaskListResponse { items, message }
        }
        Err(message) => PlannerTaskListResponse {
            items: Vec::new(),
            message,
        },
    }
}

fn to_task_item(task: &Task) -> PlannerTaskItem {
    PlannerTaskItem {
        task_id: task.uuid.to_string(),
        title: task.title.clone(),
        created_at_epoch_ms: task.created_at,
        slot: task.slot.label().map(str::to_string),
    }
}
