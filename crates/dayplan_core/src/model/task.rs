//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record moved between the unscheduled pool
//!   and slot buckets.
//! - Provide title validation shared by create and load paths.
//!
//! # Invariants
//! - `uuid` is assigned by the persistent store and never reused.
//! - `title` is non-empty after trimming; there is no rename operation.
//! - `slot` is the only field assignment logic mutates.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task, assigned by the store on creation.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Lifecycle placeholder carried in the persisted record.
///
/// Tasks are created `Pending` and no core operation transitions them; the
/// field is persisted and loaded so external consumers can query it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
}

/// Where a task currently lives: the unscheduled pool or one slot bucket.
///
/// A scheduled label must be a member of the session's `SlotCalendar`; the
/// assignment store enforces membership before accepting a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotAssignment {
    Unscheduled,
    At(String),
}

impl SlotAssignment {
    /// The slot label, or `None` for the unscheduled pool.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Unscheduled => None,
            Self::At(label) => Some(label.as_str()),
        }
    }
}

impl Display for SlotAssignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unscheduled => write!(f, "unscheduled"),
            Self::At(label) => write!(f, "{label}"),
        }
    }
}

/// Validation error for task field contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Rejects empty or whitespace-only titles.
///
/// Shared by service create paths and repository read/write paths so an
/// invalid title can neither be written nor silently loaded.
pub fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable store-assigned ID.
    pub uuid: TaskId,
    /// Display title, immutable after creation.
    pub title: String,
    /// Creation time in Unix epoch milliseconds, immutable.
    pub created_at: i64,
    /// Inert lifecycle field, always `Pending` in this design.
    pub status: TaskStatus,
    /// Current bucket membership; the sole mutable field.
    pub slot: SlotAssignment,
}

impl Task {
    /// Builds a task around an already-assigned store ID.
    ///
    /// New tasks always start in the unscheduled pool.
    pub fn with_id(uuid: TaskId, title: impl Into<String>, created_at: i64) -> Self {
        Self {
            uuid,
            title: title.into(),
            created_at,
            status: TaskStatus::Pending,
            slot: SlotAssignment::Unscheduled,
        }
    }

    /// Validates field contracts of this record.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }

    /// Whether this task currently occupies a slot bucket.
    pub fn is_scheduled(&self) -> bool {
        matches!(self.slot, SlotAssignment::At(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_title, SlotAssignment, Task, TaskStatus, TaskValidationError};
    use uuid::Uuid;

    #[test]
    fn new_task_starts_unscheduled_and_pending() {
        let task = Task::with_id(Uuid::new_v4(), "water plants", 1_700_000_000_000);
        assert_eq!(task.slot, SlotAssignment::Unscheduled);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.is_scheduled());
    }

    #[test]
    fn whitespace_title_is_rejected() {
        assert_eq!(validate_title("   "), Err(TaskValidationError::EmptyTitle));
        assert_eq!(validate_title(""), Err(TaskValidationError::EmptyTitle));
        assert!(validate_title("ok").is_ok());
    }

    #[test]
    fn slot_assignment_exposes_label() {
        assert_eq!(SlotAssignment::Unscheduled.label(), None);
        assert_eq!(
            SlotAssignment::At("09:00".to_string()).label(),
            Some("09:00")
        );
    }

    #[test]
    fn task_serde_roundtrip_uses_snake_case_status() {
        let task = Task::with_id(Uuid::new_v4(), "serde check", 42);
        let json = serde_json::to_string(&task).expect("serialize task");
        assert!(json.contains("\"pending\""));
        assert!(json.contains("\"unscheduled\""));
        let back: Task = serde_json::from_str(&json).expect("deserialize task");
        assert_eq!(back, task);
    }
}
