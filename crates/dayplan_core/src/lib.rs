//! Core domain logic for the dayplan daily planner.
//! This crate is the single source of truth for slot-assignment invariants.

pub mod calendar;
pub mod db;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calendar::SlotCalendar;
pub use dispatch::{
    DaySession, DispatchError, DispatchResult, DropApplied, DropEvent, DropItem, DropZone,
    RawDropEvent,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::pill::PillToken;
pub use model::task::{SlotAssignment, Task, TaskId, TaskStatus, TaskValidationError};
pub use repo::task_repo::{NewTask, RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::assignment::{AssignmentError, AssignmentResult, TaskAssignmentStore};
pub use service::pill_track::{PillStatusTrack, UnknownSlot};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
