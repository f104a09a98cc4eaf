//! Task assignment store.
//!
//! # Responsibility
//! - Own the in-memory task set and the single-allowed-slot invariant.
//! - Expose create/move operations plus bucket and pool read views.
//! - Persist every accepted mutation through the task repository.
//!
//! # Invariants
//! - Hydration happens exactly once, inside `open`, before any mutation is
//!   reachable; the loaded state replaces in-memory state wholesale.
//! - A scheduled task's label is always a member of the session calendar.
//! - Referential and input errors reject before any state changes.
//! - A failed persistence write is reported but never rolled back in
//!   memory; the next session's hydration reconciles the divergence.

use crate::calendar::SlotCalendar;
use crate::model::task::{validate_title, SlotAssignment, Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{NewTask, RepoError, TaskRepository};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type AssignmentResult<T> = Result<T, AssignmentError>;

/// Errors from task creation, assignment and hydration.
#[derive(Debug)]
pub enum AssignmentError {
    /// Title input is empty or whitespace-only.
    EmptyTitle,
    /// No task with this id exists in the session.
    UnknownTask(TaskId),
    /// Destination label is not a member of the session calendar.
    InvalidSlot(String),
    /// The durable write did not complete; in-memory state was kept.
    Persistence(RepoError),
}

impl Display for AssignmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::UnknownTask(id) => write!(f, "unknown task: {id}"),
            Self::InvalidSlot(label) => write!(f, "invalid slot label: `{label}`"),
            Self::Persistence(err) => write!(f, "task persistence failed: {err}"),
        }
    }
}

impl Error for AssignmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for AssignmentError {
    fn from(value: TaskValidationError) -> Self {
        match value {
            TaskValidationError::EmptyTitle => Self::EmptyTitle,
        }
    }
}

impl From<RepoError> for AssignmentError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(TaskValidationError::EmptyTitle) => Self::EmptyTitle,
            other => Self::Persistence(other),
        }
    }
}

/// Owner of the task collection and sole writer to the task repository.
#[derive(Debug)]
pub struct TaskAssignmentStore<R: TaskRepository> {
    repo: R,
    calendar: SlotCalendar,
    tasks: Vec<Task>,
}

impl<R: TaskRepository> TaskAssignmentStore<R> {
    /// Opens the store and hydrates it from the repository.
    ///
    /// This is the only constructor, so no mutating call can ever precede
    /// hydration. Hydration rejects persisted slot labels that are not in
    /// `calendar` rather than masking them.
    pub fn open(repo: R, calendar: SlotCalendar) -> AssignmentResult<Self> {
        let started_at = Instant::now();
        let tasks = repo.load_all().map_err(|err| {
            error!(
                "event=planner_hydrate module=assignment status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            AssignmentError::from(err)
        })?;

        for task in &tasks {
            if let Some(label) = task.slot.label() {
                if !calendar.contains(label) {
                    error!(
                        "event=planner_hydrate module=assignment status=error task_id={} error_code=invalid_slot slot={label}",
                        task.uuid
                    );
                    return Err(AssignmentError::InvalidSlot(label.to_string()));
                }
            }
        }

        info!(
            "event=planner_hydrate module=assignment status=ok task_count={} duration_ms={}",
            tasks.len(),
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            repo,
            calendar,
            tasks,
        })
    }

    /// Creates a task in the unscheduled pool.
    ///
    /// Blocks on the repository for the durable identifier before the task
    /// becomes visible in memory, so no provisional keys ever exist. A
    /// failed create leaves the session unchanged.
    pub fn create(&mut self, title: &str, created_at: i64) -> AssignmentResult<Task> {
        validate_title(title)?;

        let fields = NewTask {
            title: title.to_string(),
            created_at,
        };
        let id = self.repo.create_task(&fields).map_err(|err| {
            error!("event=task_create module=assignment status=error error={err}");
            AssignmentError::from(err)
        })?;

        let task = Task::with_id(id, fields.title, created_at);
        self.tasks.push(task.clone());
        info!("event=task_create module=assignment status=ok task_id={id}");
        Ok(task)
    }

    /// Moves a task to `destination`, which is either the unscheduled pool
    /// or one calendar slot.
    ///
    /// The assignment is a pure move: writing the single `slot` field
    /// removes the task from its previous bucket atomically. Moving a task
    /// to the slot it already occupies succeeds and still re-persists, so
    /// durable state is reconciled even after external edits.
    ///
    /// # Errors
    /// - `InvalidSlot` / `UnknownTask` reject before any state changes.
    /// - `Persistence` reports a failed durable write; the in-memory move
    ///   has already been applied and is kept.
    pub fn move_to_slot(
        &mut self,
        task_id: TaskId,
        destination: SlotAssignment,
    ) -> AssignmentResult<()> {
        if let Some(label) = destination.label() {
            if !self.calendar.contains(label) {
                return Err(AssignmentError::InvalidSlot(label.to_string()));
            }
        }

        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.uuid == task_id)
            .ok_or(AssignmentError::UnknownTask(task_id))?;

        task.slot = destination;
        info!(
            "event=task_move module=assignment status=ok task_id={task_id} destination={}",
            task.slot
        );

        self.repo.upsert_task(task).map_err(|err| {
            error!(
                "event=task_persist module=assignment status=error task_id={task_id} error={err}"
            );
            AssignmentError::Persistence(err)
        })
    }

    /// Tasks in the unscheduled pool, in insertion order.
    pub fn unscheduled(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.slot == SlotAssignment::Unscheduled)
            .collect()
    }

    /// Tasks in the bucket for `label`, in insertion order.
    ///
    /// Reads are total: an unknown label yields an empty bucket.
    pub fn by_bucket(&self, label: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.slot.label() == Some(label))
            .collect()
    }

    /// Looks up one task by id.
    pub fn get(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.uuid == task_id)
    }

    /// Every task in the session, in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The calendar this session assigns against.
    pub fn calendar(&self) -> &SlotCalendar {
        &self.calendar
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
