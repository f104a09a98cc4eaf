//! Drop-event decoding and session routing.
//!
//! # Responsibility
//! - Decode raw gesture-router payloads into typed drop events exactly once,
//!   at the system boundary.
//! - Route decoded events to the task store or the pill track.
//!
//! # Invariants
//! - Malformed payloads reject before any state is reachable; a rejected
//!   drop never partially applies.
//! - Task drops target the pool or a bucket; pill drops target the two
//!   token positions. Cross-kind zones are rejected.

use crate::calendar::SlotCalendar;
use crate::model::task::{SlotAssignment, TaskId};
use crate::repo::task_repo::TaskRepository;
use crate::service::assignment::{AssignmentError, AssignmentResult, TaskAssignmentStore};
use crate::service::pill_track::{PillStatusTrack, UnknownSlot};
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Zone grammar: `slot:<HH:MM>` addresses one bucket column.
///
/// Only the shape is checked here; membership in the active calendar is the
/// assignment store's call.
static SLOT_ZONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^slot:([0-9]{2}:[0-9]{2})$").expect("valid slot zone regex"));

const ZONE_UNSCHEDULED: &str = "unscheduled";
const ZONE_PILL_TAKEN: &str = "pill:taken";
const ZONE_PILL_NOT_TAKEN: &str = "pill:not-taken";

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors from decoding or applying a drop event.
#[derive(Debug)]
pub enum DispatchError {
    /// `item_kind` is neither `task` nor `pill`.
    UnknownItemKind(String),
    /// `item_id` does not parse for the named kind.
    MalformedItemId { kind: &'static str, item_id: String },
    /// `destination_zone_id` matches no known zone shape.
    MalformedZone(String),
    /// Item kind and destination zone belong to different stores.
    ZoneMismatch { kind: &'static str, zone: String },
    /// The task store rejected the routed move.
    Assignment(AssignmentError),
    /// The pill track rejected the routed toggle.
    Pill(UnknownSlot),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownItemKind(kind) => write!(f, "unknown drop item kind: `{kind}`"),
            Self::MalformedItemId { kind, item_id } => {
                write!(f, "malformed {kind} item id: `{item_id}`")
            }
            Self::MalformedZone(zone) => write!(f, "malformed destination zone: `{zone}`"),
            Self::ZoneMismatch { kind, zone } => {
                write!(f, "zone `{zone}` cannot accept a {kind} drop")
            }
            Self::Assignment(err) => write!(f, "{err}"),
            Self::Pill(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Assignment(err) => Some(err),
            Self::Pill(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AssignmentError> for DispatchError {
    fn from(value: AssignmentError) -> Self {
        Self::Assignment(value)
    }
}

impl From<UnknownSlot> for DispatchError {
    fn from(value: UnknownSlot) -> Self {
        Self::Pill(value)
    }
}

/// Loosely-typed drop payload as delivered by the gesture router.
///
/// Delivered at most once per physical drop; the router owns pointer
/// tracking, inertia and snapping, the core only sees the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDropEvent {
    /// `task` or `pill`.
    pub item_kind: String,
    /// Task uuid, or pill slot index in decimal.
    pub item_id: String,
    /// `unscheduled`, `slot:<HH:MM>`, `pill:taken` or `pill:not-taken`.
    pub destination_zone_id: String,
}

/// The dropped item, decoded into its tagged form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropItem {
    Task(TaskId),
    Pill(usize),
}

impl DropItem {
    fn kind_label(&self) -> &'static str {
        match self {
            Self::Task(_) => "task",
            Self::Pill(_) => "pill",
        }
    }
}

/// The destination zone, decoded into its tagged form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropZone {
    Unscheduled,
    Bucket(String),
    PillTaken,
    PillNotTaken,
}

impl Display for DropZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unscheduled => write!(f, "{ZONE_UNSCHEDULED}"),
            Self::Bucket(label) => write!(f, "slot:{label}"),
            Self::PillTaken => write!(f, "{ZONE_PILL_TAKEN}"),
            Self::PillNotTaken => write!(f, "{ZONE_PILL_NOT_TAKEN}"),
        }
    }
}

/// Fully decoded drop event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub item: DropItem,
    pub zone: DropZone,
}

impl DropEvent {
    /// Decodes a raw payload, rejecting malformed kinds, ids and zones.
    ///
    /// Shape-only: calendar membership and slot-index range are checked by
    /// the owning store when the event is applied.
    pub fn decode(raw: &RawDropEvent) -> DispatchResult<Self> {
        let zone = parse_zone(&raw.destination_zone_id)?;
        let item = match raw.item_kind.as_str() {
            "task" => {
                let id = Uuid::parse_str(&raw.item_id).map_err(|_| {
                    DispatchError::MalformedItemId {
                        kind: "task",
                        item_id: raw.item_id.clone(),
                    }
                })?;
                DropItem::Task(id)
            }
            "pill" => {
                let index = raw.item_id.parse::<usize>().map_err(|_| {
                    DispatchError::MalformedItemId {
                        kind: "pill",
                        item_id: raw.item_id.clone(),
                    }
                })?;
                DropItem::Pill(index)
            }
            other => return Err(DispatchError::UnknownItemKind(other.to_string())),
        };

        Ok(Self { item, zone })
    }
}

fn parse_zone(zone_id: &str) -> DispatchResult<DropZone> {
    match zone_id {
        ZONE_UNSCHEDULED => return Ok(DropZone::Unscheduled),
        ZONE_PILL_TAKEN => return Ok(DropZone::PillTaken),
        ZONE_PILL_NOT_TAKEN => return Ok(DropZone::PillNotTaken),
        _ => {}
    }

    if let Some(captures) = SLOT_ZONE_RE.captures(zone_id) {
        return Ok(DropZone::Bucket(captures[1].to_string()));
    }

    Err(DispatchError::MalformedZone(zone_id.to_string()))
}

/// Which store a successfully applied drop touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropApplied {
    TaskMoved,
    PillSet,
}

/// One planning session: the task store and the pill track, owned together
/// and constructed explicitly at session start.
pub struct DaySession<R: TaskRepository> {
    tasks: TaskAssignmentStore<R>,
    pills: PillStatusTrack,
}

impl<R: TaskRepository> DaySession<R> {
    /// Opens a session: hydrates the task store and resets every pill token
    /// to not-taken (pill state is deliberately not durable).
    pub fn open(repo: R, calendar: SlotCalendar) -> AssignmentResult<Self> {
        let tasks = TaskAssignmentStore::open(repo, calendar)?;
        let pills = PillStatusTrack::new(tasks.calendar());
        Ok(Self { tasks, pills })
    }

    /// Decodes and applies one drop event.
    ///
    /// All-or-nothing: any decode or routing error leaves both stores
    /// untouched, except a `Persistence` failure, where the in-memory move
    /// has been applied and only the durable write is outstanding.
    pub fn apply_drop(&mut self, raw: &RawDropEvent) -> DispatchResult<DropApplied> {
        let event = DropEvent::decode(raw).map_err(|err| self.reject(raw, err))?;

        let applied = match (event.item, event.zone) {
            (DropItem::Task(id), DropZone::Unscheduled) => self
                .tasks
                .move_to_slot(id, SlotAssignment::Unscheduled)
                .map(|()| DropApplied::TaskMoved)
                .map_err(DispatchError::from),
            (DropItem::Task(id), DropZone::Bucket(label)) => self
                .tasks
                .move_to_slot(id, SlotAssignment::At(label))
                .map(|()| DropApplied::TaskMoved)
                .map_err(DispatchError::from),
            (DropItem::Pill(index), DropZone::PillTaken) => self
                .pills
                .set_taken(index, true)
                .map(|()| DropApplied::PillSet)
                .map_err(DispatchError::from),
            (DropItem::Pill(index), DropZone::PillNotTaken) => self
                .pills
                .set_taken(index, false)
                .map(|()| DropApplied::PillSet)
                .map_err(DispatchError::from),
            (item, zone) => Err(DispatchError::ZoneMismatch {
                kind: item.kind_label(),
                zone: zone.to_string(),
            }),
        };

        match applied {
            Ok(applied) => {
                info!(
                    "event=drop_apply module=dispatch status=ok kind={} zone={}",
                    raw.item_kind, raw.destination_zone_id
                );
                Ok(applied)
            }
            Err(err) => Err(self.reject(raw, err)),
        }
    }

    fn reject(&self, raw: &RawDropEvent, err: DispatchError) -> DispatchError {
        error!(
            "event=drop_reject module=dispatch status=error kind={} item_id={} zone={} error={}",
            raw.item_kind, raw.item_id, raw.destination_zone_id, err
        );
        err
    }

    /// Read view of the task store.
    pub fn tasks(&self) -> &TaskAssignmentStore<R> {
        &self.tasks
    }

    /// Mutable access for direct (non-drop) operations such as create.
    pub fn tasks_mut(&mut self) -> &mut TaskAssignmentStore<R> {
        &mut self.tasks
    }

    /// Read view of the pill track.
    pub fn pills(&self) -> &PillStatusTrack {
        &self.pills
    }

    pub fn pills_mut(&mut self) -> &mut PillStatusTrack {
        &mut self.pills
    }
}
