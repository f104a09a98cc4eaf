//! Per-slot pill status track.
//!
//! # Responsibility
//! - Own the session's pill tokens, one per calendar slot.
//! - Expose the taken/not-taken toggle and read views.
//!
//! # Invariants
//! - Tokens are created once at session start and never added or removed.
//! - An out-of-range index rejects without mutating any token.
//! - State is session-scoped: a new session starts all-not-taken.

use crate::calendar::SlotCalendar;
use crate::model::pill::PillToken;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Referential error for pill operations addressing a nonexistent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownSlot {
    pub slot_index: usize,
    pub slot_count: usize,
}

impl Display for UnknownSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown slot index {} (calendar has {} slots)",
            self.slot_index, self.slot_count
        )
    }
}

impl Error for UnknownSlot {}

/// Owner of the pill token collection.
///
/// Independent of the task store; the two only share the slot catalog and
/// the drop-event vocabulary.
pub struct PillStatusTrack {
    tokens: Vec<PillToken>,
}

impl PillStatusTrack {
    /// One not-taken token per slot of `calendar`.
    pub fn new(calendar: &SlotCalendar) -> Self {
        Self {
            tokens: (0..calendar.len()).map(PillToken::new).collect(),
        }
    }

    /// Sets the taken flag for one slot's token.
    ///
    /// Idempotent at the observable level: writing the current value again
    /// succeeds.
    pub fn set_taken(&mut self, slot_index: usize, taken: bool) -> Result<(), UnknownSlot> {
        let slot_count = self.tokens.len();
        let token = self.tokens.get_mut(slot_index).ok_or(UnknownSlot {
            slot_index,
            slot_count,
        })?;

        token.taken = taken;
        info!("event=pill_set module=pill status=ok slot_index={slot_index} taken={taken}");
        Ok(())
    }

    /// The token for `slot_index`, or `None` when out of range.
    pub fn get(&self, slot_index: usize) -> Option<&PillToken> {
        self.tokens.get(slot_index)
    }

    /// Every token, ordered by slot index.
    pub fn tokens(&self) -> &[PillToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
