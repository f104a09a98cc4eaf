//! Pill status token model.

use serde::{Deserialize, Serialize};

/// Binary taken/not-taken marker for one slot's recurring item.
///
/// Exactly one token exists per calendar slot for the lifetime of a session;
/// tokens never change slot, only their `taken` flag. The collection is
/// session-scoped and intentionally not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillToken {
    /// Index of the owning slot in the session calendar; fixed for life.
    pub slot_index: usize,
    /// The only mutable field.
    pub taken: bool,
}

impl PillToken {
    /// A fresh not-taken token for `slot_index`.
    pub fn new(slot_index: usize) -> Self {
        Self {
            slot_index,
            taken: false,
        }
    }
}
