use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a save slot, zero-based.
///
/// Construct with [`SlotIndex::new`] to check it against the configured
/// number of slots. Displays one-based, the way players count saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// The first slot, used as the default active slot.
    pub const FIRST: SlotIndex = SlotIndex(0);

    /// Create a slot index, or `None` if it is not below `slot_count`.
    pub fn new(index: usize, slot_count: usize) -> Option<Self> {
        (index < slot_count).then_some(Self(index))
    }

    /// Create a slot index from a one-based number as typed by a player.
    pub fn from_number(number: usize, slot_count: usize) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|index| Self::new(index, slot_count))
    }

    /// The zero-based index.
    pub fn get(self) -> usize {
        self.0
    }

    /// The one-based slot number.
    pub fn number(self) -> usize {
        self.0 + 1
    }

    /// All slots for a given slot count, in order.
    pub fn all(slot_count: usize) -> impl Iterator<Item = SlotIndex> {
        (0..slot_count).map(SlotIndex)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Save {}", self.number())
    }
}
