//! Battle slots and side membership.
//!
//! A battle has 8 fixed positions: slots 0-3 are the left side, slots 4-7
//! the right side. Side membership is derived from the slot index alone -
//! there is no separate team assignment anywhere in the engine.

use serde::{Deserialize, Serialize};

/// Number of battle slots.
pub const SLOT_COUNT: usize = 8;

/// Slots per side.
pub const SIDE_SIZE: usize = 4;

/// One of the 8 fixed battle positions.
///
/// Serializes as a bare number; deserialization rejects out-of-range
/// indices so hostile input can never address a nonexistent slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct SlotIndex(pub u8);

impl SlotIndex {
    /// Create a slot index. Panics if `index >= 8`.
    #[must_use]
    pub fn new(index: u8) -> Self {
        assert!((index as usize) < SLOT_COUNT, "Slot index out of range");
        Self(index)
    }

    /// Create a slot index, returning `None` if out of range.
    #[must_use]
    pub fn checked(index: u8) -> Option<Self> {
        ((index as usize) < SLOT_COUNT).then_some(Self(index))
    }

    /// Raw index as `usize` for array access.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The side this slot belongs to.
    #[must_use]
    pub const fn side(self) -> Side {
        if (self.0 as usize) < SIDE_SIZE {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Iterate over all 8 slots in ascending order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOT_COUNT as u8).map(SlotIndex)
    }
}

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slot {}", self.0)
    }
}

impl TryFrom<u8> for SlotIndex {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::checked(index).ok_or_else(|| format!("slot index {index} out of range"))
    }
}

impl From<SlotIndex> for u8 {
    fn from(slot: SlotIndex) -> u8 {
        slot.0
    }
}

/// One of the two battle sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The side's anchor slot, toward which seats are compacted.
    #[must_use]
    pub const fn anchor(self) -> SlotIndex {
        match self {
            Side::Left => SlotIndex(0),
            Side::Right => SlotIndex(SIDE_SIZE as u8),
        }
    }

    /// The opposing side.
    #[must_use]
    pub const fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Iterate over this side's slots in ascending order.
    pub fn slots(self) -> impl Iterator<Item = SlotIndex> {
        let start = self.anchor().0;
        (start..start + SIDE_SIZE as u8).map(SlotIndex)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => f.write_str("LEFT"),
            Side::Right => f.write_str("RIGHT"),
        }
    }
}
