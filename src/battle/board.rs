//! The 8-slot battle board.
//!
//! Owns the slot array (occupied or vacant) and the purely positional
//! operations: occupancy queries, side-empty checks for win detection,
//! and lobby seat compaction toward the side anchors.

use serde::{Deserialize, Serialize};

use crate::core::{Combatant, Side, SlotIndex, SLOT_COUNT};

/// The 8 battle slots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    slots: [Option<Combatant>; SLOT_COUNT],
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The combatant in a slot, if any.
    #[must_use]
    pub fn get(&self, slot: SlotIndex) -> Option<&Combatant> {
        self.slots[slot.index()].as_ref()
    }

    /// Mutable access to the combatant in a slot, if any.
    pub fn get_mut(&mut self, slot: SlotIndex) -> Option<&mut Combatant> {
        self.slots[slot.index()].as_mut()
    }

    /// Seat a combatant. Panics if the slot is occupied.
    pub fn seat(&mut self, slot: SlotIndex, combatant: Combatant) {
        assert!(
            self.slots[slot.index()].is_none(),
            "{slot} is already occupied"
        );
        self.slots[slot.index()] = Some(combatant);
    }

    /// Vacate a slot, returning its former occupant.
    pub fn vacate(&mut self, slot: SlotIndex) -> Option<Combatant> {
        self.slots[slot.index()].take()
    }

    /// Whether a slot holds a combatant.
    #[must_use]
    pub fn is_occupied(&self, slot: SlotIndex) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// First vacant slot in ascending order, if any.
    #[must_use]
    pub fn first_vacant(&self) -> Option<SlotIndex> {
        SlotIndex::all().find(|s| !self.is_occupied(*s))
    }

    /// Iterate over occupied slots in ascending order.
    pub fn occupied(&self) -> impl Iterator<Item = (SlotIndex, &Combatant)> {
        SlotIndex::all().filter_map(|s| self.get(s).map(|c| (s, c)))
    }

    /// Whether every slot on a side is vacant.
    #[must_use]
    pub fn side_is_empty(&self, side: Side) -> bool {
        side.slots().all(|s| !self.is_occupied(s))
    }

    /// Shift one combatant toward its side's anchor through any vacant
    /// lower slots, returning the final slot.
    pub fn shove_down(&mut self, slot: SlotIndex) -> SlotIndex {
        let anchor = slot.side().anchor();
        let mut pos = slot;
        while pos > anchor && !self.is_occupied(SlotIndex(pos.0 - 1)) {
            let combatant = self.slots[pos.index()].take();
            self.slots[pos.index() - 1] = combatant;
            pos = SlotIndex(pos.0 - 1);
        }
        pos
    }

    /// Compact every occupied slot toward its side anchor, preserving
    /// relative order within each side. Returns the moves performed so
    /// the caller can reseat connections.
    pub fn compact(&mut self) -> Vec<(SlotIndex, SlotIndex)> {
        let mut moves = Vec::new();
        for slot in SlotIndex::all() {
            if self.is_occupied(slot) {
                let landed = self.shove_down(slot);
                if landed != slot {
                    moves.push((slot, landed));
                }
            }
        }
        moves
    }
}
