//! Runtime battle state for one seated combatant.
//!
//! A `Combatant` binds an immutable `EntityData` to everything that
//! mutates during a battle: current health, the two resource pools, the
//! active blades and shields, the hand and the remaining draw pile.
//!
//! Health is an integer in `[0, max_health]` after every round; during a
//! round it may drop to or below 0 without the combatant being removed -
//! death pruning happens at end-of-round settling only.
//!
//! Hand, deck and modifier lists use `im::Vector` so per-cast board
//! snapshots for the animation trace are O(1) clones, and the failed-cast
//! rule's `push_front` is cheap.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::entity::EntityData;
use super::modifier::{Blade, Shield};
use super::rng::BattleRng;
use crate::cards::HandCard;
use crate::core::element::Element;

/// Maximum hand size; hands refill to this at end of round.
pub const HAND_SIZE: usize = 7;

/// Runtime battle state bound to an immutable entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    /// Immutable base data.
    pub entity: EntityData,

    /// Current health. Integer, at most `entity.max_health`; may be ≤ 0
    /// mid-round until settling prunes the seat.
    pub health: i64,

    /// Ordinary resource pool.
    pub vril: i64,

    /// Premium resource pool; worth 2 ordinary units on the combatant's
    /// own element and spent greedily at 2-for-1.
    pub super_vril: i64,

    /// Active offensive modifiers, in acquisition order.
    pub blades: Vector<Blade>,

    /// Active defensive modifiers; consumed most-recently-added first.
    pub shields: Vector<Shield>,

    /// Playable cards (≤ 7).
    pub hand: Vector<HandCard>,

    /// Remaining draw pile; drawn from the back, failed casts return to
    /// the front. `None` until a deck has been submitted or dealt.
    #[serde(default)]
    pub battle_deck: Option<Vector<HandCard>>,

    /// Whether this seat is filled by the automated opponent policy.
    pub is_ai: bool,
}

impl Combatant {
    /// Seat a new combatant at full health with one starting resource
    /// point, premium with the entity's configured probability.
    #[must_use]
    pub fn new(entity: EntityData, is_ai: bool, rng: &mut BattleRng) -> Self {
        let premium_start = rng.gen_bool(entity.super_vril_chance);
        Self {
            health: entity.max_health,
            vril: i64::from(!premium_start),
            super_vril: i64::from(premium_start),
            blades: Vector::new(),
            shields: Vector::new(),
            hand: Vector::new(),
            battle_deck: None,
            is_ai,
            entity,
        }
    }

    /// Whether this combatant still counts as alive for skip rules.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Total spendable resource for a spell of the given element.
    ///
    /// Premium points are worth 2 on the combatant's own element.
    #[must_use]
    pub fn total_resource(&self, spell_element: &Element) -> i64 {
        if *spell_element == self.entity.element {
            self.super_vril * 2 + self.vril
        } else {
            self.super_vril + self.vril
        }
    }

    /// Whether the combatant can currently pay the given cost for a spell
    /// of the given element.
    #[must_use]
    pub fn can_afford(&self, cost: i64, spell_element: &Element) -> bool {
        self.total_resource(spell_element) >= cost
    }

    /// Deduct a spell's resource cost.
    ///
    /// Premium points are spent greedily while they yield a 2-for-1
    /// benefit (each point covers 2 cost while more than 1 cost remains);
    /// the remainder comes from the ordinary pool, or - if that pool is
    /// already empty - from premium at `ceil(remaining / 2)`.
    pub fn spend_vril(&mut self, cost: i64) {
        let mut remaining = cost;
        while remaining > 1 && self.super_vril > 0 {
            self.super_vril -= 1;
            remaining -= 2;
        }
        if self.vril == 0 {
            self.super_vril -= (remaining + 1) / 2;
        } else {
            self.vril -= remaining;
        }
    }

    /// Zero both pools (full-resource-scaled casts consume everything).
    pub fn clear_resources(&mut self) {
        self.vril = 0;
        self.super_vril = 0;
    }

    /// Regenerate one resource point, routed to the premium pool with the
    /// entity's configured probability.
    pub fn grant_resource_point(&mut self, rng: &mut BattleRng) {
        if rng.gen_bool(self.entity.super_vril_chance) {
            self.super_vril += 1;
        } else {
            self.vril += 1;
        }
    }

    /// Draw from the battle deck until the hand holds 7 cards, stopping
    /// early if the deck runs out.
    pub fn refill_hand(&mut self) {
        let Some(deck) = self.battle_deck.as_mut() else {
            return;
        };
        while self.hand.len() < HAND_SIZE {
            match deck.pop_back() {
                Some(card) => self.hand.push_back(card),
                None => break,
            }
        }
    }

    /// Return a card to the front of the draw pile (failed casts are
    /// drawn again soon).
    pub fn return_to_deck_front(&mut self, card: HandCard) {
        self.battle_deck
            .get_or_insert_with(Vector::new)
            .push_front(card);
    }

    /// Clamp health to the entity's ceiling. No floor: death detection
    /// happens at end of round, not mid-resolution.
    pub fn normalize_health(&mut self) {
        if self.health > self.entity.max_health {
            self.health = self.entity.max_health;
        }
    }
}
