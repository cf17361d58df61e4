//! Immutable combatant base data.
//!
//! `EntityData` is what a client (or the passive-entity roster) submits
//! when seating a combatant: name, element, health ceiling, critical
//! rating, the per-element augment table and the default deck. Runtime
//! battle state lives in `Combatant`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::element::Element;
use crate::cards::SpellId;

/// Immutable base data for one combatant.
///
/// The augment table maps an incoming effective element to a damage
/// factor: values above 1 are weaknesses, values below 1 resistances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityData {
    /// Display name.
    pub name: String,

    /// The combatant's own element; spells matching it are critical-eligible
    /// and spend premium resource at double value.
    pub element: Element,

    /// Health ceiling. Current health is clamped to this after every cast.
    pub max_health: i64,

    /// Critical rating fed into the critical-chance formula.
    pub critical_rating: i64,

    /// Per-element damage factors (weaknesses > 1, resistances < 1).
    #[serde(default)]
    pub augments: FxHashMap<Element, f64>,

    /// Default deck, used when a seat has no submitted battle deck.
    #[serde(default)]
    pub deck: Vec<SpellId>,

    /// Probability that a regenerated resource point lands in the premium
    /// pool instead of the ordinary one.
    #[serde(default)]
    pub super_vril_chance: f64,
}

impl EntityData {
    /// Augment factor for an incoming effective element, if any.
    #[must_use]
    pub fn augment_for(&self, element: &Element) -> Option<f64> {
        self.augments.get(element).copied()
    }
}
