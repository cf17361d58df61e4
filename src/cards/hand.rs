//! Hand and deck card instances.
//!
//! Cards in a hand or battle deck are lightweight references into the
//! spell catalog: an id plus optional per-instance enchantment overrides.

use serde::{Deserialize, Serialize};

use super::spell::SpellId;

/// Per-instance enchantment overrides applied on top of a spell
/// definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Enchantments {
    /// Accuracy delta added to the spell's base chance.
    #[serde(default)]
    pub accuracy: f64,

    /// Flat damage adjustment, split evenly across the spell's
    /// sub-effects.
    #[serde(default)]
    pub damage: f64,
}

/// A card instance in a hand or battle deck.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandCard {
    /// Catalog id of the underlying spell.
    pub id: SpellId,

    /// Optional per-instance overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enchantments: Option<Enchantments>,
}

impl HandCard {
    /// Accuracy delta from enchantments, or 0.
    #[must_use]
    pub fn accuracy_delta(&self) -> f64 {
        self.enchantments.map_or(0.0, |e| e.accuracy)
    }
}

impl From<SpellId> for HandCard {
    fn from(id: SpellId) -> Self {
        Self {
            id,
            enchantments: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_card_wire_shape() {
        let card = HandCard::from(SpellId::from("fire_bolt"));
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, r#"{"id":"fire_bolt"}"#);
    }

    #[test]
    fn test_enchanted_card_round_trip() {
        let card = HandCard {
            id: SpellId::from("fire_bolt"),
            enchantments: Some(Enchantments {
                accuracy: 0.1,
                damage: -20.0,
            }),
        };
        let json = serde_json::to_string(&card).unwrap();
        let back: HandCard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
        assert_eq!(back.accuracy_delta(), 0.1);
    }

    #[test]
    fn test_missing_enchantments_default() {
        let card: HandCard = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(card.enchantments, None);
        assert_eq!(card.accuracy_delta(), 0.0);
    }
}
