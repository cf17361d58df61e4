//! Core battle model: elements, slots, RNG, entities and combatants.

pub mod combatant;
pub mod element;
pub mod entity;
pub mod modifier;
pub mod rng;
pub mod slot;

pub use combatant::{Combatant, HAND_SIZE};
pub use element::{Element, ElementFilter};
pub use entity::EntityData;
pub use modifier::{Aura, AuraModifier, Blade, Shield};
pub use rng::BattleRng;
pub use slot::{Side, SlotIndex, SIDE_SIZE, SLOT_COUNT};
