//! Spell definitions, hand-card instances and the external catalog.

pub mod catalog;
pub mod hand;
pub mod spell;

pub use catalog::SpellCatalog;
pub use hand::{Enchantments, HandCard};
pub use spell::{DamageEffect, HealEffect, SpellDefinition, SpellId, SpellKind, TargetRule};
