//! Spell definitions - static card data.
//!
//! A `SpellDefinition` holds the immutable properties of a card in the
//! external catalog: its type, element, accuracy chance, resource cost,
//! damage/heal sub-effects and any blades, shields or aura modifiers it
//! grants. Field names follow the catalog's JSON wire format.
//!
//! Damage magnitudes are signed health deltas: attack spells carry
//! negative values, so applying a sub-effect is always `health += damage`
//! and reflect-style healing attacks need no special case.

use serde::{Deserialize, Serialize};

use crate::core::{AuraModifier, Blade, Element, ElementFilter, Shield, SlotIndex};

/// Catalog identifier for a spell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellId(pub String);

impl SpellId {
    /// Create a spell id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SpellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpellId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Spell type, driving how a cast is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpellKind {
    /// Damages one chosen victim.
    AttackBasic,
    /// Damages every legal victim simultaneously.
    AttackAll,
    /// Restores fixed health to the first chosen victim; never randomized,
    /// shielded or critical.
    HealingBasic,
    /// Replaces the session-wide aura.
    Aura,
}

impl SpellKind {
    /// Whether casts of this kind go through the damage calculator.
    #[must_use]
    pub fn is_attack(self) -> bool {
        matches!(self, SpellKind::AttackBasic | SpellKind::AttackAll)
    }
}

/// Who a spell may target, decided purely by slot-index side comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetRule {
    /// The caster's own slot only.
    #[serde(rename = "SELF")]
    Self_,
    /// Any slot on the caster's side.
    Allies,
    /// Any slot on the opposing side.
    #[default]
    Enemies,
    /// Any slot.
    All,
}

impl TargetRule {
    /// Whether `target` is legal for a caster in `caster` under this rule.
    #[must_use]
    pub fn allows(self, caster: SlotIndex, target: SlotIndex) -> bool {
        match self {
            TargetRule::Self_ => caster == target,
            TargetRule::Allies => caster.side() == target.side(),
            TargetRule::Enemies => caster.side() != target.side(),
            TargetRule::All => true,
        }
    }
}

/// One damage sub-effect of an attack spell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageEffect {
    /// The sub-effect's element; the shield chain may convert it.
    pub element: Element,

    /// Fixed signed health delta (negative harms). When absent, a uniform
    /// draw in `[min_damage, max_damage]` is used instead.
    #[serde(default)]
    pub damage: Option<f64>,

    /// Lower bound of a ranged magnitude.
    #[serde(default)]
    pub min_damage: Option<f64>,

    /// Upper bound of a ranged magnitude.
    #[serde(default)]
    pub max_damage: Option<f64>,

    /// Fraction of the dealt damage deducted from the caster's own health
    /// (drain effects: negative damage times a fraction heals the caster).
    #[serde(default)]
    pub steal: Option<f64>,

    /// Scale the magnitude by the caster's total relevant resource; such
    /// casts consume both pools entirely.
    #[serde(default)]
    pub per_vril: bool,
}

/// One heal sub-effect of a healing spell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealEffect {
    /// Fixed health restored.
    pub heal: i64,
}

/// Static spell definition from the external catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellDefinition {
    /// Display name.
    pub name: String,

    /// Spell type.
    #[serde(rename = "type")]
    pub kind: SpellKind,

    /// The spell's element (critical eligibility, blades, aura matching).
    pub element: Element,

    /// Base accuracy chance in `[0, 1]`, before enchantment deltas.
    pub chance: f64,

    /// Resource cost.
    #[serde(default)]
    pub vril_required: i64,

    /// Damage sub-effects (attack spells).
    #[serde(default)]
    pub damages: Vec<DamageEffect>,

    /// Heal sub-effects (healing spells).
    #[serde(default)]
    pub heals: Vec<HealEffect>,

    /// Aura modifiers installed by AURA-type spells.
    #[serde(default)]
    pub aura: Vec<AuraModifier>,

    /// Shields appended to the caster after the cast.
    #[serde(default)]
    pub caster_shields: Vec<Shield>,

    /// Shields appended to every victim after the cast.
    #[serde(default)]
    pub victim_shields: Vec<Shield>,

    /// Blades appended to the caster after the cast.
    #[serde(default)]
    pub caster_blades: Vec<Blade>,

    /// Blades appended to every victim after the cast.
    #[serde(default)]
    pub victim_blades: Vec<Blade>,

    /// Legal-target rule.
    #[serde(default)]
    pub target: TargetRule,
}

impl SpellDefinition {
    /// Whether any damage sub-effect uses full-resource scaling.
    #[must_use]
    pub fn uses_full_resource(&self) -> bool {
        self.damages.iter().any(|d| d.per_vril)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_tags() {
        assert_eq!(
            serde_json::to_string(&SpellKind::AttackBasic).unwrap(),
            "\"ATTACK_BASIC\""
        );
        assert_eq!(
            serde_json::to_string(&SpellKind::AttackAll).unwrap(),
            "\"ATTACK_ALL\""
        );
        assert_eq!(
            serde_json::to_string(&SpellKind::HealingBasic).unwrap(),
            "\"HEALING_BASIC\""
        );
        assert_eq!(serde_json::to_string(&SpellKind::Aura).unwrap(), "\"AURA\"");
    }

    #[test]
    fn test_target_rule_side_comparison() {
        let caster = SlotIndex::new(1);
        assert!(TargetRule::Self_.allows(caster, SlotIndex::new(1)));
        assert!(!TargetRule::Self_.allows(caster, SlotIndex::new(2)));

        assert!(TargetRule::Allies.allows(caster, SlotIndex::new(3)));
        assert!(!TargetRule::Allies.allows(caster, SlotIndex::new(4)));

        assert!(TargetRule::Enemies.allows(caster, SlotIndex::new(7)));
        assert!(!TargetRule::Enemies.allows(caster, SlotIndex::new(0)));

        assert!(TargetRule::All.allows(caster, SlotIndex::new(0)));
        assert!(TargetRule::All.allows(caster, SlotIndex::new(7)));
    }

    #[test]
    fn test_definition_from_catalog_json() {
        let json = r#"{
            "name": "Ember Swarm",
            "type": "ATTACK_ALL",
            "element": "fire",
            "chance": 0.8,
            "vrilRequired": 3,
            "damages": [
                { "element": "fire", "minDamage": -120, "maxDamage": -80 },
                { "element": "fire", "damage": -25, "steal": 0.5 }
            ],
            "victimShields": [
                { "id": "cinder", "value": 25, "element": "fire" }
            ]
        }"#;

        let spell: SpellDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(spell.kind, SpellKind::AttackAll);
        assert!(spell.kind.is_attack());
        assert_eq!(spell.vril_required, 3);
        assert_eq!(spell.damages.len(), 2);
        assert_eq!(spell.damages[0].min_damage, Some(-120.0));
        assert_eq!(spell.damages[1].steal, Some(0.5));
        assert_eq!(spell.victim_shields.len(), 1);
        assert_eq!(spell.target, TargetRule::Enemies);
        assert!(!spell.uses_full_resource());
    }

    #[test]
    fn test_full_resource_flag() {
        let json = r#"{
            "name": "Vril Burst",
            "type": "ATTACK_BASIC",
            "element": "storm",
            "chance": 0.7,
            "damages": [{ "element": "storm", "damage": -30, "perVril": true }]
        }"#;
        let spell: SpellDefinition = serde_json::from_str(json).unwrap();
        assert!(spell.uses_full_resource());
    }
}
