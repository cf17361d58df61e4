//! Battle modifiers: blades, shields and auras.
//!
//! Blades are caster-side offensive multipliers consumed on cast. Shields
//! are victim-side defensive modifiers consumed by recency, optionally
//! converting the effective element for the rest of the chain. An aura is
//! a session-wide ambient multiplier set by a dedicated card type.
//!
//! Modifier identity matters during resolution: within one cast a given
//! id is consumed at most once even when stacked instances share it, but
//! stacked instances with equal ids are otherwise legal and kept side by
//! side.

use serde::{Deserialize, Serialize};

use super::element::{Element, ElementFilter};

/// Caster-side offensive multiplier.
///
/// A matching blade multiplies the cast's tilt by `(value + 100) / 100`
/// and is removed once the cast resolves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blade {
    /// Consumption identity (at most one use per id per cast).
    pub id: String,
    /// Percentage boost; 40 means +40%.
    pub value: f64,
    /// Element this blade applies to, or `"all"`.
    pub element: ElementFilter,
}

/// Victim-side defensive (or amplifying) modifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shield {
    /// Consumption identity (at most one use per id per cast).
    pub id: String,
    /// Percentage adjustment to the running base; negative values reduce
    /// damage, positive values amplify it (traps).
    #[serde(default)]
    pub value: Option<f64>,
    /// Element this shield reacts to, or `"all"`.
    pub element: ElementFilter,
    /// If set, the effective element becomes this for the rest of the chain.
    #[serde(default)]
    pub element_to: Option<Element>,
}

/// One per-element multiplier inside an aura.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuraModifier {
    /// Element the modifier applies to.
    pub element: Element,
    /// Multiplicative damage factor for matching spells.
    pub value: f64,
}

/// Session-wide ambient modifier.
///
/// At most one aura is active; playing an AURA-type card replaces it
/// wholesale (last played wins, no stacking).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aura {
    /// Per-element multipliers.
    pub modifiers: Vec<AuraModifier>,
}

impl Aura {
    /// Create an aura from its modifiers.
    #[must_use]
    pub fn new(modifiers: Vec<AuraModifier>) -> Self {
        Self { modifiers }
    }

    /// Combined multiplier for a spell of the given element.
    #[must_use]
    pub fn factor_for(&self, element: &Element) -> f64 {
        self.modifiers
            .iter()
            .filter(|m| &m.element == element)
            .map(|m| m.value)
            .product()
    }
}
