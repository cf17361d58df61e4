//! Damage/effect calculator.
//!
//! Pure magnitude computation for one attack cast against one victim.
//! The caller has already made the accuracy draw; this component assumes
//! a hit and works out the critical outcome, the tilt from auras and
//! blades, and the per-sub-effect damage after the victim's shield chain
//! and elemental augments.
//!
//! Nothing here mutates combatants. Consumed blades and shields are
//! reported as advisory `(index, id)` references against the pre-cast
//! lists; the orchestrator applies them.
//!
//! Non-damaging spell kinds (heals, auras) never reach the calculator -
//! the session machine applies those directly.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Enchantments, SpellDefinition};
use crate::core::{Aura, BattleRng, Combatant, Element};

/// Critical-hit chance from the two combatants' critical ratings.
///
/// `((Δ−32) / (2·(16+|Δ−32|)) + 0.5) · (min(caster, 100) / 100)` with
/// `Δ = caster − victim`: biased toward the higher-rated combatant,
/// saturating as the gap grows, scaled down for low caster ratings.
/// A caster rating of 0 always yields 0.
#[must_use]
pub fn critical_chance(caster_rating: i64, victim_rating: i64) -> f64 {
    let shifted = (caster_rating - victim_rating) as f64 - 32.0;
    (shifted / (2.0 * (16.0 + shifted.abs())) + 0.5) * (caster_rating.min(100) as f64 / 100.0)
}

/// Round to the nearest integer, ties toward positive infinity
/// (the rounding the original wire format was built on).
#[must_use]
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Reference to a consumed blade or shield: position and identity in the
/// pre-cast list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRef {
    /// Index into the owner's list at computation time.
    pub index: usize,
    /// The layer's consumption id.
    pub id: String,
}

/// Whether the victim's augment table amplified or dampened the hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AugmentMark {
    /// Factor above 1 - an elemental weakness.
    Amplified,
    /// Factor at or below 1 - a resistance.
    Dampened,
}

/// Computed result for one damage sub-effect against one victim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubEffectOutcome {
    /// Rounded signed health delta for the victim.
    pub damage: i64,
    /// Augment marker when the victim's table had an entry for the final
    /// effective element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub augment: Option<AugmentMark>,
    /// Shields consumed by this sub-effect's chain.
    pub consumed_shields: SmallVec<[LayerRef; 2]>,
}

/// Computed result of one cast against one victim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VictimOutcome {
    /// Whether the cast landed critically on this victim.
    pub critical: bool,
    /// Blades consumed by this cast.
    pub consumed_blades: SmallVec<[LayerRef; 2]>,
    /// Per-sub-effect results, in definition order.
    pub effects: SmallVec<[SubEffectOutcome; 2]>,
}

/// The computed result of one cast: either the accuracy draw failed, or a
/// per-victim outcome list (empty for non-damaging kinds).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "result", content = "outcomes")]
pub enum CastComputation {
    /// The accuracy draw missed; the card returns to the deck front.
    Failed,
    /// The cast landed; one outcome per (filtered) victim for attacks,
    /// empty for heals and auras.
    Struck(Vec<VictimOutcome>),
}

impl CastComputation {
    /// Whether the cast failed its accuracy draw.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, CastComputation::Failed)
    }
}

/// Compute one attack cast against one victim.
///
/// Draws from `rng` for the critical check and any ranged magnitudes;
/// otherwise pure. Call once per victim, against the same pre-cast
/// caster/victim state the accuracy draw saw.
#[must_use]
pub fn compute_victim_outcome(
    spell: &SpellDefinition,
    enchantments: Option<&Enchantments>,
    caster: &Combatant,
    victim: &Combatant,
    aura: Option<&Aura>,
    rng: &mut BattleRng,
) -> VictimOutcome {
    let critical = spell.element == caster.entity.element
        && rng.gen_unit()
            <= critical_chance(caster.entity.critical_rating, victim.entity.critical_rating);

    // Tilt: ambient aura first, then blades in acquisition order, each
    // blade id at most once.
    let mut tilt = aura.map_or(1.0, |a| a.factor_for(&spell.element));
    let mut consumed_blades: SmallVec<[LayerRef; 2]> = SmallVec::new();
    let mut exhausted_blades: FxHashSet<&str> = FxHashSet::default();
    for (index, blade) in caster.blades.iter().enumerate() {
        if blade.element.matches(&spell.element) && !exhausted_blades.contains(blade.id.as_str()) {
            tilt *= (blade.value + 100.0) / 100.0;
            exhausted_blades.insert(blade.id.as_str());
            consumed_blades.push(LayerRef {
                index,
                id: blade.id.clone(),
            });
        }
    }

    let reduction = match enchantments {
        Some(e) if !spell.damages.is_empty() => e.damage / spell.damages.len() as f64,
        _ => 0.0,
    };

    // Shield ids exhaust across the whole cast, not per sub-effect.
    let mut exhausted_shields: FxHashSet<&str> = FxHashSet::default();

    let effects = spell
        .damages
        .iter()
        .map(|sub| {
            let mut base = match (sub.damage, sub.min_damage, sub.max_damage) {
                (Some(fixed), _, _) => fixed,
                (None, Some(min), Some(max)) => rng.gen_range_f64(min, max),
                _ => 0.0,
            };
            if sub.per_vril {
                base *= caster.total_resource(&sub.element) as f64;
            }
            base -= reduction;

            // Shield chain, most recent first; conversions redirect the
            // rest of the chain.
            let mut current_element: Element = sub.element.clone();
            let mut consumed_shields: SmallVec<[LayerRef; 2]> = SmallVec::new();
            for index in (0..victim.shields.len()).rev() {
                let shield = &victim.shields[index];
                if !shield.element.matches(&current_element)
                    || exhausted_shields.contains(shield.id.as_str())
                {
                    continue;
                }
                if let Some(value) = shield.value {
                    base += base * (value / 100.0);
                }
                if let Some(to) = &shield.element_to {
                    current_element = to.clone();
                }
                exhausted_shields.insert(shield.id.as_str());
                consumed_shields.push(LayerRef {
                    index,
                    id: shield.id.clone(),
                });
            }

            if critical {
                base *= 2.0;
            }

            let augment = victim.entity.augment_for(&current_element);
            SubEffectOutcome {
                damage: round_half_up(base * tilt * augment.unwrap_or(1.0)),
                augment: augment.map(|factor| {
                    if factor > 1.0 {
                        AugmentMark::Amplified
                    } else {
                        AugmentMark::Dampened
                    }
                }),
                consumed_shields,
            }
        })
        .collect();

    VictimOutcome {
        critical,
        consumed_blades,
        effects,
    }
}
