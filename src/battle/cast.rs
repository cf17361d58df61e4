//! Round orchestrator: applies one committed cast to the shared state.
//!
//! Given the caster slot, the filtered victim set, the played card and
//! the calculator's advisory outcome, this mutates the board and aura:
//! health deltas, layer consumption/grants, resource cost, discard, and
//! the post-cast normalization pass.
//!
//! Nothing here prunes deaths: a combatant may drop to or below 0 health
//! and still act later in the same round. Settling at end of round is the
//! only place seats are vacated.

use std::collections::BTreeSet;

use crate::battle::board::Board;
use crate::battle::calc::{round_half_up, CastComputation, VictimOutcome};
use crate::cards::{SpellDefinition, SpellKind};
use crate::core::{Aura, SlotIndex};

/// Apply one committed cast.
///
/// `victims` is the already-filtered victim set (vacant and dead slots
/// removed by the round loop); for attacks, `computation` carries one
/// outcome per victim in the same order. The card at `card_index` leaves
/// the caster's hand either way: to the discard on success, to the front
/// of the battle deck on a failed accuracy draw.
pub fn apply_cast(
    board: &mut Board,
    aura: &mut Option<Aura>,
    spell: &SpellDefinition,
    caster: SlotIndex,
    victims: &[SlotIndex],
    card_index: usize,
    computation: &CastComputation,
) {
    let outcomes = match computation {
        CastComputation::Failed => {
            if let Some(c) = board.get_mut(caster) {
                if card_index < c.hand.len() {
                    let card = c.hand.remove(card_index);
                    c.return_to_deck_front(card);
                }
            }
            return;
        }
        CastComputation::Struck(outcomes) => outcomes,
    };

    match spell.kind {
        SpellKind::Aura => {
            *aura = Some(Aura::new(spell.aura.clone()));
        }
        SpellKind::HealingBasic => {
            // Heals land on the first designated victim only.
            if let Some(victim) = victims.first().and_then(|s| board.get_mut(*s)) {
                for heal in &spell.heals {
                    victim.health += heal.heal;
                }
            }
        }
        SpellKind::AttackBasic | SpellKind::AttackAll => {
            apply_attack(board, spell, caster, victims, outcomes);
        }
    }

    // Granted layers append as-is: stacked instances with equal ids are
    // distinct and legal.
    for slot in victims {
        if let Some(victim) = board.get_mut(*slot) {
            victim.shields.extend(spell.victim_shields.iter().cloned());
            victim.blades.extend(spell.victim_blades.iter().cloned());
        }
    }
    if let Some(c) = board.get_mut(caster) {
        c.shields.extend(spell.caster_shields.iter().cloned());
        c.blades.extend(spell.caster_blades.iter().cloned());

        if spell.uses_full_resource() {
            c.clear_resources();
        } else {
            c.spend_vril(spell.vril_required);
        }

        if card_index < c.hand.len() {
            c.hand.remove(card_index);
        }
    }

    // Normalization applies board-wide after every cast: integer health
    // at or below the ceiling, never floor-clamped here.
    for slot in SlotIndex::all() {
        if let Some(c) = board.get_mut(slot) {
            c.normalize_health();
        }
    }
}

fn apply_attack(
    board: &mut Board,
    spell: &SpellDefinition,
    caster: SlotIndex,
    victims: &[SlotIndex],
    outcomes: &[VictimOutcome],
) {
    let mut consumed_blade_indices: BTreeSet<usize> = BTreeSet::new();

    for (slot, outcome) in victims.iter().zip(outcomes) {
        consumed_blade_indices.extend(outcome.consumed_blades.iter().map(|r| r.index));

        // Victim first: shields burn off and the damage lands.
        let mut caster_drain = 0_i64;
        if let Some(victim) = board.get_mut(*slot) {
            let consumed_shields: BTreeSet<usize> = outcome
                .effects
                .iter()
                .flat_map(|e| e.consumed_shields.iter().map(|r| r.index))
                .collect();
            for index in consumed_shields.into_iter().rev() {
                if index < victim.shields.len() {
                    victim.shields.remove(index);
                }
            }

            for (effect, sub) in outcome.effects.iter().zip(&spell.damages) {
                victim.health += effect.damage;
                if let Some(fraction) = sub.steal {
                    caster_drain += round_half_up(effect.damage as f64 * fraction);
                }
            }
        }

        if caster_drain != 0 {
            if let Some(c) = board.get_mut(caster) {
                c.health -= caster_drain;
            }
        }
    }

    // Blade indices refer to the pre-cast list the calculator saw; the
    // union across victims is removed once, back to front.
    if let Some(c) = board.get_mut(caster) {
        for index in consumed_blade_indices.into_iter().rev() {
            if index < c.blades.len() {
                c.blades.remove(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::calc::compute_victim_outcome;
    use crate::cards::{HandCard, SpellId};
    use crate::core::{BattleRng, Blade, Combatant, Element, ElementFilter, EntityData, Shield};
    use rustc_hash::FxHashMap;
    use smallvec::smallvec;

    fn entity(element: &str) -> EntityData {
        EntityData {
            name: "T".into(),
            element: Element::from(element),
            max_health: 500,
            critical_rating: 0,
            augments: FxHashMap::default(),
            deck: Vec::new(),
            super_vril_chance: 0.0,
        }
    }

    fn seated(board: &mut Board, slot: u8, element: &str) {
        let mut c = Combatant::new(entity(element), false, &mut BattleRng::new(1));
        c.hand.push_back(HandCard::from(SpellId::from("played")));
        c.hand.push_back(HandCard::from(SpellId::from("kept")));
        c.battle_deck = Some(im::Vector::new());
        board.seat(SlotIndex::new(slot), c);
    }

    fn spell(json: &str) -> SpellDefinition {
        serde_json::from_str(json).unwrap()
    }

    fn struck_fixed(damage: i64) -> CastComputation {
        CastComputation::Struck(vec![VictimOutcome {
            critical: false,
            consumed_blades: smallvec![],
            effects: smallvec![crate::battle::calc::SubEffectOutcome {
                damage,
                augment: None,
                consumed_shields: smallvec![],
            }],
        }])
    }

    #[test]
    fn test_failed_cast_returns_card_to_deck_front() {
        let mut board = Board::new();
        seated(&mut board, 0, "fire");
        let mut aura = None;
        let s = spell(
            r#"{"name": "Bolt", "type": "ATTACK_BASIC", "element": "fire",
                "chance": 0.5, "vrilRequired": 2,
                "damages": [{"element": "fire", "damage": -50}]}"#,
        );

        apply_cast(
            &mut board,
            &mut aura,
            &s,
            SlotIndex::new(0),
            &[SlotIndex::new(4)],
            0,
            &CastComputation::Failed,
        );

        let caster = board.get(SlotIndex::new(0)).unwrap();
        assert_eq!(caster.hand.len(), 1);
        assert_eq!(caster.hand[0].id, SpellId::from("kept"));
        assert_eq!(
            caster.battle_deck.as_ref().unwrap()[0].id,
            SpellId::from("played")
        );
        // No other state changed.
        assert_eq!(caster.vril + caster.super_vril, 1);
    }

    #[test]
    fn test_attack_applies_damage_cost_and_discard() {
        let mut board = Board::new();
        seated(&mut board, 0, "fire");
        seated(&mut board, 4, "ice");
        board.get_mut(SlotIndex::new(0)).unwrap().vril = 3;
        board.get_mut(SlotIndex::new(0)).unwrap().super_vril = 2;
        let mut aura = None;
        let s = spell(
            r#"{"name": "Bolt", "type": "ATTACK_BASIC", "element": "fire",
                "chance": 1.0, "vrilRequired": 5,
                "damages": [{"element": "fire", "damage": -70}]}"#,
        );

        apply_cast(
            &mut board,
            &mut aura,
            &s,
            SlotIndex::new(0),
            &[SlotIndex::new(4)],
            0,
            &struck_fixed(-70),
        );

        assert_eq!(board.get(SlotIndex::new(4)).unwrap().health, 430);
        let caster = board.get(SlotIndex::new(0)).unwrap();
        assert_eq!((caster.vril, caster.super_vril), (2, 0));
        assert_eq!(caster.hand.len(), 1);
        assert_eq!(caster.hand[0].id, SpellId::from("kept"));
    }

    #[test]
    fn test_heal_first_victim_only() {
        let mut board = Board::new();
        seated(&mut board, 0, "life");
        seated(&mut board, 1, "fire");
        board.get_mut(SlotIndex::new(1)).unwrap().health = 100;
        board.get_mut(SlotIndex::new(0)).unwrap().health = 100;
        let mut aura = None;
        let s = spell(
            r#"{"name": "Mend", "type": "HEALING_BASIC", "element": "life",
                "chance": 1.0, "vrilRequired": 1, "heals": [{"heal": 60}],
                "target": "ALLIES"}"#,
        );

        apply_cast(
            &mut board,
            &mut aura,
            &s,
            SlotIndex::new(0),
            &[SlotIndex::new(1), SlotIndex::new(0)],
            0,
            &CastComputation::Struck(vec![]),
        );

        assert_eq!(board.get(SlotIndex::new(1)).unwrap().health, 160);
        assert_eq!(board.get(SlotIndex::new(0)).unwrap().health, 100);
    }

    #[test]
    fn test_heal_clamps_to_max_health() {
        let mut board = Board::new();
        seated(&mut board, 0, "life");
        board.get_mut(SlotIndex::new(0)).unwrap().health = 480;
        let mut aura = None;
        let s = spell(
            r#"{"name": "Mend", "type": "HEALING_BASIC", "element": "life",
                "chance": 1.0, "vrilRequired": 1, "heals": [{"heal": 60}],
                "target": "SELF"}"#,
        );

        apply_cast(
            &mut board,
            &mut aura,
            &s,
            SlotIndex::new(0),
            &[SlotIndex::new(0)],
            0,
            &CastComputation::Struck(vec![]),
        );

        assert_eq!(board.get(SlotIndex::new(0)).unwrap().health, 500);
    }

    #[test]
    fn test_aura_cast_replaces_active_aura() {
        let mut board = Board::new();
        seated(&mut board, 0, "fire");
        let mut aura = Some(Aura::new(vec![crate::core::AuraModifier {
            element: Element::from("ice"),
            value: 2.0,
        }]));
        let s = spell(
            r#"{"name": "Cinder Sky", "type": "AURA", "element": "fire",
                "chance": 1.0, "vrilRequired": 1,
                "aura": [{"element": "fire", "value": 1.25}],
                "target": "SELF"}"#,
        );

        apply_cast(
            &mut board,
            &mut aura,
            &s,
            SlotIndex::new(0),
            &[SlotIndex::new(0)],
            0,
            &CastComputation::Struck(vec![]),
        );

        let aura = aura.unwrap();
        assert_eq!(aura.factor_for(&Element::from("fire")), 1.25);
        assert_eq!(aura.factor_for(&Element::from("ice")), 1.0);
    }

    #[test]
    fn test_consumed_layers_removed_and_granted_layers_appended() {
        let mut board = Board::new();
        seated(&mut board, 0, "fire");
        seated(&mut board, 4, "ice");
        {
            let caster = board.get_mut(SlotIndex::new(0)).unwrap();
            caster.blades.push_back(Blade {
                id: "charm".into(),
                value: 40.0,
                element: ElementFilter::Only(Element::from("fire")),
            });
            let victim = board.get_mut(SlotIndex::new(4)).unwrap();
            victim.shields.push_back(Shield {
                id: "ward".into(),
                value: Some(-50.0),
                element: ElementFilter::All,
                element_to: None,
            });
        }
        let mut aura = None;
        let s = spell(
            r#"{"name": "Bolt", "type": "ATTACK_BASIC", "element": "fire",
                "chance": 1.0, "vrilRequired": 1,
                "damages": [{"element": "fire", "damage": -100}],
                "victimShields": [{"id": "cinder", "value": 25, "element": "fire"}]}"#,
        );

        // Real computation so the consumed refs line up with the lists.
        let computation = {
            let caster = board.get(SlotIndex::new(0)).unwrap();
            let victim = board.get(SlotIndex::new(4)).unwrap();
            CastComputation::Struck(vec![compute_victim_outcome(
                &s,
                None,
                caster,
                victim,
                None,
                &mut BattleRng::new(5),
            )])
        };

        apply_cast(
            &mut board,
            &mut aura,
            &s,
            SlotIndex::new(0),
            &[SlotIndex::new(4)],
            0,
            &computation,
        );

        // -100 * 1.4 blade, then halved by the ward: -70.
        let victim = board.get(SlotIndex::new(4)).unwrap();
        assert_eq!(victim.health, 430);
        assert_eq!(victim.shields.len(), 1);
        assert_eq!(victim.shields[0].id, "cinder");
        assert!(board.get(SlotIndex::new(0)).unwrap().blades.is_empty());
    }

    #[test]
    fn test_steal_drains_into_caster() {
        let mut board = Board::new();
        seated(&mut board, 0, "death");
        seated(&mut board, 4, "ice");
        board.get_mut(SlotIndex::new(0)).unwrap().health = 200;
        let mut aura = None;
        let s = spell(
            r#"{"name": "Drain", "type": "ATTACK_BASIC", "element": "death",
                "chance": 1.0, "vrilRequired": 2,
                "damages": [{"element": "death", "damage": -100, "steal": 0.5}]}"#,
        );

        apply_cast(
            &mut board,
            &mut aura,
            &s,
            SlotIndex::new(0),
            &[SlotIndex::new(4)],
            0,
            &struck_fixed(-100),
        );

        assert_eq!(board.get(SlotIndex::new(4)).unwrap().health, 400);
        // Deducting round(-100 * 0.5) = -50 heals the drainer.
        assert_eq!(board.get(SlotIndex::new(0)).unwrap().health, 250);
    }

    #[test]
    fn test_full_resource_cast_zeroes_both_pools() {
        let mut board = Board::new();
        seated(&mut board, 0, "storm");
        seated(&mut board, 4, "ice");
        board.get_mut(SlotIndex::new(0)).unwrap().vril = 4;
        board.get_mut(SlotIndex::new(0)).unwrap().super_vril = 3;
        let mut aura = None;
        let s = spell(
            r#"{"name": "Burst", "type": "ATTACK_BASIC", "element": "storm",
                "chance": 1.0, "vrilRequired": 0,
                "damages": [{"element": "storm", "damage": -10, "perVril": true}]}"#,
        );

        apply_cast(
            &mut board,
            &mut aura,
            &s,
            SlotIndex::new(0),
            &[SlotIndex::new(4)],
            0,
            &struck_fixed(-100),
        );

        let caster = board.get(SlotIndex::new(0)).unwrap();
        assert_eq!((caster.vril, caster.super_vril), (0, 0));
    }

    #[test]
    fn test_no_death_pruning_mid_cast() {
        let mut board = Board::new();
        seated(&mut board, 0, "fire");
        seated(&mut board, 4, "ice");
        board.get_mut(SlotIndex::new(4)).unwrap().health = 30;
        let mut aura = None;
        let s = spell(
            r#"{"name": "Bolt", "type": "ATTACK_BASIC", "element": "fire",
                "chance": 1.0, "vrilRequired": 1,
                "damages": [{"element": "fire", "damage": -70}]}"#,
        );

        apply_cast(
            &mut board,
            &mut aura,
            &s,
            SlotIndex::new(0),
            &[SlotIndex::new(4)],
            0,
            &struck_fixed(-70),
        );

        // Below zero but still seated until settling.
        assert_eq!(board.get(SlotIndex::new(4)).unwrap().health, -40);
        assert!(board.is_occupied(SlotIndex::new(4)));
    }
}
