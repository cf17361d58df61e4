//! Selection policy for passive (AI-controlled) seats.
//!
//! Deliberately simple: the policy filters the hand down to playable
//! cards, occasionally passes outright, and otherwise picks uniformly.
//! All randomness flows through the session's own RNG stream so replays
//! of a seeded session reproduce the same AI play.

use smallvec::smallvec;

use super::state::{CardChoice, VictimSet};
use crate::battle::Board;
use crate::cards::{SpellCatalog, SpellKind};
use crate::core::{BattleRng, SlotIndex};

/// Chance that an AI seat sits a round out even with playable cards.
const PASS_CHANCE: f64 = 0.1;

/// Choose a card and victim set for the AI combatant in `caster`.
///
/// A card is playable when its spell is known and affordable and at
/// least one living combatant is a legal victim for it. With no playable
/// cards the AI passes.
pub fn choose_selection(
    board: &Board,
    caster: SlotIndex,
    catalog: &SpellCatalog,
    rng: &mut BattleRng,
) -> (CardChoice, VictimSet) {
    let Some(combatant) = board.get(caster) else {
        return (CardChoice::Pass, VictimSet::new());
    };

    let mut playable: Vec<(usize, SpellKind, Vec<SlotIndex>)> = Vec::new();
    for (index, card) in combatant.hand.iter().enumerate() {
        let Some(spell) = catalog.get(&card.id) else {
            continue;
        };
        if !combatant.can_afford(spell.vril_required, &spell.element) {
            continue;
        }
        let victims: Vec<SlotIndex> = board
            .occupied()
            .filter(|(slot, c)| spell.target.allows(caster, *slot) && c.is_alive())
            .map(|(slot, _)| slot)
            .collect();
        if !victims.is_empty() {
            playable.push((index, spell.kind, victims));
        }
    }

    if playable.is_empty() || rng.gen_bool(PASS_CHANCE) {
        return (CardChoice::Pass, VictimSet::new());
    }

    let pick = rng.gen_range_usize(0..playable.len());
    let (index, kind, victims) = &playable[pick];
    let victims: VictimSet = match kind {
        // Sweep spells strike every legal victim.
        SpellKind::AttackAll => victims.iter().copied().collect(),
        _ => {
            let v = victims[rng.gen_range_usize(0..victims.len())];
            smallvec![v]
        }
    };
    (CardChoice::Card(*index), victims)
}
