//! Session lifecycle: lobby negotiation, round sequencing and settling.
//!
//! All methods mutate the session in place and return typed reports; the
//! router turns those into broadcast events. Round resolution is strictly
//! ascending by slot index and each cast reads the live mutated state
//! left by the casts before it - later casts in the same round see
//! earlier results, deliberately.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::policy;
use super::state::{
    CardChoice, ConnectionId, Participant, Session, SessionPhase, SessionSnapshot, VictimSet,
};
use crate::battle::{apply_cast, compute_victim_outcome, CastComputation};
use crate::cards::{HandCard, SpellCatalog, SpellId};
use crate::core::{Combatant, EntityData, Side, SlotIndex};

/// Rule violations raised by session operations.
///
/// None of these mutate the session; the offending action is simply
/// rejected and may be resubmitted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session has left the lobby phase.
    #[error("Session is no longer accepting lobby changes")]
    BattleInProgress,

    /// The battle has not started yet.
    #[error("Battle has not started")]
    BattleNotStarted,

    /// All 8 slots are occupied.
    #[error("Session is full")]
    SessionFull,

    /// The requesting connection controls no seat.
    #[error("Connection has no seat in this session")]
    NotSeated,

    /// The target slot already holds a combatant.
    #[error("Slot {0} is already occupied")]
    SlotOccupied(u8),

    /// The source slot holds no combatant.
    #[error("Slot {0} is vacant")]
    SlotVacant(u8),

    /// The selected card references an id missing from the catalog.
    #[error("Unknown spell '{0}'")]
    UnknownSpell(SpellId),

    /// A selection referenced a card or spell that cannot be played.
    #[error("Illegal selection: {0}")]
    IllegalSelection(String),
}

/// One resolved cast in a round's animation trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastRecord {
    /// The slot that cast.
    pub caster: SlotIndex,
    /// Victims after dead/vacant filtering, in selection order.
    pub victims: VictimSet,
    /// The spell played.
    pub spell_id: SpellId,
    /// The calculator's result (or the failed-accuracy sentinel).
    #[serde(flatten)]
    pub computation: CastComputation,
    /// Session state immediately before this cast, for client playback.
    pub before: SessionSnapshot,
}

/// The outcome of resolving one full round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    /// Per-cast records in resolution order.
    pub trace: Vec<CastRecord>,
}

/// A finished game's outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinReport {
    /// The winning side.
    pub side: Side,
    /// The winning side's battle-start roster.
    pub entities: Vec<EntityData>,
}

/// Result of removing a connection from a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// The connection was not a member; nothing changed.
    NotMember,
    /// The last connection left; the session should be discarded.
    SessionEmpty,
    /// Other connections remain.
    StillActive,
}

impl Session {
    /// Seat an entity: a connected participant, or a passive
    /// (AI-controlled) combatant when `connection` is `None`.
    ///
    /// Only legal while the lobby is open; resets everyone's readiness.
    pub fn join(
        &mut self,
        connection: Option<ConnectionId>,
        entity: EntityData,
    ) -> Result<SlotIndex, SessionError> {
        if self.phase != SessionPhase::LobbyOpen {
            return Err(SessionError::BattleInProgress);
        }
        let slot = self.board.first_vacant().ok_or(SessionError::SessionFull)?;
        let combatant = Combatant::new(entity, connection.is_none(), &mut self.rng);
        self.board.seat(slot, combatant);
        if let Some(connection) = connection {
            let host = self.participants.is_empty();
            self.participants.push(Participant {
                connection,
                seat: slot,
                ready: false,
                host,
            });
        }
        self.unready_all();
        Ok(slot)
    }

    /// Move a combatant to a vacant slot, then compact both sides.
    ///
    /// Lobby-only; resets everyone's readiness.
    pub fn move_combatant(&mut self, from: SlotIndex, to: SlotIndex) -> Result<(), SessionError> {
        if self.phase != SessionPhase::LobbyOpen {
            return Err(SessionError::BattleInProgress);
        }
        if self.board.is_occupied(to) {
            return Err(SessionError::SlotOccupied(to.0));
        }
        let combatant = self
            .board
            .vacate(from)
            .ok_or(SessionError::SlotVacant(from.0))?;
        self.board.seat(to, combatant);
        for p in &mut self.participants {
            if p.seat == from {
                p.seat = to;
            }
        }
        self.compact_seats();
        self.unready_all();
        Ok(())
    }

    /// Compact every slot toward its side anchor and reseat participants
    /// accordingly. Relative order within a side never changes.
    pub fn compact_seats(&mut self) {
        for (from, to) in self.board.compact() {
            for p in &mut self.participants {
                if p.seat == from {
                    p.seat = to;
                }
            }
        }
    }

    /// Record a participant's readiness and submitted battle deck.
    ///
    /// When the last participant readies up the battle starts (decks
    /// dealt, hands drawn); returns whether that happened.
    pub fn set_ready(
        &mut self,
        connection: ConnectionId,
        deck: &[SpellId],
    ) -> Result<bool, SessionError> {
        if self.phase != SessionPhase::LobbyOpen {
            return Err(SessionError::BattleInProgress);
        }
        let seat = {
            let p = self.participant_mut(connection)?;
            p.ready = true;
            p.seat
        };
        if let Some(combatant) = self.board.get_mut(seat) {
            combatant.battle_deck = Some(deck.iter().cloned().map(HandCard::from).collect());
        }
        let all_ready = self.participants.iter().all(|p| p.ready);
        if all_ready {
            self.start_battle();
        }
        Ok(all_ready)
    }

    /// Clear a participant's readiness flag.
    pub fn clear_ready(&mut self, connection: ConnectionId) -> Result<(), SessionError> {
        self.participant_mut(connection)?.ready = false;
        Ok(())
    }

    /// Deal and enter the battle: every seat without a submitted deck
    /// gets its entity's default deck, every deck is shuffled
    /// independently, and each hand draws up to 7 cards.
    fn start_battle(&mut self) {
        self.phase = SessionPhase::LobbyLocked;
        self.unready_all();
        self.left_start.clear();
        self.right_start.clear();

        for slot in SlotIndex::all() {
            let Some(combatant) = self.board.get_mut(slot) else {
                continue;
            };
            match slot.side() {
                Side::Left => self.left_start.push(combatant.entity.clone()),
                Side::Right => self.right_start.push(combatant.entity.clone()),
            }

            let deck = combatant.battle_deck.get_or_insert_with(|| {
                combatant
                    .entity
                    .deck
                    .iter()
                    .cloned()
                    .map(HandCard::from)
                    .collect()
            });
            let mut cards: Vec<HandCard> = deck.iter().cloned().collect();
            self.rng.shuffle(&mut cards);
            *deck = cards.into_iter().collect();

            combatant.hand.clear();
            combatant.refill_hand();
        }

        self.phase = SessionPhase::AwaitingSelections;
    }

    /// Record a participant's card choice for the current round.
    ///
    /// Card selections are validated structurally (index in hand, spell
    /// known) and against affordability, so a buggy client cannot commit
    /// an unplayable cast.
    pub fn select_card(
        &mut self,
        connection: ConnectionId,
        choice: CardChoice,
        catalog: &SpellCatalog,
    ) -> Result<(), SessionError> {
        if self.phase != SessionPhase::AwaitingSelections {
            return Err(SessionError::BattleNotStarted);
        }
        let seat = self.participant(connection).ok_or(SessionError::NotSeated)?.seat;
        let combatant = self
            .board
            .get(seat)
            .ok_or(SessionError::SlotVacant(seat.0))?;

        if let CardChoice::Card(index) = choice {
            let card = combatant.hand.get(index).ok_or_else(|| {
                SessionError::IllegalSelection(format!("no card at hand index {index}"))
            })?;
            let spell = catalog
                .get(&card.id)
                .ok_or_else(|| SessionError::UnknownSpell(card.id.clone()))?;
            if !combatant.can_afford(spell.vril_required, &spell.element) {
                return Err(SessionError::IllegalSelection(format!(
                    "cannot afford '{}'",
                    card.id
                )));
            }
        }

        self.selected_cards[seat.index()] = Some(choice);
        Ok(())
    }

    /// Record a participant's victim set for the current round.
    pub fn select_victims(
        &mut self,
        connection: ConnectionId,
        victims: VictimSet,
    ) -> Result<(), SessionError> {
        if self.phase != SessionPhase::AwaitingSelections {
            return Err(SessionError::BattleNotStarted);
        }
        let seat = self.participant(connection).ok_or(SessionError::NotSeated)?.seat;
        self.selected_victims[seat.index()] = victims;
        Ok(())
    }

    /// Replace a participant's hand with a client-reported reorder.
    /// Trusted as submitted.
    pub fn set_hand(
        &mut self,
        connection: ConnectionId,
        hand: Vec<HandCard>,
    ) -> Result<(), SessionError> {
        let seat = self.participant(connection).ok_or(SessionError::NotSeated)?.seat;
        let combatant = self
            .board
            .get_mut(seat)
            .ok_or(SessionError::SlotVacant(seat.0))?;
        combatant.hand = hand.into_iter().collect();
        Ok(())
    }

    /// Whether every occupied slot has committed a selection (a card with
    /// at least one victim, or an explicit pass).
    #[must_use]
    pub fn all_committed(&self) -> bool {
        self.board.occupied().all(|(slot, _)| {
            match self.selected_cards[slot.index()] {
                None => false,
                Some(CardChoice::Pass) => true,
                Some(CardChoice::Card(_)) => !self.selected_victims[slot.index()].is_empty(),
            }
        })
    }

    /// Fill selections for AI-controlled slots, then resolve the round if
    /// every occupied slot has committed. There is no separate "go"
    /// action: the last arriving selection starts the round.
    pub fn try_resolve_round(&mut self, catalog: &SpellCatalog) -> Option<RoundReport> {
        if self.phase != SessionPhase::AwaitingSelections {
            return None;
        }
        self.fill_ai_selections(catalog);
        self.all_committed().then(|| self.resolve_round(catalog))
    }

    fn fill_ai_selections(&mut self, catalog: &SpellCatalog) {
        for slot in SlotIndex::all() {
            let is_ai = self.board.get(slot).is_some_and(|c| c.is_ai);
            if is_ai && self.selected_cards[slot.index()].is_none() {
                let (choice, victims) =
                    policy::choose_selection(&self.board, slot, catalog, &mut self.rng);
                self.selected_cards[slot.index()] = Some(choice);
                self.selected_victims[slot.index()] = victims;
            }
        }
    }

    /// Resolve all 8 slots in ascending order against the live state,
    /// then settle. Call `check_win` afterwards.
    fn resolve_round(&mut self, catalog: &SpellCatalog) -> RoundReport {
        let mut trace = Vec::new();

        for slot in SlotIndex::all() {
            self.phase = SessionPhase::RoundActive { cursor: slot };

            let Some(CardChoice::Card(card_index)) = self.selected_cards[slot.index()] else {
                continue;
            };
            if !self.board.get(slot).is_some_and(Combatant::is_alive) {
                continue;
            }
            // Victims are re-filtered at this cast's turn: a victim
            // killed earlier in the round is dropped here, not at
            // selection time.
            let victims: VictimSet = self.selected_victims[slot.index()]
                .iter()
                .copied()
                .filter(|v| self.board.get(*v).is_some_and(Combatant::is_alive))
                .collect();
            if victims.is_empty() {
                continue;
            }
            let Some(card) = self
                .board
                .get(slot)
                .and_then(|c| c.hand.get(card_index))
                .cloned()
            else {
                continue;
            };
            let Some(spell) = catalog.get(&card.id).cloned() else {
                continue;
            };

            let hit = self.rng.gen_unit() <= spell.chance + card.accuracy_delta();
            let computation = if !hit {
                CastComputation::Failed
            } else if spell.kind.is_attack() {
                let mut outcomes = Vec::with_capacity(victims.len());
                for victim_slot in &victims {
                    let (Some(caster), Some(victim)) =
                        (self.board.get(slot), self.board.get(*victim_slot))
                    else {
                        continue;
                    };
                    outcomes.push(compute_victim_outcome(
                        &spell,
                        card.enchantments.as_ref(),
                        caster,
                        victim,
                        self.aura.as_ref(),
                        &mut self.rng,
                    ));
                }
                CastComputation::Struck(outcomes)
            } else {
                CastComputation::Struck(Vec::new())
            };

            trace.push(CastRecord {
                caster: slot,
                victims: victims.clone(),
                spell_id: card.id.clone(),
                computation: computation.clone(),
                before: self.snapshot(),
            });

            apply_cast(
                &mut self.board,
                &mut self.aura,
                &spell,
                slot,
                &victims,
                card_index,
                &computation,
            );
        }

        self.phase = SessionPhase::RoundSettling;
        self.settle();
        self.phase = SessionPhase::AwaitingSelections;

        RoundReport { trace }
    }

    /// End-of-round bookkeeping: regenerate one resource point for every
    /// living combatant, prune the dead to vacant, refill hands, reset
    /// selections.
    fn settle(&mut self) {
        for slot in SlotIndex::all() {
            let dead = match self.board.get_mut(slot) {
                Some(c) if c.is_alive() => {
                    c.grant_resource_point(&mut self.rng);
                    false
                }
                Some(_) => true,
                None => false,
            };
            if dead {
                self.board.vacate(slot);
            }
        }
        for slot in SlotIndex::all() {
            if let Some(c) = self.board.get_mut(slot) {
                c.refill_hand();
            }
        }
        self.reset_selections();
    }

    /// Transition to `Finished` and report the winner if one side is
    /// fully vacant. Reports at most once; later calls return `None`.
    pub fn check_win(&mut self) -> Option<WinReport> {
        if !self.phase.battle_started() || self.phase == SessionPhase::Finished {
            return None;
        }
        let report = if self.board.side_is_empty(Side::Left) {
            Some(WinReport {
                side: Side::Right,
                entities: self.right_start.clone(),
            })
        } else if self.board.side_is_empty(Side::Right) {
            Some(WinReport {
                side: Side::Left,
                entities: self.left_start.clone(),
            })
        } else {
            None
        };
        if report.is_some() {
            self.phase = SessionPhase::Finished;
        }
        report
    }

    /// Remove a connection: vacate its seat, reassign the host flag,
    /// compact (in the lobby) and report whether the session emptied.
    ///
    /// The caller re-runs `check_win` afterwards when a battle is live.
    pub fn disconnect(&mut self, connection: ConnectionId) -> DisconnectOutcome {
        let Some(position) = self
            .participants
            .iter()
            .position(|p| p.connection == connection)
        else {
            return DisconnectOutcome::NotMember;
        };
        let removed = self.participants.remove(position);
        self.board.vacate(removed.seat);

        if self.participants.is_empty() {
            return DisconnectOutcome::SessionEmpty;
        }
        if removed.host {
            self.participants[0].host = true;
        }
        if self.phase == SessionPhase::LobbyOpen {
            self.compact_seats();
        }
        DisconnectOutcome::StillActive
    }

    fn participant_mut(
        &mut self,
        connection: ConnectionId,
    ) -> Result<&mut Participant, SessionError> {
        self.participants
            .iter_mut()
            .find(|p| p.connection == connection)
            .ok_or(SessionError::NotSeated)
    }
}
