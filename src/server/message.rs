//! The JSON wire protocol.
//!
//! Every client request is a single JSON object tagged by `action`;
//! every server push is an object tagged by `event`. Field names are
//! camelCase, tags are SCREAMING_SNAKE_CASE.
//!
//! ## Example
//!
//! ```json
//! { "action": "SELECT_CARD", "code": "AB12", "choice": 3 }
//! { "action": "SELECT_CARD", "code": "AB12", "choice": "PASS" }
//! ```

use serde::{Deserialize, Serialize};

use crate::cards::{HandCard, SpellId};
use crate::core::{EntityData, Side, SlotIndex};
use crate::session::{
    CardChoice, CastRecord, ConnectionId, SessionCode, SessionSnapshot, VictimSet,
};

/// A request from a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientAction {
    /// Open a new session and take its first slot as host.
    #[serde(rename_all = "camelCase")]
    CreateSession {
        /// The creator's combatant.
        entity: EntityData,
    },

    /// Join an existing session by code.
    #[serde(rename_all = "camelCase")]
    JoinSession {
        /// Join code.
        code: SessionCode,
        /// The joiner's combatant.
        entity: EntityData,
    },

    /// Seat an AI-controlled combatant in the next vacant slot.
    #[serde(rename_all = "camelCase")]
    AddPassiveEntity {
        /// Join code.
        code: SessionCode,
        /// The passive combatant.
        entity: EntityData,
    },

    /// Move a combatant to a vacant slot (lobby only).
    #[serde(rename_all = "camelCase")]
    MoveEntity {
        /// Join code.
        code: SessionCode,
        /// Source slot.
        from_slot: SlotIndex,
        /// Destination slot; must be vacant.
        to_slot: SlotIndex,
    },

    /// Submit a battle deck and mark ready. The battle starts when the
    /// last participant readies up.
    #[serde(rename_all = "camelCase")]
    SetReady {
        /// Join code.
        code: SessionCode,
        /// Spell ids to battle with.
        deck: Vec<SpellId>,
    },

    /// Withdraw readiness.
    #[serde(rename_all = "camelCase")]
    ClearReady {
        /// Join code.
        code: SessionCode,
    },

    /// Choose a card (or pass) for the current round.
    #[serde(rename_all = "camelCase")]
    SelectCard {
        /// Join code.
        code: SessionCode,
        /// Hand index or pass.
        choice: CardChoice,
    },

    /// Choose victim slots for the current round.
    #[serde(rename_all = "camelCase")]
    SelectVictims {
        /// Join code.
        code: SessionCode,
        /// Victim slots in strike order.
        victims: VictimSet,
    },

    /// Report a client-side hand reorder.
    #[serde(rename_all = "camelCase")]
    SetHand {
        /// Join code.
        code: SessionCode,
        /// The full reordered hand.
        hand: Vec<HandCard>,
    },
}

/// One participant's lobby status, as shown to every member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// The seat this participant controls.
    pub seat: SlotIndex,
    /// Readiness flag.
    pub ready: bool,
    /// Session host.
    pub host: bool,
}

/// A push from the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    /// Greeting sent once per connection.
    #[serde(rename_all = "camelCase")]
    Connected {
        /// Human-readable greeting.
        message: String,
    },

    /// Full observable session state, personalized with the recipient's
    /// own seat.
    #[serde(rename_all = "camelCase")]
    StateUpdate {
        /// Join code.
        code: SessionCode,
        /// Observable state.
        snapshot: SessionSnapshot,
        /// The recipient's seat.
        seat: SlotIndex,
        /// All participants' lobby status.
        roster: Vec<RosterEntry>,
    },

    /// All participants readied; decks are dealt.
    BattleStarted,

    /// A round resolved: the per-cast animation trace and the settled
    /// state that follows it.
    #[serde(rename_all = "camelCase")]
    RoundTrace {
        /// Casts in resolution order, each with its pre-cast snapshot.
        trace: Vec<CastRecord>,
        /// State after settling.
        snapshot: SessionSnapshot,
    },

    /// One side was wiped out.
    #[serde(rename_all = "camelCase")]
    Win {
        /// The winning side.
        side: Side,
        /// The winning side's battle-start roster.
        entities: Vec<EntityData>,
    },

    /// An action was rejected.
    #[serde(rename_all = "camelCase")]
    Failure {
        /// Why.
        message: String,
    },

    /// A join attempt was rejected.
    #[serde(rename_all = "camelCase")]
    JoinFailure {
        /// Why.
        message: String,
    },
}

/// An event addressed to one connection; the transport delivers these.
#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    /// Recipient.
    pub to: ConnectionId,
    /// Payload.
    pub event: ServerEvent,
}
