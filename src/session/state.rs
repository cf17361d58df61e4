//! Session aggregate: one game's complete shared state.
//!
//! A session owns the board, the per-slot pending selections, the active
//! aura, the lifecycle phase and the connected participants. Everything a
//! client may observe is exposed through `SessionSnapshot`; the session
//! itself also carries the non-observable per-session RNG.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::battle::Board;
use crate::core::{Aura, BattleRng, EntityData, SlotIndex, SLOT_COUNT};

/// Opaque handle for one client connection, assigned by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

/// A session's 4-character join code (`[A-Z0-9]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCode(pub String);

impl std::fmt::Display for SessionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionCode {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

/// Lifecycle phase of a session.
///
/// `AwaitingSelections` is the between-rounds state in which selections
/// accumulate; `RoundActive`/`RoundSettling` are only observable in
/// pre-cast snapshots since a round resolves synchronously once the last
/// selection arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    /// Accepting joins, seating and readiness changes.
    LobbyOpen,
    /// All participants ready; dealing in progress.
    LobbyLocked,
    /// Battle running, collecting this round's selections.
    AwaitingSelections,
    /// Resolving the slot at `cursor`.
    RoundActive {
        /// The slot currently being resolved.
        cursor: SlotIndex,
    },
    /// End-of-round bookkeeping.
    RoundSettling,
    /// One side is empty; terminal.
    Finished,
}

impl SessionPhase {
    /// Whether the battle has begun (selections, rounds or game over).
    #[must_use]
    pub fn battle_started(self) -> bool {
        !matches!(self, SessionPhase::LobbyOpen | SessionPhase::LobbyLocked)
    }
}

/// A participant's pending card choice for the current round.
///
/// Serializes as the hand index, or the string `"PASS"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardChoice {
    /// Sit the round out.
    Pass,
    /// Play the card at this hand index.
    Card(usize),
}

impl Serialize for CardChoice {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CardChoice::Pass => serializer.serialize_str("PASS"),
            CardChoice::Card(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl<'de> Deserialize<'de> for CardChoice {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl serde::de::Visitor<'_> for Visitor {
            type Value = CardChoice;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a hand index or the string \"PASS\"")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<CardChoice, E> {
                Ok(CardChoice::Card(v as usize))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<CardChoice, E> {
                u64::try_from(v)
                    .map(|v| CardChoice::Card(v as usize))
                    .map_err(|_| E::custom("negative card index"))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<CardChoice, E> {
                if v == "PASS" {
                    Ok(CardChoice::Pass)
                } else {
                    Err(E::custom("expected \"PASS\""))
                }
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// A connected participant and their seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Transport handle.
    pub connection: ConnectionId,
    /// The slot this participant controls.
    pub seat: SlotIndex,
    /// Readiness flag for lobby negotiation.
    pub ready: bool,
    /// The session creator (reassigned on disconnect).
    pub host: bool,
}

/// Chosen victim slots for one caster.
pub type VictimSet = SmallVec<[SlotIndex; 4]>;

/// The client-observable portion of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Lifecycle phase (and the resolution cursor, mid-round).
    #[serde(flatten)]
    pub phase: SessionPhase,
    /// The 8 slots.
    pub board: Board,
    /// Active ambient aura, if any.
    pub aura: Option<Aura>,
    /// Per-slot pending card choices.
    pub selected_cards: [Option<CardChoice>; SLOT_COUNT],
    /// Per-slot pending victim sets.
    pub selected_victims: [VictimSet; SLOT_COUNT],
}

/// One game's complete server-side state.
#[derive(Clone, Debug)]
pub struct Session {
    /// Join code.
    pub code: SessionCode,
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// The 8 slots.
    pub board: Board,
    /// Active ambient aura; replaced wholesale by AURA casts.
    pub aura: Option<Aura>,
    /// Per-slot pending card choices.
    pub selected_cards: [Option<CardChoice>; SLOT_COUNT],
    /// Per-slot pending victim sets.
    pub selected_victims: [VictimSet; SLOT_COUNT],
    /// Connected participants in join order.
    pub participants: Vec<Participant>,
    /// Left-side entities captured at battle start (win reporting).
    pub left_start: Vec<EntityData>,
    /// Right-side entities captured at battle start (win reporting).
    pub right_start: Vec<EntityData>,
    /// Per-session RNG stream.
    pub rng: BattleRng,
}

impl Session {
    /// Create an empty lobby.
    #[must_use]
    pub fn new(code: SessionCode, rng: BattleRng) -> Self {
        Self {
            code,
            phase: SessionPhase::LobbyOpen,
            board: Board::new(),
            aura: None,
            selected_cards: Default::default(),
            selected_victims: Default::default(),
            participants: Vec::new(),
            left_start: Vec::new(),
            right_start: Vec::new(),
            rng,
        }
    }

    /// The participant bound to a connection, if any.
    #[must_use]
    pub fn participant(&self, connection: ConnectionId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.connection == connection)
    }

    /// Whether a connection is a member of this session.
    #[must_use]
    pub fn is_member(&self, connection: ConnectionId) -> bool {
        self.participant(connection).is_some()
    }

    /// Snapshot the observable state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            board: self.board.clone(),
            aura: self.aura.clone(),
            selected_cards: self.selected_cards,
            selected_victims: self.selected_victims.clone(),
        }
    }

    /// Clear every participant's readiness flag.
    pub fn unready_all(&mut self) {
        for p in &mut self.participants {
            p.ready = false;
        }
    }

    /// Clear all pending selections.
    pub fn reset_selections(&mut self) {
        self.selected_cards = Default::default();
        self.selected_victims = Default::default();
    }
}
