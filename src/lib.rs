//! # vril-arena
//!
//! Authoritative server engine for an 8-slot turn-based card battle.
//!
//! ## Design Principles
//!
//! 1. **Server-Authoritative**: Clients submit intents (join, ready,
//!    card and victim selections); all resolution happens here and
//!    clients receive state snapshots and animation traces.
//!
//! 2. **Live-State Rounds**: A round resolves all 8 slots in ascending
//!    order against the continuously mutated board. Later casts see the
//!    damage, deaths and aura changes left by earlier ones.
//!
//! 3. **Deterministic Replay**: Every random draw flows through a seeded
//!    per-session RNG stream, so a session replays identically from its
//!    seed and input sequence.
//!
//! ## Architecture
//!
//! - **Persistent Collections**: Hands, decks and modifier stacks use
//!   `im` vectors for cheap pre-cast snapshots in the animation trace.
//!
//! - **Transport-Agnostic Router**: The router consumes parsed actions
//!   and returns batches of addressed events; any socket layer can
//!   deliver them.
//!
//! ## Modules
//!
//! - `core`: Elements, slots, entities, combatants, modifiers, RNG
//! - `cards`: Spell definitions, the catalog, hand cards
//! - `battle`: The board, the damage calculator, cast application
//! - `session`: Lobby and battle lifecycle, AI selection policy
//! - `server`: Wire protocol, session registry, action routing

pub mod battle;
pub mod cards;
pub mod core;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Aura, AuraModifier, BattleRng, Blade, Combatant, Element, ElementFilter, EntityData, Shield,
    Side, SlotIndex, HAND_SIZE, SIDE_SIZE, SLOT_COUNT,
};

pub use crate::cards::{
    Enchantments, HandCard, SpellCatalog, SpellDefinition, SpellId, SpellKind, TargetRule,
};

pub use crate::battle::{
    apply_cast, compute_victim_outcome, critical_chance, Board, CastComputation, VictimOutcome,
};

pub use crate::session::{
    CardChoice, CastRecord, ConnectionId, RoundReport, Session, SessionCode, SessionError,
    SessionPhase, SessionSnapshot, VictimSet, WinReport,
};

pub use crate::server::{ClientAction, Outbound, Router, ServerEvent, SessionRegistry};
