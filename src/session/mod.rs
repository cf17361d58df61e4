//! Game sessions: lobby and battle lifecycle, AI selection policy.

pub mod machine;
pub mod policy;
pub mod state;

pub use machine::{CastRecord, DisconnectOutcome, RoundReport, SessionError, WinReport};
pub use state::{
    CardChoice, ConnectionId, Participant, Session, SessionCode, SessionPhase, SessionSnapshot,
    VictimSet,
};
