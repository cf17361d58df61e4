//! Errors surfaced to clients as failure events.

use thiserror::Error;

use crate::session::{SessionCode, SessionError};

/// Why a client action was rejected by the router.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// No session exists under the given code.
    #[error("No session with code {0}")]
    UnknownSession(SessionCode),

    /// The connection is not a member of the addressed session.
    #[error("Not a member of session {0}")]
    NotAMember(SessionCode),

    /// The session rejected the action.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The request could not be parsed.
    #[error("Malformed request: {0}")]
    Malformed(String),
}
