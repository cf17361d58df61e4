//! Transport-facing layer: wire protocol, registry and action routing.

pub mod error;
pub mod message;
pub mod registry;
pub mod router;

pub use error::ActionError;
pub use message::{ClientAction, Outbound, RosterEntry, ServerEvent};
pub use registry::SessionRegistry;
pub use router::Router;
