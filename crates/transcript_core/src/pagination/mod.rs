//! Convergence state machine for loading a conversation's full history.
//!
//! The machine is pure: a driver feeds it observations of the viewport as
//! [`PaginationMsg`]s and carries out the returned [`PaginationEffect`]s.
mod effect;
mod msg;
mod state;
mod update;

pub use effect::{PaginationEffect, PaginationOutcome};
pub use msg::PaginationMsg;
pub use state::{PaginationPhase, PaginationSettings, PaginationState, TerminalReason};
pub use update::advance;
