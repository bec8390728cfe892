//! Engine error types.

use crate::core::{CallbackError, EventId, StateId};
use std::fmt;
use thiserror::Error;

/// Dispatch stage at which a callback failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchStep {
    /// Evaluating a candidate's guard; nothing has changed yet.
    Guard,
    /// Running the selected transition's action; the state is unchanged.
    Action,
    /// Running the entry handler; the state change is already committed.
    Handler,
}

impl fmt::Display for DispatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Guard => "guard",
            Self::Action => "action",
            Self::Handler => "handler",
        })
    }
}

/// Errors returned by machine and registry operations.
#[derive(Debug, Error)]
pub enum FsmError {
    #[error("Machine handle is destroyed or unknown")]
    InvalidHandle,

    #[error("State {state} is outside the configured range")]
    InvalidState { state: StateId },

    #[error("Event {event} is outside the configured range")]
    InvalidEvent { event: EventId },

    #[error("Cannot register more than {limit} {what}")]
    CapacityExceeded { what: &'static str, limit: usize },

    #[error("Guard of transition {from} --{event}--> {to} failed: {source}")]
    GuardFailed {
        from: StateId,
        event: EventId,
        to: StateId,
        #[source]
        source: CallbackError,
    },

    #[error("Action of transition {from} --{event}--> {to} failed: {source}")]
    ActionFailed {
        from: StateId,
        event: EventId,
        to: StateId,
        #[source]
        source: CallbackError,
    },

    #[error("Entry handler of state {to} (from {from} on {event}) failed: {source}")]
    HandlerFailed {
        from: StateId,
        event: EventId,
        to: StateId,
        #[source]
        source: CallbackError,
    },
}

impl FsmError {
    /// The dispatch step a callback failure happened at, if this is one.
    pub fn dispatch_step(&self) -> Option<DispatchStep> {
        match self {
            Self::GuardFailed { .. } => Some(DispatchStep::Guard),
            Self::ActionFailed { .. } => Some(DispatchStep::Action),
            Self::HandlerFailed { .. } => Some(DispatchStep::Handler),
            _ => None,
        }
    }

    /// Whether the machine's state changed before the error was raised.
    pub fn state_committed(&self) -> bool {
        matches!(self, Self::HandlerFailed { .. })
    }
}

pub type Result<T, E = FsmError> = std::result::Result<T, E>;
