//! Result of feeding one event to a machine.

use crate::core::{EventId, StateId};
use serde::{Deserialize, Serialize};

/// What [`crate::Machine::process_event`] did with an event.
///
/// Only `Transitioned` changes the state. `NoMatch` and `GuardRejected` are
/// normal outcomes, not failures: they let the caller tell "no rule applies
/// here" apart from "a rule applies but its guard said no".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A transition was taken and its handler (if any) completed
    Transitioned {
        from: StateId,
        event: EventId,
        to: StateId,
    },

    /// No transition is registered for the event in the current state
    NoMatch { state: StateId, event: EventId },

    /// Every candidate transition's guard evaluated to false
    GuardRejected {
        state: StateId,
        event: EventId,
        candidates: usize,
    },
}

impl Outcome {
    pub fn is_transitioned(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }

    /// The machine's state after the event.
    pub fn state(&self) -> StateId {
        match self {
            Self::Transitioned { to, .. } => *to,
            Self::NoMatch { state, .. } | Self::GuardRejected { state, .. } => *state,
        }
    }

    pub fn event(&self) -> EventId {
        match self {
            Self::Transitioned { event, .. }
            | Self::NoMatch { event, .. }
            | Self::GuardRejected { event, .. } => *event,
        }
    }
}
