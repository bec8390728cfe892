//! State and event identifiers.
//!
//! States and events are plain integers with caller-defined meaning. The
//! engine only ever compares them for equality, so both are thin `Copy`
//! newtypes rather than owned entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a machine state.
///
/// # Example
///
/// ```rust
/// use fluxstate::StateId;
///
/// let idle = StateId::new(0);
/// assert_eq!(idle, StateId::from(0));
/// assert_eq!(StateId::new(-1).to_string(), "-1");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub i32);

impl StateId {
    pub const fn new(raw: i32) -> Self {
        StateId(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for StateId {
    fn from(raw: i32) -> Self {
        StateId(raw)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source side of a transition.
///
/// `Any` lives outside the integer space, so every `i32` stays an ordinary
/// state compared by equality.
///
/// ```rust
/// use fluxstate::{Source, StateId};
///
/// assert!(Source::Any.admits(StateId::new(-1)));
/// assert!(Source::from(-1).admits(StateId::new(-1)));
/// assert!(!Source::from(-1).admits(StateId::new(3)));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Matches only this state
    State(StateId),
    /// Matches whatever the current state is
    Any,
}

impl Source {
    /// Whether a machine in `state` can leave through this source.
    pub fn admits(self, state: StateId) -> bool {
        match self {
            Source::State(from) => from == state,
            Source::Any => true,
        }
    }

    /// The concrete state, if this is not the wildcard.
    pub fn state(self) -> Option<StateId> {
        match self {
            Source::State(state) => Some(state),
            Source::Any => None,
        }
    }

    pub fn is_any(self) -> bool {
        matches!(self, Source::Any)
    }
}

impl From<StateId> for Source {
    fn from(state: StateId) -> Self {
        Source::State(state)
    }
}

impl From<i32> for Source {
    fn from(raw: i32) -> Self {
        Source::State(StateId(raw))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::State(state) => write!(f, "{}", state),
            Source::Any => f.write_str("*"),
        }
    }
}

/// Identifier of an event fed to [`crate::Machine::process_event`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i32);

impl EventId {
    pub const fn new(raw: i32) -> Self {
        EventId(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for EventId {
    fn from(raw: i32) -> Self {
        EventId(raw)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
