//! Machine limits and identifier range policy.
//!
//! The default policy is open: any `i32` is a valid state or event, and the
//! tables grow without a cap. [`MachineConfig::bounded`] reproduces the fixed
//! limits of embedded builds.

use crate::core::{EventId, Source, StateId, DEFAULT_HISTORY_LIMIT};
use crate::error::{FsmError, Result};
use serde::{Deserialize, Serialize};

/// Half-open identifier range `start..end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub start: i32,
    pub end: i32,
}

impl IdRange {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, raw: i32) -> bool {
        (self.start..self.end).contains(&raw)
    }
}

/// Limits applied when a machine is created and populated.
///
/// # Example
///
/// ```rust
/// use fluxstate::{IdRange, MachineConfig};
///
/// let config = MachineConfig::from_json(
///     r#"{ "states": { "start": 0, "end": 8 }, "max_transitions": 16 }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.states, Some(IdRange::new(0, 8)));
/// assert_eq!(config.max_transitions, Some(16));
/// assert_eq!(config.events, None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Valid state identifiers; `None` accepts every value.
    pub states: Option<IdRange>,
    /// Valid event identifiers; `None` accepts every value.
    pub events: Option<IdRange>,
    /// Maximum number of transition records.
    pub max_transitions: Option<usize>,
    /// Maximum number of states with an entry handler.
    pub max_handlers: Option<usize>,
    /// Transition records kept in history; `None` keeps all of them.
    pub history_limit: Option<usize>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            states: None,
            events: None,
            max_transitions: None,
            max_handlers: None,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}

impl MachineConfig {
    pub const BOUNDED_MAX_STATES: i32 = 32;
    pub const BOUNDED_MAX_TRANSITIONS: usize = 64;
    pub const BOUNDED_MAX_HANDLERS: usize = 16;

    /// Closed policy: states `0..32`, 64 transitions, 16 handlers.
    pub fn bounded() -> Self {
        Self {
            states: Some(IdRange::new(0, Self::BOUNDED_MAX_STATES)),
            max_transitions: Some(Self::BOUNDED_MAX_TRANSITIONS),
            max_handlers: Some(Self::BOUNDED_MAX_HANDLERS),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn states(mut self, range: IdRange) -> Self {
        self.states = Some(range);
        self
    }

    pub fn events(mut self, range: IdRange) -> Self {
        self.events = Some(range);
        self
    }

    pub fn max_transitions(mut self, limit: usize) -> Self {
        self.max_transitions = Some(limit);
        self
    }

    pub fn max_handlers(mut self, limit: usize) -> Self {
        self.max_handlers = Some(limit);
        self
    }

    pub fn history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    /// Reject a state outside the configured range.
    pub fn check_state(&self, state: StateId) -> Result<()> {
        match self.states {
            Some(range) if !range.contains(state.raw()) => Err(FsmError::InvalidState { state }),
            _ => Ok(()),
        }
    }

    /// Like [`check_state`](Self::check_state), but lets the wildcard through.
    pub fn check_source(&self, source: Source) -> Result<()> {
        match source.state() {
            Some(state) => self.check_state(state),
            None => Ok(()),
        }
    }

    /// Reject an event outside the configured range.
    pub fn check_event(&self, event: EventId) -> Result<()> {
        match self.events {
            Some(range) if !range.contains(event.raw()) => Err(FsmError::InvalidEvent { event }),
            _ => Ok(()),
        }
    }
}
