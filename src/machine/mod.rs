//! The FSM instance and its dispatch algorithm.
//!
//! A [`Machine`] owns its transition table and handler registry and borrows
//! the caller's context for its whole lifetime. It only moves when the
//! caller feeds it an event through [`Machine::process_event`]. There is no
//! queue and no background work.
//!
//! # Concurrency
//!
//! The engine takes no locks. Every mutating operation needs `&mut self`,
//! so a machine shared between threads must be wrapped in a `Mutex` (or
//! similar) by the caller. The borrow checker rejects unsynchronized
//! sharing at compile time.

mod dispatch;
mod outcome;

pub use outcome::Outcome;

use crate::config::MachineConfig;
use crate::core::{
    EventId, Handler, HandlerRegistry, StateId, Transition, TransitionHistory, TransitionTable,
};
use crate::error::{FsmError, Result};
use crate::metrics::DispatchStats;
use std::fmt;
use tracing::warn;

/// A finite state machine bound to a caller-owned context.
///
/// # Example
///
/// ```rust
/// use fluxstate::{Machine, Outcome, Transition, Handler, StateId};
///
/// #[derive(Default)]
/// struct Door {
///     opened: u32,
///     log: Vec<String>,
/// }
///
/// const CLOSED: i32 = 0;
/// const OPEN: i32 = 1;
/// const PUSH: i32 = 10;
///
/// let mut door = Door::default();
/// let mut machine = Machine::new(CLOSED, &mut door);
///
/// machine
///     .add_transition(Transition::new(CLOSED, PUSH, OPEN).then(|d: &mut Door| d.opened += 1))
///     .unwrap();
/// machine
///     .set_handler(OPEN, Handler::new(|d: &mut Door, _| d.log.push("open".into())))
///     .unwrap();
///
/// let outcome = machine.process_event(PUSH).unwrap();
/// assert!(outcome.is_transitioned());
/// assert_eq!(machine.current_state(), StateId::new(OPEN));
///
/// // A second push has no rule in state OPEN: nothing happens, no error.
/// assert!(matches!(machine.process_event(PUSH), Ok(Outcome::NoMatch { .. })));
///
/// machine.destroy();
/// assert_eq!(door.opened, 1);
/// assert_eq!(door.log, vec!["open".to_string()]);
/// ```
pub struct Machine<'ctx, C> {
    initial: StateId,
    current: StateId,
    context: &'ctx mut C,
    transitions: TransitionTable<C>,
    handlers: HandlerRegistry<C>,
    config: MachineConfig,
    history: TransitionHistory,
    stats: DispatchStats,
}

impl<'ctx, C> Machine<'ctx, C> {
    /// Create a machine in `initial` with the open default policy.
    ///
    /// No handler runs at creation, even if one is later registered for
    /// the initial state.
    pub fn new(initial: impl Into<StateId>, context: &'ctx mut C) -> Self {
        Self::build(initial.into(), context, MachineConfig::default())
    }

    /// Create a machine under `config`, rejecting an initial state outside
    /// its range.
    pub fn with_config(
        initial: impl Into<StateId>,
        context: &'ctx mut C,
        config: MachineConfig,
    ) -> Result<Self> {
        let initial = initial.into();
        config.check_state(initial)?;
        Ok(Self::build(initial, context, config))
    }

    fn build(initial: StateId, context: &'ctx mut C, config: MachineConfig) -> Self {
        Self {
            initial,
            current: initial,
            context,
            transitions: TransitionTable::new(),
            handlers: HandlerRegistry::new(),
            history: TransitionHistory::with_limit(config.history_limit),
            stats: DispatchStats::new(),
            config,
        }
    }

    /// Append a transition, returning its index in the table.
    ///
    /// Duplicates are accepted; see [`process_event`](Self::process_event)
    /// for how they are ordered.
    pub fn add_transition(&mut self, transition: Transition<C>) -> Result<usize> {
        self.config.check_source(transition.from)?;
        self.config.check_event(transition.event)?;
        self.config.check_state(transition.to)?;

        if let Some(limit) = self.config.max_transitions {
            if self.transitions.len() >= limit {
                warn!(limit, "Transition table is full");
                return Err(FsmError::CapacityExceeded {
                    what: "transitions",
                    limit,
                });
            }
        }

        Ok(self.transitions.push(transition))
    }

    /// Install or replace the entry handler for `state`.
    ///
    /// Returns the replaced handler. Does not fire, even when `state` is
    /// the current state.
    pub fn set_handler(
        &mut self,
        state: impl Into<StateId>,
        handler: Handler<C>,
    ) -> Result<Option<Handler<C>>> {
        let state = state.into();
        self.config.check_state(state)?;

        if let Some(limit) = self.config.max_handlers {
            if !self.handlers.contains(state) && self.handlers.len() >= limit {
                warn!(limit, state = %state, "Handler registry is full");
                return Err(FsmError::CapacityExceeded {
                    what: "handlers",
                    limit,
                });
            }
        }

        Ok(self.handlers.set(state, handler))
    }

    /// Remove the entry handler for `state`.
    pub fn remove_handler(&mut self, state: impl Into<StateId>) -> Option<Handler<C>> {
        self.handlers.remove(state.into())
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn initial_state(&self) -> StateId {
        self.initial
    }

    /// Index of the first transition applicable to `event` in the current
    /// state, without evaluating guards.
    pub fn find_transition(&self, event: impl Into<EventId>) -> Option<usize> {
        self.transitions.first_match(self.current, event.into())
    }

    pub fn has_handler(&self, state: impl Into<StateId>) -> bool {
        self.handlers.contains(state.into())
    }

    /// Return to the initial state. No handler fires and the context is
    /// left untouched; history and statistics are kept.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    pub fn context(&self) -> &C {
        &*self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut *self.context
    }

    pub fn transitions(&self) -> &TransitionTable<C> {
        &self.transitions
    }

    pub fn handlers(&self) -> &HandlerRegistry<C> {
        &self.handlers
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Release the transition table and handler registry.
    ///
    /// Consumes the machine, so it cannot be destroyed twice. The context
    /// is handed back to the caller untouched.
    pub fn destroy(self) {}
}

impl<C> fmt::Debug for Machine<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("initial", &self.initial)
            .field("current", &self.current)
            .field("transitions", &self.transitions.len())
            .field("handlers", &self.handlers.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
