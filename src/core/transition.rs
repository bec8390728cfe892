//! Transition records and the ordered table that holds them.

use super::callback::{Action, CallbackError, Guard};
use super::id::{EventId, Source, StateId};

/// A `{from, event, to, guard?, action?}` record.
///
/// # Example
///
/// ```rust
/// use fluxstate::{EventId, StateId, Transition};
///
/// struct Device {
///     power: u32,
/// }
///
/// let power_on: Transition<Device> = Transition::new(0, 0, 1)
///     .when(|d: &Device| d.power >= 90)
///     .then(|d: &mut Device| d.power += 10);
///
/// assert!(power_on.matches(StateId::new(0), EventId::new(0)));
/// assert!(!power_on.matches(StateId::new(1), EventId::new(0)));
/// ```
#[derive(Debug)]
pub struct Transition<C> {
    pub from: Source,
    pub event: EventId,
    pub to: StateId,
    pub guard: Option<Guard<C>>,
    pub action: Option<Action<C>>,
}

impl<C> Transition<C> {
    /// Create an unguarded transition with no action.
    pub fn new(
        from: impl Into<StateId>,
        event: impl Into<EventId>,
        to: impl Into<StateId>,
    ) -> Self {
        Self::with_source(Source::State(from.into()), event, to)
    }

    /// Create a transition that leaves whatever state the machine is in.
    pub fn from_any(event: impl Into<EventId>, to: impl Into<StateId>) -> Self {
        Self::with_source(Source::Any, event, to)
    }

    fn with_source(from: Source, event: impl Into<EventId>, to: impl Into<StateId>) -> Self {
        Self {
            from,
            event: event.into(),
            to: to.into(),
            guard: None,
            action: None,
        }
    }

    /// Attach a guard.
    pub fn guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Attach a guard using a closure.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Attach an action.
    pub fn action(mut self, action: Action<C>) -> Self {
        self.action = Some(action);
        self
    }

    /// Attach an action using a closure.
    pub fn then<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.action = Some(Action::new(action));
        self
    }

    /// Whether this record applies to `event` while the machine is in `state`.
    /// Guards are not consulted.
    pub fn matches(&self, state: StateId, event: EventId) -> bool {
        self.event == event && self.from.admits(state)
    }

    /// Evaluate the guard; an absent guard always permits.
    pub fn permits(&self, ctx: &C) -> Result<bool, CallbackError> {
        match &self.guard {
            Some(guard) => guard.check(ctx),
            None => Ok(true),
        }
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }
}

/// Transitions in registration order.
///
/// Append-only while the machine is being set up; dispatch only reads it.
/// Duplicate `(from, event)` pairs are legal: the scan order decides which
/// one wins.
#[derive(Debug)]
pub struct TransitionTable<C> {
    transitions: Vec<Transition<C>>,
}

impl<C> Default for TransitionTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TransitionTable<C> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Append a record, returning its index.
    pub fn push(&mut self, transition: Transition<C>) -> usize {
        self.transitions.push(transition);
        self.transitions.len() - 1
    }

    /// Records applicable to `(state, event)`, in registration order.
    pub fn candidates(
        &self,
        state: StateId,
        event: EventId,
    ) -> impl Iterator<Item = (usize, &Transition<C>)> + '_ {
        self.transitions
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.matches(state, event))
    }

    /// Index of the first record applicable to `(state, event)`.
    pub fn first_match(&self, state: StateId, event: EventId) -> Option<usize> {
        self.candidates(state, event).map(|(index, _)| index).next()
    }

    pub fn get(&self, index: usize) -> Option<&Transition<C>> {
        self.transitions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition<C>> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
