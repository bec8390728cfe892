//! Per-state entry handlers.

use super::callback::Handler;
use super::id::StateId;
use std::collections::HashMap;

/// At most one entry handler per state.
#[derive(Debug)]
pub struct HandlerRegistry<C> {
    handlers: HashMap<StateId, Handler<C>>,
}

impl<C> Default for HandlerRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> HandlerRegistry<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Install the handler for `state`, returning the one it replaces.
    pub fn set(&mut self, state: StateId, handler: Handler<C>) -> Option<Handler<C>> {
        self.handlers.insert(state, handler)
    }

    pub fn get(&self, state: StateId) -> Option<&Handler<C>> {
        self.handlers.get(&state)
    }

    pub fn remove(&mut self, state: StateId) -> Option<Handler<C>> {
        self.handlers.remove(&state)
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.handlers.contains_key(&state)
    }

    /// States with a handler, in ascending order.
    pub fn states(&self) -> Vec<StateId> {
        let mut states: Vec<_> = self.handlers.keys().copied().collect();
        states.sort();
        states
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventId, Step};

    fn entering(state: i32) -> Step {
        Step {
            from: StateId(0),
            event: EventId(1),
            to: StateId(state),
            current: StateId(state),
        }
    }

    #[test]
    fn set_replaces_previous_handler() {
        let mut registry: HandlerRegistry<Vec<&'static str>> = HandlerRegistry::new();

        assert!(registry
            .set(StateId(2), Handler::new(|log: &mut Vec<&'static str>, _| log.push("first")))
            .is_none());
        assert!(registry
            .set(StateId(2), Handler::new(|log: &mut Vec<&'static str>, _| log.push("second")))
            .is_some());
        assert_eq!(registry.len(), 1);

        let mut log = Vec::new();
        registry
            .get(StateId(2))
            .unwrap()
            .run(&mut log, &entering(2))
            .unwrap();

        assert_eq!(log, vec!["second"]);
    }

    #[test]
    fn states_are_sorted() {
        let mut registry: HandlerRegistry<()> = HandlerRegistry::new();
        registry.set(StateId(5), Handler::new(|_, _| {}));
        registry.set(StateId(1), Handler::new(|_, _| {}));
        registry.set(StateId(3), Handler::new(|_, _| {}));

        assert_eq!(registry.states(), vec![StateId(1), StateId(3), StateId(5)]);
    }

    #[test]
    fn remove_and_contains() {
        let mut registry: HandlerRegistry<()> = HandlerRegistry::new();
        registry.set(StateId(4), Handler::new(|_, _| {}));

        assert!(registry.contains(StateId(4)));
        assert!(registry.remove(StateId(4)).is_some());
        assert!(!registry.contains(StateId(4)));
        assert!(registry.is_empty());
    }
}
