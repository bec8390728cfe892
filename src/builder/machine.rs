//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::config::MachineConfig;
use crate::core::{Handler, StateId, Transition};
use crate::machine::Machine;

/// Builder for constructing machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use fluxstate::builder::MachineBuilder;
/// use fluxstate::{Handler, MachineConfig, StateId, Transition};
///
/// #[derive(Default)]
/// struct Device {
///     power: u32,
///     errors: u32,
/// }
///
/// let mut device = Device { power: 95, ..Device::default() };
/// let mut machine = MachineBuilder::new()
///     .initial(0)
///     .config(MachineConfig::bounded())
///     .transition(Transition::new(0, 0, 1).when(|d: &Device| d.power >= 90))
///     .transition(Transition::new(1, 2, 2))
///     .handler(2, Handler::new(|d: &mut Device, _| d.errors += 1))
///     .build(&mut device)
///     .unwrap();
///
/// machine.process_event(0).unwrap();
/// machine.process_event(2).unwrap();
/// assert_eq!(machine.current_state(), StateId::new(2));
/// assert_eq!(machine.context().errors, 1);
/// ```
pub struct MachineBuilder<C> {
    initial: Option<StateId>,
    config: MachineConfig,
    transitions: Vec<Transition<C>>,
    handlers: Vec<(StateId, Handler<C>)>,
}

impl<C> MachineBuilder<C> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            config: MachineConfig::default(),
            transitions: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: impl Into<StateId>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Replace the default configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a transition. Registration order is preserved.
    pub fn transition(mut self, transition: Transition<C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: impl IntoIterator<Item = Transition<C>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Set the entry handler for `state`. A later call for the same state
    /// replaces the earlier one.
    pub fn handler(mut self, state: impl Into<StateId>, handler: Handler<C>) -> Self {
        self.handlers.push((state.into(), handler));
        self
    }

    /// Build the machine bound to `context`.
    pub fn build(self, context: &mut C) -> Result<Machine<'_, C>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let mut machine = Machine::with_config(initial, context, self.config)?;
        for transition in self.transitions {
            machine.add_transition(transition)?;
        }
        for (state, handler) in self.handlers {
            machine.set_handler(state, handler)?;
        }

        Ok(machine)
    }
}

impl<C> Default for MachineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
