//! Handle-based call interface.
//!
//! Adapter layers that cannot hold a [`Machine`] directly address machines
//! through opaque [`Handle`]s instead. Every operation validates the handle
//! first: a destroyed or unknown handle yields [`FsmError::InvalidHandle`],
//! permanently, and never touches another machine.

use crate::config::MachineConfig;
use crate::core::{EventId, Handler, StateId, Transition};
use crate::error::{FsmError, Result};
use crate::machine::{Machine, Outcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Opaque reference to a machine owned by a [`Registry`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(Uuid);

impl Handle {
    fn generate() -> Self {
        Handle(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner of machines addressed by handle.
///
/// # Example
///
/// ```rust
/// use fluxstate::{FsmError, Registry, Transition, StateId};
///
/// let mut counter = 0u32;
/// let mut registry = Registry::new();
///
/// let handle = registry.create(1, &mut counter).unwrap();
/// registry
///     .add_transition(handle, Transition::new(1, 100, 2).then(|n: &mut u32| *n += 1))
///     .unwrap();
/// registry.process_event(handle, 100).unwrap();
/// assert_eq!(registry.state(handle).unwrap(), StateId::new(2));
///
/// registry.destroy(handle).unwrap();
/// assert!(matches!(registry.destroy(handle), Err(FsmError::InvalidHandle)));
/// ```
pub struct Registry<'ctx, C> {
    machines: HashMap<Handle, Machine<'ctx, C>>,
    config: MachineConfig,
}

impl<'ctx, C> Default for Registry<'ctx, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ctx, C> Registry<'ctx, C> {
    /// Create a registry whose machines use the default policy.
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    /// Create a registry whose machines all use `config`.
    pub fn with_config(config: MachineConfig) -> Self {
        Self {
            machines: HashMap::new(),
            config,
        }
    }

    /// Create a machine in `initial` bound to `context`.
    pub fn create(&mut self, initial: impl Into<StateId>, context: &'ctx mut C) -> Result<Handle> {
        let machine = Machine::with_config(initial, context, self.config.clone())?;
        let handle = Handle::generate();
        debug!(handle = %handle, initial = %machine.initial_state(), "Machine created");
        self.machines.insert(handle, machine);
        Ok(handle)
    }

    /// Destroy the machine behind `handle`.
    ///
    /// Destroying the same handle twice fails with `InvalidHandle`.
    pub fn destroy(&mut self, handle: Handle) -> Result<()> {
        match self.machines.remove(&handle) {
            Some(machine) => {
                machine.destroy();
                debug!(handle = %handle, "Machine destroyed");
                Ok(())
            }
            None => {
                warn!(handle = %handle, "Destroy on invalid handle");
                Err(FsmError::InvalidHandle)
            }
        }
    }

    pub fn add_transition(&mut self, handle: Handle, transition: Transition<C>) -> Result<usize> {
        self.machine_mut(handle)?.add_transition(transition)
    }

    pub fn set_handler(
        &mut self,
        handle: Handle,
        state: impl Into<StateId>,
        handler: Handler<C>,
    ) -> Result<()> {
        self.machine_mut(handle)?.set_handler(state, handler)?;
        Ok(())
    }

    pub fn process_event(&mut self, handle: Handle, event: impl Into<EventId>) -> Result<Outcome> {
        self.machine_mut(handle)?.process_event(event)
    }

    pub fn state(&self, handle: Handle) -> Result<StateId> {
        Ok(self.machine(handle)?.current_state())
    }

    pub fn machine(&self, handle: Handle) -> Result<&Machine<'ctx, C>> {
        self.machines.get(&handle).ok_or(FsmError::InvalidHandle)
    }

    pub fn machine_mut(&mut self, handle: Handle) -> Result<&mut Machine<'ctx, C>> {
        self.machines.get_mut(&handle).ok_or(FsmError::InvalidHandle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.machines.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}
