//! FluxState: a small, embeddable finite state machine engine
//!
//! States and events are plain integer ids. A machine holds an ordered
//! transition table and per-state entry handlers, and borrows a
//! caller-owned context that every guard, action, and handler operates
//! on. The machine only moves when the caller feeds it an event.
//!
//! # Core Concepts
//!
//! - **Transitions**: `(from, event) -> to` rules with an optional guard
//!   and action. [`Transition::from_any`] builds a rule that leaves every
//!   state.
//! - **Dispatch**: the first registered transition whose guard passes
//!   wins. Its action runs, the state is committed, then the target's
//!   handler runs.
//! - **Registry**: a handle-based surface for adapter layers, where a
//!   destroyed handle is rejected instead of reused.
//! - **Graph**: DOT/JSON rendering and structural validation.
//!
//! # Example
//!
//! ```rust
//! use fluxstate::{Handler, Machine, StateId, Transition};
//!
//! #[derive(Default)]
//! struct Ctx {
//!     counter: u32,
//!     log: Vec<String>,
//! }
//!
//! let mut ctx = Ctx::default();
//! let mut machine = Machine::new(1, &mut ctx);
//! machine
//!     .add_transition(Transition::new(1, 100, 2).then(|c: &mut Ctx| c.counter += 1))
//!     .unwrap();
//! machine
//!     .set_handler(2, Handler::new(|c: &mut Ctx, _| c.log.push("entered-2".into())))
//!     .unwrap();
//!
//! machine.process_event(100).unwrap();
//! assert_eq!(machine.current_state(), StateId::new(2));
//!
//! machine.destroy();
//! assert_eq!(ctx.counter, 1);
//! assert_eq!(ctx.log, vec!["entered-2".to_string()]);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod error;
pub mod graph;
pub mod machine;
pub mod metrics;
pub mod registry;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use config::{IdRange, MachineConfig};
pub use core::{
    Action, CallbackError, EventId, Guard, Handler, HandlerRegistry, Source, StateId, Step,
    Transition, TransitionHistory, TransitionRecord, TransitionTable,
};
pub use error::{DispatchStep, FsmError, Result};
pub use graph::{export, render, validate, GraphViolation, RenderError, RenderOptions};
pub use machine::{Machine, Outcome};
pub use metrics::DispatchStats;
pub use registry::{Handle, Registry};
