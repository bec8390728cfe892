//! Data model of the engine.
//!
//! This module holds the passive pieces a [`crate::Machine`] is built from:
//! - State and event identifiers
//! - Guard, action, and handler callbacks
//! - The ordered transition table and the per-state handler registry
//! - Bounded history of committed transitions
//!
//! None of these types dispatch events on their own.

mod callback;
mod handlers;
mod history;
mod id;
mod transition;

pub use callback::{Action, CallbackError, Guard, Handler, Step};
pub use handlers::HandlerRegistry;
pub use history::{TransitionHistory, TransitionRecord, DEFAULT_HISTORY_LIMIT};
pub use id::{EventId, Source, StateId};
pub use transition::{Transition, TransitionTable};
