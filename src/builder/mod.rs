//! Fluent construction of machines.
//!
//! [`MachineBuilder`] collects the initial state, configuration, transitions
//! and handlers, then registers them in order against a context. Every
//! registration goes through the same checks as the direct
//! [`Machine`](crate::Machine) API.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::MachineBuilder;
