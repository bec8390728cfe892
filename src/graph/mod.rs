//! Graph views of a machine: rendering for inspection and structural
//! validation of the transition table.

pub mod render;
pub mod validate;

pub use render::{
    export, render, EdgeSnapshot, GraphFormat, GraphSnapshot, RenderError, RenderOptions,
};
pub use validate::{validate, GraphViolation};
