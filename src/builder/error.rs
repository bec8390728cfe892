//! Build errors for the machine builder.

use crate::error::FsmError;
use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Machine rejected its definition: {0}")]
    Rejected(#[from] FsmError),
}
