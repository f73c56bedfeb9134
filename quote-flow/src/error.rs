use thiserror::Error;

use crate::{flow::FlowState, step::StepId};

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Step {0} is not complete")]
    IncompleteStep(StepId),

    #[error("Step {step} is missing parameters: {}", missing.join(", "))]
    MissingParameters { step: StepId, missing: Vec<String> },

    #[error("Malformed query string: {0}")]
    MalformedQuery(String),

    #[error("Flow already finished in state {0}")]
    TerminalState(FlowState),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
