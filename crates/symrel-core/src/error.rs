//! Core error taxonomy.
//!
//! Every variant surfaces to callers as a one-line message inside a
//! failed [`Outcome`](crate::Outcome); none of them crosses the dispatch
//! boundary as a panic. Threshold warnings are not errors and live on
//! the outcome itself.

use symrel_model::{ModelError, RelationId};
use symrel_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Dispatch
    #[error("unknown opcode {0}")]
    UnknownOpcode(u16),
    #[error("invalid parameters for opcode {opcode}: {reason}")]
    InvalidParams { opcode: u16, reason: String },
    #[error("no state is loaded; run init (opcode 100) first")]
    NoState,

    // Validation
    #[error("alphabet must contain at least one character")]
    EmptyAlphabet,
    #[error("maximum length must be a positive integer")]
    InvalidLength,
    #[error("relation name must not be empty")]
    EmptyName,
    #[error("relation definition must not be empty")]
    EmptyBody,
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("missing relation id")]
    MissingId,
    #[error("missing file path")]
    MissingPath,

    // Lookup and conflicts
    #[error("no relation found with id {0}")]
    RelationNotFound(RelationId),
    #[error("a relation named `{0}` already exists")]
    DuplicateName(String),

    // User-authored predicates
    #[error("invalid relation definition: {0}")]
    InvalidDefinition(String),
    #[error("relation evaluation failed: {0}")]
    Evaluation(String),

    // Collaborators
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<ModelError> for CoreError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::EmptyAlphabet => Self::EmptyAlphabet,
            ModelError::InvalidMaxLength => Self::InvalidLength,
            ModelError::EmptyRelationName => Self::EmptyName,
            ModelError::EmptyRelationBody => Self::EmptyBody,
        }
    }
}
