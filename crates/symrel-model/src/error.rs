use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("alphabet must contain at least one character")]
    EmptyAlphabet,
    #[error("maximum length must be a positive integer")]
    InvalidMaxLength,
    #[error("relation name must not be empty")]
    EmptyRelationName,
    #[error("relation definition must not be empty")]
    EmptyRelationBody,
}

pub type Result<T> = std::result::Result<T, ModelError>;
