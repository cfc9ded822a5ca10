//! Error types for the predicate expression language.
//!
//! [`ParseError`] is a definition-time failure; [`EvalError`] only occurs
//! at invocation time. [`ExprError`] unifies both for callers that do not
//! care which phase failed.

use thiserror::Error;

/// Syntax error, reported with the byte offset of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Runtime failure while evaluating a compiled predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown identifier `{0}` (only tokenA and tokenB are bound)")]
    UnknownIdentifier(String),
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("`{name}` expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("type error: {0}")]
    TypeMismatch(String),
}

/// Any failure from compiling or evaluating a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
