//! The uniform dispatch result.

use std::path::PathBuf;

use symrel_expr::Value;

/// Result of one dispatched instruction, uniform across all opcodes.
///
/// Callers branch on `success` plus the documented extra fields. A
/// `warning` or `require_confirmation` outcome is not an error: it asks
/// the caller to confirm and re-dispatch the same instruction with
/// `force` set. Serializes camelCase to match the wire contract
/// (`requireConfirmation`, `tokenCount`, ...).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Soft threshold warning (large token generation).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub warning: bool,
    /// Destructive step awaiting confirmation (export overwrite).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub require_confirmation: bool,
    /// Name of the relation an operation touched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    /// Untyped predicate result from a comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u64>,
    /// Path an export resolved to (also present on confirmation requests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// A threshold warning: not yet applied, caller may retry with force.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            success: false,
            warning: true,
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// A pending destructive step: caller must confirm and retry with force.
    pub fn confirmation(message: impl Into<String>, path: PathBuf) -> Self {
        Self {
            success: false,
            require_confirmation: true,
            message: Some(message.into()),
            path: Some(path),
            ..Self::empty()
        }
    }

    pub fn with_relation(mut self, name: impl Into<String>) -> Self {
        self.relation = Some(name.into());
        self
    }

    pub fn with_result(mut self, value: Value) -> Self {
        self.result = Some(value);
        self
    }

    pub fn with_tokens(mut self, token_a: impl Into<String>, token_b: impl Into<String>) -> Self {
        self.token_a = Some(token_a.into());
        self.token_b = Some(token_b.into());
        self
    }

    pub fn with_token_count(mut self, count: u64) -> Self {
        self.token_count = Some(count);
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    fn empty() -> Self {
        Self {
            success: false,
            message: None,
            warning: false,
            require_confirmation: false,
            relation: None,
            result: None,
            token_a: None,
            token_b: None,
            token_count: None,
            path: None,
        }
    }
}
