//! Named binary predicates over token pairs.

use crate::error::{ModelError, Result};
use crate::ids::RelationId;

/// A stored, user-authored relation.
///
/// `body` is opaque source text in the predicate language; it references
/// the bindings `tokenA` and `tokenB` and is compiled at comparison time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RelationDefinition {
    pub id: RelationId,
    pub name: String,
    #[serde(rename = "definition")]
    pub body: String,
}

impl RelationDefinition {
    /// Build a definition from raw user input, normalizing the name.
    pub fn new(id: RelationId, name: &str, body: &str) -> Result<Self> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(ModelError::EmptyRelationName);
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(ModelError::EmptyRelationBody);
        }
        Ok(Self {
            id,
            name,
            body: body.to_string(),
        })
    }
}

/// Normalize a relation name: trim, upper-case, collapse internal
/// whitespace runs into single underscores.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}
