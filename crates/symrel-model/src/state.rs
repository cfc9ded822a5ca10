//! The single mutable state aggregate.

use crate::ids::RelationId;
use crate::lexicon::LexiconConfig;
use crate::relation::RelationDefinition;

/// Everything the workbench knows: lexicon config, generated tokens, and
/// relation definitions.
///
/// Exactly one `SystemState` is live per machine. It is replaced wholesale
/// on init/import/reset and mutated in place by generate/upsert/delete.
/// Token order is generation order; relation order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SystemState {
    pub lexicon: LexiconConfig,
    #[serde(rename = "generatedTokens")]
    pub tokens: Vec<String>,
    #[serde(rename = "relationDefinitions")]
    pub relations: Vec<RelationDefinition>,
}

impl SystemState {
    /// The fixed default snapshot adopted when nothing can be loaded:
    /// binary alphabet, max length 3, all 14 tokens in generation order,
    /// and the four built-in relations.
    pub fn default_snapshot() -> Self {
        let lexicon = LexiconConfig::default();
        let tokens = [
            "0", "1", "00", "01", "10", "11", "000", "001", "010", "011", "100", "101", "110",
            "111",
        ]
        .iter()
        .map(|token| (*token).to_string())
        .collect();
        let relations = vec![
            builtin(1, "EQUALS", "tokenA == tokenB"),
            builtin(2, "IS_PREFIX_OF", "starts_with(tokenB, tokenA)"),
            builtin(3, "IS_SUFFIX_OF", "ends_with(tokenB, tokenA)"),
            builtin(4, "CONTAINS", "contains(tokenB, tokenA)"),
        ];
        Self {
            lexicon,
            tokens,
            relations,
        }
    }

    pub fn relation_by_id(&self, id: RelationId) -> Option<&RelationDefinition> {
        self.relations.iter().find(|relation| relation.id == id)
    }

    /// Look up a relation by normalized name, optionally ignoring one id
    /// (the entry being edited).
    pub fn relation_by_name(
        &self,
        name: &str,
        ignore: Option<RelationId>,
    ) -> Option<&RelationDefinition> {
        self.relations
            .iter()
            .find(|relation| relation.name == name && Some(relation.id) != ignore)
    }

    pub fn max_relation_id(&self) -> i64 {
        self.relations
            .iter()
            .map(|relation| relation.id.as_i64())
            .max()
            .unwrap_or(0)
    }
}

fn builtin(id: i64, name: &str, body: &str) -> RelationDefinition {
    RelationDefinition {
        id: RelationId::new(id),
        name: name.to_string(),
        body: body.to_string(),
    }
}
