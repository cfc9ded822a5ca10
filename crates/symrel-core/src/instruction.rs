//! The fixed instruction set.
//!
//! Each opcode is one variant of [`Instruction`], so dispatch resolves at
//! compile time; the numeric opcodes survive only at the wire boundary
//! ([`Instruction::decode`]), which accepts a JSON parameter object in
//! the original camelCase form.

use std::path::PathBuf;

use symrel_model::RelationId;

use crate::error::CoreError;

/// One operation of the instruction core, with typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Opcode 100: adopt state from a file, the session store, or defaults.
    InitState {
        path: Option<PathBuf>,
        restore: bool,
    },
    /// Opcode 101: persist state to the session store and optionally a file.
    SaveState { path: Option<PathBuf> },
    /// Opcode 300: regenerate the token vocabulary.
    GenerateTokens {
        alphabet: String,
        max_length: usize,
        force: bool,
    },
    /// Opcode 301: add (no id) or edit (id given) a relation definition.
    UpsertRelation {
        id: Option<RelationId>,
        name: String,
        definition: String,
    },
    /// Opcode 302: remove a relation definition.
    DeleteRelation { id: RelationId },
    /// Opcode 303: evaluate a relation against a token pair.
    CompareTokens {
        token_a: String,
        token_b: String,
        relation_id: RelationId,
    },
    /// Opcode 304: wholesale-replace state from a snapshot file.
    ImportState { path: PathBuf },
    /// Opcode 305: write a pretty snapshot into the export directory.
    ExportState {
        file_name: Option<String>,
        force: bool,
    },
}

impl Instruction {
    /// The stable wire opcode.
    pub fn opcode(&self) -> u16 {
        match self {
            Self::InitState { .. } => 100,
            Self::SaveState { .. } => 101,
            Self::GenerateTokens { .. } => 300,
            Self::UpsertRelation { .. } => 301,
            Self::DeleteRelation { .. } => 302,
            Self::CompareTokens { .. } => 303,
            Self::ImportState { .. } => 304,
            Self::ExportState { .. } => 305,
        }
    }

    /// The same instruction with its `force` flag set, for confirmation
    /// retries. Instructions without a force flag are returned unchanged.
    pub fn with_force(self) -> Self {
        match self {
            Self::GenerateTokens {
                alphabet,
                max_length,
                ..
            } => Self::GenerateTokens {
                alphabet,
                max_length,
                force: true,
            },
            Self::ExportState { file_name, .. } => Self::ExportState {
                file_name,
                force: true,
            },
            other => other,
        }
    }

    /// Reconstruct an instruction from a wire opcode and JSON parameters.
    pub fn decode(opcode: u16, params: serde_json::Value) -> Result<Self, CoreError> {
        match opcode {
            100 => {
                let params: InitParams = from_params(opcode, params)?;
                Ok(Self::InitState {
                    path: params.path,
                    restore: params.restore,
                })
            }
            101 => {
                let params: SaveParams = from_params(opcode, params)?;
                Ok(Self::SaveState { path: params.path })
            }
            300 => {
                let params: GenerateParams = from_params(opcode, params)?;
                let max_length =
                    usize::try_from(params.max_length).map_err(|_| CoreError::InvalidLength)?;
                Ok(Self::GenerateTokens {
                    alphabet: params.alphabet,
                    max_length,
                    force: params.force,
                })
            }
            301 => {
                let params: UpsertParams = from_params(opcode, params)?;
                Ok(Self::UpsertRelation {
                    id: params.id.map(RelationId::new),
                    name: params.name,
                    definition: params.definition,
                })
            }
            302 => {
                let params: DeleteParams = from_params(opcode, params)?;
                let id = params.id.ok_or(CoreError::MissingId)?;
                Ok(Self::DeleteRelation {
                    id: RelationId::new(id),
                })
            }
            303 => {
                let params: CompareParams = from_params(opcode, params)?;
                let token_a = params.token_a.ok_or(CoreError::MissingArgument("tokenA"))?;
                let token_b = params.token_b.ok_or(CoreError::MissingArgument("tokenB"))?;
                let relation_id = params
                    .relation_id
                    .ok_or(CoreError::MissingArgument("relationId"))?;
                Ok(Self::CompareTokens {
                    token_a,
                    token_b,
                    relation_id: RelationId::new(relation_id),
                })
            }
            304 => {
                let params: ImportParams = from_params(opcode, params)?;
                let path = params.path.ok_or(CoreError::MissingPath)?;
                Ok(Self::ImportState { path })
            }
            305 => {
                let params: ExportParams = from_params(opcode, params)?;
                Ok(Self::ExportState {
                    file_name: params.file_name,
                    force: params.force,
                })
            }
            other => Err(CoreError::UnknownOpcode(other)),
        }
    }
}

fn from_params<T: serde::de::DeserializeOwned>(
    opcode: u16,
    params: serde_json::Value,
) -> Result<T, CoreError> {
    serde_json::from_value(params).map_err(|error| CoreError::InvalidParams {
        opcode,
        reason: error.to_string(),
    })
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitParams {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    restore: bool,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveParams {
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateParams {
    alphabet: String,
    max_length: i64,
    #[serde(default)]
    force: bool,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertParams {
    #[serde(default)]
    id: Option<i64>,
    name: String,
    definition: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteParams {
    #[serde(default)]
    id: Option<i64>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompareParams {
    #[serde(default)]
    token_a: Option<String>,
    #[serde(default)]
    token_b: Option<String>,
    #[serde(default)]
    relation_id: Option<i64>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportParams {
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportParams {
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_generate_params() {
        let instruction = Instruction::decode(
            300,
            json!({ "alphabet": "01", "maxLength": 3, "force": true }),
        )
        .unwrap();
        assert_eq!(
            instruction,
            Instruction::GenerateTokens {
                alphabet: "01".to_string(),
                max_length: 3,
                force: true,
            }
        );
        assert_eq!(instruction.opcode(), 300);
    }

    #[test]
    fn negative_max_length_is_invalid() {
        assert!(matches!(
            Instruction::decode(300, json!({ "alphabet": "01", "maxLength": -1 })),
            Err(CoreError::InvalidLength)
        ));
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        assert!(matches!(
            Instruction::decode(999, json!({})),
            Err(CoreError::UnknownOpcode(999))
        ));
    }

    #[test]
    fn delete_requires_an_id() {
        assert!(matches!(
            Instruction::decode(302, json!({})),
            Err(CoreError::MissingId)
        ));
    }

    #[test]
    fn compare_requires_all_three_arguments() {
        assert!(matches!(
            Instruction::decode(303, json!({ "tokenA": "0", "tokenB": "1" })),
            Err(CoreError::MissingArgument("relationId"))
        ));
        let ok = Instruction::decode(
            303,
            json!({ "tokenA": "0", "tokenB": "1", "relationId": 1 }),
        )
        .unwrap();
        assert_eq!(ok.opcode(), 303);
    }

    #[test]
    fn with_force_only_touches_forceable_instructions() {
        let generate = Instruction::GenerateTokens {
            alphabet: "01".to_string(),
            max_length: 3,
            force: false,
        };
        assert!(matches!(
            generate.with_force(),
            Instruction::GenerateTokens { force: true, .. }
        ));

        let delete = Instruction::DeleteRelation {
            id: RelationId::new(1),
        };
        assert_eq!(delete.clone().with_force(), delete);
    }
}
