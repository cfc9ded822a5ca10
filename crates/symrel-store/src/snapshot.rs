//! Snapshot (de)serialization.
//!
//! The persisted format is a JSON object with exactly the keys
//! `lexicon`, `generatedTokens`, and `relationDefinitions`; the serde
//! renames on [`SystemState`] produce it directly. Parsing rejects any
//! payload missing one of the three top-level keys.

use symrel_model::SystemState;

use crate::error::{Result, StoreError};

/// Serialize a state snapshot.
///
/// Compact form is used for the key-value store; the pretty form is what
/// lands in user-facing files. Serialization is deterministic: identical
/// states always produce identical bytes.
pub fn serialize_state(state: &SystemState, pretty: bool) -> Result<Vec<u8>> {
    let result = if pretty {
        serde_json::to_vec_pretty(state)
    } else {
        serde_json::to_vec(state)
    };
    result.map_err(|source| StoreError::Serialization { source })
}

/// Parse a state snapshot, validating the schema.
pub fn parse_state(bytes: &[u8]) -> Result<SystemState> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::InvalidFormat {
        reason: source.to_string(),
    })
}
