//! End-to-end tests for the instruction machine: lifecycle, generation,
//! relation management, comparison, and import/export.

use std::path::{Path, PathBuf};

use serde_json::json;
use symrel_core::{Instruction, Machine, MachineConfig};
use symrel_expr::Value;
use symrel_model::RelationId;
use symrel_store::{DirKvStore, FileStore, KeyValueStore, MemoryFileStore, MemoryKvStore};

fn machine() -> Machine {
    Machine::new(
        Box::new(MemoryKvStore::new()),
        Box::new(MemoryFileStore::new()),
        MachineConfig::default(),
    )
}

fn initialized() -> Machine {
    let mut machine = machine();
    let outcome = machine.dispatch(Instruction::InitState {
        path: None,
        restore: false,
    });
    assert!(outcome.success);
    machine
}

fn init() -> Instruction {
    Instruction::InitState {
        path: None,
        restore: false,
    }
}

fn compare(token_a: &str, token_b: &str, relation_id: i64) -> Instruction {
    Instruction::CompareTokens {
        token_a: token_a.to_string(),
        token_b: token_b.to_string(),
        relation_id: RelationId::new(relation_id),
    }
}

// ============================================================================
// Init / save lifecycle
// ============================================================================

#[test]
fn init_without_sources_adopts_defaults() {
    let mut machine = machine();
    let outcome = machine.dispatch(init());
    assert!(outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("initialized default state"));
    let state = machine.state().expect("state after init");
    assert_eq!(state.tokens.len(), 14);
    assert_eq!(state.relations.len(), 4);
}

#[test]
fn save_then_restore_round_trips() {
    let mut machine = initialized();
    machine.dispatch(Instruction::GenerateTokens {
        alphabet: "ab".to_string(),
        max_length: 2,
        force: false,
    });
    let saved = machine.dispatch(Instruction::SaveState { path: None });
    assert!(saved.success);
    let expected = machine.state().unwrap().clone();

    // A restore-init replaces the live state with the saved snapshot.
    machine.dispatch(Instruction::GenerateTokens {
        alphabet: "z".to_string(),
        max_length: 1,
        force: false,
    });
    let outcome = machine.dispatch(Instruction::InitState {
        path: None,
        restore: true,
    });
    assert!(outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("restored state from saved session")
    );
    assert_eq!(machine.state().unwrap(), &expected);
}

#[test]
fn init_restores_from_session_store() {
    let kv = MemoryKvStore::new();
    let state = symrel_model::SystemState::default_snapshot();
    let compact = symrel_store::serialize_state(&state, false).unwrap();
    kv.set("symrel.state", &compact).unwrap();

    let mut machine = Machine::new(
        Box::new(kv),
        Box::new(MemoryFileStore::new()),
        MachineConfig::default(),
    );
    let outcome = machine.dispatch(Instruction::InitState {
        path: None,
        restore: true,
    });
    assert!(outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("restored state from saved session")
    );
}

#[test]
fn init_loads_from_explicit_path() {
    let files = MemoryFileStore::new();
    let state = symrel_model::SystemState::default_snapshot();
    let pretty = symrel_store::serialize_state(&state, true).unwrap();
    files.write(Path::new("/data/lexicon.json"), &pretty).unwrap();

    let mut machine = Machine::new(
        Box::new(MemoryKvStore::new()),
        Box::new(files),
        MachineConfig::default(),
    );
    let outcome = machine.dispatch(Instruction::InitState {
        path: Some(PathBuf::from("/data/lexicon.json")),
        restore: false,
    });
    assert!(outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("loaded state from /data/lexicon.json")
    );
}

#[test]
fn init_falls_back_to_defaults_on_corrupt_file() {
    let files = MemoryFileStore::new();
    files
        .write(Path::new("/data/broken.json"), b"not a snapshot")
        .unwrap();

    let mut machine = Machine::new(
        Box::new(MemoryKvStore::new()),
        Box::new(files),
        MachineConfig::default(),
    );
    let outcome = machine.dispatch(Instruction::InitState {
        path: Some(PathBuf::from("/data/broken.json")),
        restore: false,
    });
    // Never fails outward.
    assert!(outcome.success);
    let message = outcome.message.unwrap();
    assert!(message.contains("after load error"), "{message}");
    assert_eq!(machine.state().unwrap().tokens.len(), 14);
}

#[test]
fn save_without_state_fails() {
    let mut machine = machine();
    let outcome = machine.dispatch(Instruction::SaveState { path: None });
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("no state"));
}

#[test]
fn save_twice_is_idempotent() {
    // Two saves of identical state must persist identical bytes.
    let dir = tempfile::tempdir().unwrap();
    let mut machine = Machine::new(
        Box::new(DirKvStore::new(dir.path())),
        Box::new(MemoryFileStore::new()),
        MachineConfig::default(),
    );
    machine.dispatch(init());
    assert!(machine.dispatch(Instruction::SaveState { path: None }).success);
    let first = std::fs::read(dir.path().join("symrel_state")).unwrap();
    assert!(machine.dispatch(Instruction::SaveState { path: None }).success);
    let second = std::fs::read(dir.path().join("symrel_state")).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Token generation
// ============================================================================

#[test]
fn generates_binary_lexicon_in_canonical_order() {
    let mut machine = initialized();
    let outcome = machine.dispatch(Instruction::GenerateTokens {
        alphabet: "01".to_string(),
        max_length: 3,
        force: false,
    });
    assert!(outcome.success);
    assert_eq!(outcome.token_count, Some(14));
    assert_eq!(
        machine.state().unwrap().tokens,
        vec![
            "0", "1", "00", "01", "10", "11", "000", "001", "010", "011", "100", "101", "110",
            "111",
        ]
    );
}

#[test]
fn generation_deduplicates_the_alphabet() {
    let mut machine = initialized();
    let outcome = machine.dispatch(Instruction::GenerateTokens {
        alphabet: "0101".to_string(),
        max_length: 2,
        force: false,
    });
    assert!(outcome.success);
    assert_eq!(outcome.token_count, Some(6));
    assert_eq!(machine.state().unwrap().lexicon.alphabet(), "01");
}

#[test]
fn empty_alphabet_is_rejected() {
    let mut machine = initialized();
    let outcome = machine.dispatch(Instruction::GenerateTokens {
        alphabet: String::new(),
        max_length: 2,
        force: false,
    });
    assert!(!outcome.success);
    assert!(!outcome.warning);
    assert!(outcome.message.unwrap().contains("alphabet"));
}

#[test]
fn zero_max_length_is_rejected() {
    let mut machine = initialized();
    let outcome = machine.dispatch(Instruction::GenerateTokens {
        alphabet: "01".to_string(),
        max_length: 0,
        force: false,
    });
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("positive"));
}

#[test]
fn over_threshold_warns_without_mutating() {
    let mut machine = initialized();
    let before = machine.state().unwrap().clone();

    let outcome = machine.dispatch(Instruction::GenerateTokens {
        alphabet: "01".to_string(),
        max_length: 13,
        force: false,
    });
    assert!(!outcome.success);
    assert!(outcome.warning);
    assert_eq!(outcome.token_count, Some(16382));
    assert_eq!(machine.state().unwrap(), &before);

    // Retrying with force applies the mutation.
    let outcome = machine.dispatch(Instruction::GenerateTokens {
        alphabet: "01".to_string(),
        max_length: 13,
        force: true,
    });
    assert!(outcome.success);
    assert_eq!(machine.state().unwrap().tokens.len(), 16382);
}

// ============================================================================
// Relation store
// ============================================================================

#[test]
fn adds_a_relation_with_normalized_name() {
    let mut machine = initialized();
    let outcome = machine.dispatch(Instruction::UpsertRelation {
        id: None,
        name: "  same   length ".to_string(),
        definition: "len(tokenA) == len(tokenB)".to_string(),
    });
    assert!(outcome.success, "{:?}", outcome.message);
    assert_eq!(outcome.relation.as_deref(), Some("SAME_LENGTH"));
    let state = machine.state().unwrap();
    assert_eq!(state.relations.len(), 5);
    assert_eq!(state.relations[4].name, "SAME_LENGTH");
}

#[test]
fn duplicate_name_conflicts_regardless_of_variant_spelling() {
    let mut machine = initialized();
    // EQUALS is a built-in; every casing/whitespace variant collides.
    for variant in ["EQUALS", "equals", "  Equals ", "e quals"] {
        let outcome = machine.dispatch(Instruction::UpsertRelation {
            id: None,
            name: variant.to_string(),
            definition: "tokenA == tokenB".to_string(),
        });
        if variant == "e quals" {
            // Normalizes to E_QUALS, which is distinct.
            assert!(outcome.success);
        } else {
            assert!(!outcome.success, "variant {variant:?} should conflict");
            assert!(outcome.message.unwrap().contains("already exists"));
        }
    }
}

#[test]
fn editing_keeps_position_and_checks_conflicts_against_others() {
    let mut machine = initialized();
    // Rename IS_PREFIX_OF (id 2) keeping its own name: allowed.
    let outcome = machine.dispatch(Instruction::UpsertRelation {
        id: Some(RelationId::new(2)),
        name: "is prefix of".to_string(),
        definition: "starts_with(tokenB, tokenA)".to_string(),
    });
    assert!(outcome.success, "{:?}", outcome.message);
    assert_eq!(machine.state().unwrap().relations[1].name, "IS_PREFIX_OF");

    // Renaming it to another relation's name: conflict.
    let outcome = machine.dispatch(Instruction::UpsertRelation {
        id: Some(RelationId::new(2)),
        name: "contains".to_string(),
        definition: "starts_with(tokenB, tokenA)".to_string(),
    });
    assert!(!outcome.success);

    // Unknown id: not found.
    let outcome = machine.dispatch(Instruction::UpsertRelation {
        id: Some(RelationId::new(9999)),
        name: "whatever".to_string(),
        definition: "true".to_string(),
    });
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("9999"));
}

#[test]
fn malformed_definition_is_rejected_with_parser_text() {
    let mut machine = initialized();
    let outcome = machine.dispatch(Instruction::UpsertRelation {
        id: None,
        name: "BROKEN".to_string(),
        definition: "tokenA ==".to_string(),
    });
    assert!(!outcome.success);
    let message = outcome.message.unwrap();
    assert!(message.contains("invalid relation definition"), "{message}");
    assert!(machine.state().unwrap().relations.len() == 4);
}

#[test]
fn deleting_unknown_id_leaves_sequence_identical() {
    let mut machine = initialized();
    let before: Vec<String> = machine
        .state()
        .unwrap()
        .relations
        .iter()
        .map(|relation| relation.name.clone())
        .collect();

    let outcome = machine.dispatch(Instruction::DeleteRelation {
        id: RelationId::new(12345),
    });
    assert!(!outcome.success);

    let after: Vec<String> = machine
        .state()
        .unwrap()
        .relations
        .iter()
        .map(|relation| relation.name.clone())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn deleting_a_relation_preserves_the_order_of_the_rest() {
    let mut machine = initialized();
    let outcome = machine.dispatch(Instruction::DeleteRelation {
        id: RelationId::new(2),
    });
    assert!(outcome.success);
    assert_eq!(outcome.relation.as_deref(), Some("IS_PREFIX_OF"));
    let names: Vec<&str> = machine
        .state()
        .unwrap()
        .relations
        .iter()
        .map(|relation| relation.name.as_str())
        .collect();
    assert_eq!(names, vec!["EQUALS", "IS_SUFFIX_OF", "CONTAINS"]);
}

// ============================================================================
// Comparison
// ============================================================================

#[test]
fn builtin_relations_have_documented_semantics() {
    let mut machine = initialized();

    let outcome = machine.dispatch(compare("101", "101", 1));
    assert_eq!(outcome.result, Some(Value::Bool(true)));
    let outcome = machine.dispatch(compare("101", "110", 1));
    assert_eq!(outcome.result, Some(Value::Bool(false)));

    // IS_PREFIX_OF(a, b): is a a prefix of b?
    let outcome = machine.dispatch(compare("10", "101", 2));
    assert_eq!(outcome.result, Some(Value::Bool(true)));

    // IS_SUFFIX_OF(a, b): is a a suffix of b?
    let outcome = machine.dispatch(compare("01", "101", 3));
    assert_eq!(outcome.result, Some(Value::Bool(true)));

    // CONTAINS(a, b): does b contain a?
    let outcome = machine.dispatch(compare("0", "101", 4));
    assert_eq!(outcome.result, Some(Value::Bool(true)));
    let outcome = machine.dispatch(compare("2", "101", 4));
    assert_eq!(outcome.result, Some(Value::Bool(false)));
}

#[test]
fn comparison_outcome_echoes_inputs_and_relation() {
    let mut machine = initialized();
    let outcome = machine.dispatch(compare("10", "101", 2));
    assert!(outcome.success);
    assert_eq!(outcome.token_a.as_deref(), Some("10"));
    assert_eq!(outcome.token_b.as_deref(), Some("101"));
    assert_eq!(outcome.relation.as_deref(), Some("IS_PREFIX_OF"));
}

#[test]
fn comparison_with_missing_inputs_fails() {
    let mut machine = initialized();
    let outcome = machine.dispatch(compare("", "101", 1));
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("tokenA"));

    let outcome = machine.dispatch(compare("101", "", 1));
    assert!(!outcome.success);

    let outcome = machine.dispatch(compare("101", "101", 777));
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("777"));
}

#[test]
fn evaluation_failure_is_per_call_not_fatal() {
    let mut machine = initialized();
    machine.dispatch(Instruction::UpsertRelation {
        id: None,
        name: "BAD_AT_RUNTIME".to_string(),
        // Compiles, but references an unbound identifier.
        definition: "tokenC == tokenA".to_string(),
    });
    let id = machine.state().unwrap().relations[4].id;

    let outcome = machine.dispatch(Instruction::CompareTokens {
        token_a: "0".to_string(),
        token_b: "1".to_string(),
        relation_id: id,
    });
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("evaluation failed"));

    // The machine still works afterwards.
    let outcome = machine.dispatch(compare("101", "101", 1));
    assert!(outcome.success);
}

#[test]
fn non_boolean_results_pass_through_untyped() {
    let mut machine = initialized();
    machine.dispatch(Instruction::UpsertRelation {
        id: None,
        name: "JOINED".to_string(),
        definition: "tokenA + tokenB".to_string(),
    });
    let id = machine.state().unwrap().relations[4].id;
    let outcome = machine.dispatch(Instruction::CompareTokens {
        token_a: "10".to_string(),
        token_b: "01".to_string(),
        relation_id: id,
    });
    assert!(outcome.success);
    assert_eq!(outcome.result, Some(Value::Str("1001".to_string())));
}

// ============================================================================
// Import / export
// ============================================================================

#[test]
fn export_then_import_reconstructs_the_state() {
    let mut machine = initialized();
    machine.dispatch(Instruction::GenerateTokens {
        alphabet: "xy".to_string(),
        max_length: 2,
        force: false,
    });
    machine.dispatch(Instruction::UpsertRelation {
        id: None,
        name: "SAME_LENGTH".to_string(),
        definition: "len(tokenA) == len(tokenB)".to_string(),
    });
    let exported = machine.dispatch(Instruction::ExportState {
        file_name: Some("roundtrip.json".to_string()),
        force: false,
    });
    assert!(exported.success, "{:?}", exported.message);
    let path = exported.path.expect("export path");
    let before = machine.state().unwrap().clone();

    // Wreck the live state, then import the export back.
    machine.dispatch(Instruction::GenerateTokens {
        alphabet: "z".to_string(),
        max_length: 1,
        force: false,
    });
    let imported = machine.dispatch(Instruction::ImportState { path });
    assert!(imported.success);
    assert_eq!(machine.state().unwrap(), &before);
}

#[test]
fn import_failure_leaves_state_untouched() {
    let files = MemoryFileStore::new();
    files
        .write(Path::new("/data/partial.json"), br#"{"lexicon":{"alphabet":"01","maxLength":3}}"#)
        .unwrap();
    let mut machine = Machine::new(
        Box::new(MemoryKvStore::new()),
        Box::new(files),
        MachineConfig::default(),
    );
    machine.dispatch(init());
    let before = machine.state().unwrap().clone();

    // Snapshot missing two required top-level keys.
    let outcome = machine.dispatch(Instruction::ImportState {
        path: PathBuf::from("/data/partial.json"),
    });
    assert!(!outcome.success);
    assert_eq!(machine.state().unwrap(), &before);

    // Absent file.
    let outcome = machine.dispatch(Instruction::ImportState {
        path: PathBuf::from("/data/nowhere.json"),
    });
    assert!(!outcome.success);
    assert_eq!(machine.state().unwrap(), &before);
}

#[test]
fn import_persists_to_the_session_store() {
    let files = MemoryFileStore::new();
    let state = symrel_model::SystemState::default_snapshot();
    files
        .write(
            Path::new("/data/full.json"),
            &symrel_store::serialize_state(&state, true).unwrap(),
        )
        .unwrap();

    let kv = Box::new(MemoryKvStore::new());
    let mut machine = Machine::new(kv, Box::new(files), MachineConfig::default());
    let outcome = machine.dispatch(Instruction::ImportState {
        path: PathBuf::from("/data/full.json"),
    });
    assert!(outcome.success);
    // Machine state adopted wholesale; a restore-init now finds it.
    let outcome = machine.dispatch(Instruction::InitState {
        path: None,
        restore: true,
    });
    assert!(outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("restored state from saved session")
    );
}

#[test]
fn export_over_existing_file_requires_confirmation() {
    let mut machine = initialized();
    let first = machine.dispatch(Instruction::ExportState {
        file_name: Some("snapshot.json".to_string()),
        force: false,
    });
    assert!(first.success);

    let second = machine.dispatch(Instruction::ExportState {
        file_name: Some("snapshot.json".to_string()),
        force: false,
    });
    assert!(!second.success);
    assert!(second.require_confirmation);
    assert_eq!(second.path, first.path);

    let forced = machine.dispatch(Instruction::ExportState {
        file_name: Some("snapshot.json".to_string()),
        force: true,
    });
    assert!(forced.success);
}

#[test]
fn export_without_state_fails() {
    let mut machine = machine();
    let outcome = machine.dispatch(Instruction::ExportState {
        file_name: None,
        force: false,
    });
    assert!(!outcome.success);
    assert!(!outcome.require_confirmation);
}

// ============================================================================
// Wire dispatch
// ============================================================================

#[test]
fn raw_dispatch_covers_the_opcode_table() {
    let mut machine = machine();
    let outcome = machine.dispatch_raw(100, json!({}));
    assert!(outcome.success);

    let outcome = machine.dispatch_raw(
        300,
        json!({ "alphabet": "01", "maxLength": 3 }),
    );
    assert!(outcome.success);
    assert_eq!(outcome.token_count, Some(14));

    let outcome = machine.dispatch_raw(
        303,
        json!({ "tokenA": "101", "tokenB": "101", "relationId": 1 }),
    );
    assert!(outcome.success);
    assert_eq!(outcome.result, Some(Value::Bool(true)));
}

#[test]
fn unknown_opcode_returns_uniform_failure() {
    let mut machine = initialized();
    let outcome = machine.dispatch_raw(999, json!({}));
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("unknown opcode 999"));
}
