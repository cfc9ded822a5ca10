//! The machine: single state owner and instruction dispatcher.

use std::path::PathBuf;

use symrel_expr::Predicate;
use symrel_model::{LexiconConfig, RelationDefinition, RelationId, SystemState};
use symrel_store::{FileStore, KeyValueStore, StoreError, parse_state, serialize_state};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::generator::{GENERATION_WARNING_THRESHOLD, enumerate_tokens, total_token_count};
use crate::instruction::Instruction;
use crate::outcome::Outcome;

/// Fixed key the state snapshot is persisted under in the session store.
pub const STATE_KEY: &str = "symrel.state";

/// Machine behavior knobs.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// Key-value store key for the session snapshot.
    pub state_key: String,
    /// Directory export destinations are resolved against.
    pub export_dir: PathBuf,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            state_key: STATE_KEY.to_string(),
            export_dir: PathBuf::from("exports"),
        }
    }
}

impl MachineConfig {
    pub fn with_state_key(mut self, key: impl Into<String>) -> Self {
        self.state_key = key.into();
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }
}

/// Owns the single [`SystemState`] and the storage collaborators.
///
/// All access goes through [`Machine::dispatch`]; the state reference is
/// never handed out mutably. The machine is single-threaded by design:
/// at most one instruction is in flight at a time.
pub struct Machine {
    state: Option<SystemState>,
    kv: Box<dyn KeyValueStore>,
    files: Box<dyn FileStore>,
    config: MachineConfig,
}

impl Machine {
    pub fn new(
        kv: Box<dyn KeyValueStore>,
        files: Box<dyn FileStore>,
        config: MachineConfig,
    ) -> Self {
        Self {
            state: None,
            kv,
            files,
            config,
        }
    }

    /// Read-only view of the live state, if initialized.
    pub fn state(&self) -> Option<&SystemState> {
        self.state.as_ref()
    }

    /// Dispatch one instruction.
    ///
    /// Never panics and never propagates an error: every failure comes
    /// back as `{ success: false, message }`.
    pub fn dispatch(&mut self, instruction: Instruction) -> Outcome {
        let opcode = instruction.opcode();
        debug!(opcode, "dispatch");
        match self.execute(instruction) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(opcode, %error, "instruction failed");
                Outcome::failure(error.to_string())
            }
        }
    }

    /// Dispatch from the wire form: numeric opcode plus JSON parameters.
    pub fn dispatch_raw(&mut self, opcode: u16, params: serde_json::Value) -> Outcome {
        match Instruction::decode(opcode, params) {
            Ok(instruction) => self.dispatch(instruction),
            Err(error) => {
                warn!(opcode, %error, "instruction rejected");
                Outcome::failure(error.to_string())
            }
        }
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Outcome, CoreError> {
        match instruction {
            Instruction::InitState { path, restore } => Ok(self.init_state(path, restore)),
            Instruction::SaveState { path } => self.save_state(path),
            Instruction::GenerateTokens {
                alphabet,
                max_length,
                force,
            } => self.generate_tokens(&alphabet, max_length, force),
            Instruction::UpsertRelation {
                id,
                name,
                definition,
            } => self.upsert_relation(id, &name, &definition),
            Instruction::DeleteRelation { id } => self.delete_relation(id),
            Instruction::CompareTokens {
                token_a,
                token_b,
                relation_id,
            } => self.compare_tokens(&token_a, &token_b, relation_id),
            Instruction::ImportState { path } => self.import_state(&path),
            Instruction::ExportState { file_name, force } => self.export_state(file_name, force),
        }
    }

    /// Opcode 100. The sole exception-swallowing boundary: any load
    /// failure falls back to the default snapshot, so this always ends
    /// with a valid state.
    fn init_state(&mut self, path: Option<PathBuf>, restore: bool) -> Outcome {
        let loaded = self.try_load(path.as_deref(), restore);
        let (state, message) = match loaded {
            Ok(Some(pair)) => pair,
            Ok(None) => (
                SystemState::default_snapshot(),
                "initialized default state".to_string(),
            ),
            Err(error) => {
                warn!(%error, "state load failed, falling back to defaults");
                (
                    SystemState::default_snapshot(),
                    format!("initialized default state after load error: {error}"),
                )
            }
        };
        info!(
            tokens = state.tokens.len(),
            relations = state.relations.len(),
            "state initialized"
        );
        self.state = Some(state);
        Outcome::success(message)
    }

    fn try_load(
        &self,
        path: Option<&std::path::Path>,
        restore: bool,
    ) -> Result<Option<(SystemState, String)>, CoreError> {
        if let Some(path) = path {
            let bytes = self
                .files
                .read(path)?
                .ok_or_else(|| StoreError::FileNotFound(path.to_path_buf()))?;
            let state = parse_state(&bytes)?;
            return Ok(Some((
                state,
                format!("loaded state from {}", path.display()),
            )));
        }
        if restore && let Some(bytes) = self.kv.get(&self.config.state_key)? {
            let state = parse_state(&bytes)?;
            return Ok(Some((
                state,
                "restored state from saved session".to_string(),
            )));
        }
        Ok(None)
    }

    /// Opcode 101.
    fn save_state(&mut self, path: Option<PathBuf>) -> Result<Outcome, CoreError> {
        let state = self.state.as_ref().ok_or(CoreError::NoState)?;
        let compact = serialize_state(state, false)?;
        self.kv.set(&self.config.state_key, &compact)?;
        let message = match path {
            Some(path) => {
                let pretty = serialize_state(state, true)?;
                self.files.write(&path, &pretty)?;
                format!("saved state to session store and {}", path.display())
            }
            None => "saved state to session store".to_string(),
        };
        Ok(Outcome::success(message))
    }

    /// Opcode 300.
    fn generate_tokens(
        &mut self,
        alphabet: &str,
        max_length: usize,
        force: bool,
    ) -> Result<Outcome, CoreError> {
        if self.state.is_none() {
            return Err(CoreError::NoState);
        }
        let lexicon = LexiconConfig::new(alphabet, max_length)?;

        let count = total_token_count(lexicon.symbol_count(), lexicon.max_length());
        match count {
            // Overflow: no force flag makes this generable.
            None => {
                return Ok(Outcome::warning(format!(
                    "token count exceeds {GENERATION_WARNING_THRESHOLD} by more than can be counted; choose a smaller lexicon"
                )));
            }
            Some(count) if count > GENERATION_WARNING_THRESHOLD && !force => {
                return Ok(Outcome::warning(format!(
                    "generating {count} tokens exceeds the threshold of {GENERATION_WARNING_THRESHOLD}; confirm to proceed"
                ))
                .with_token_count(count));
            }
            Some(_) => {}
        }

        let tokens = enumerate_tokens(&lexicon);
        let count = tokens.len() as u64;
        // Checked above that state is Some.
        if let Some(state) = self.state.as_mut() {
            state.lexicon = lexicon;
            state.tokens = tokens;
        }
        info!(count, "generated tokens");
        Ok(Outcome::success(format!("generated {count} tokens")).with_token_count(count))
    }

    /// Opcode 301.
    fn upsert_relation(
        &mut self,
        id: Option<RelationId>,
        name: &str,
        definition: &str,
    ) -> Result<Outcome, CoreError> {
        let state = self.state.as_mut().ok_or(CoreError::NoState)?;

        // Validate syntax eagerly, before any mutation; runtime errors in
        // the body stay invocation-time failures.
        let placeholder_id = id.unwrap_or_else(|| RelationId::new(0));
        let candidate = RelationDefinition::new(placeholder_id, name, definition)?;
        Predicate::compile(&candidate.body)
            .map_err(|error| CoreError::InvalidDefinition(error.to_string()))?;

        match id {
            Some(id) => {
                let position = state
                    .relations
                    .iter()
                    .position(|relation| relation.id == id)
                    .ok_or(CoreError::RelationNotFound(id))?;
                if state.relation_by_name(&candidate.name, Some(id)).is_some() {
                    return Err(CoreError::DuplicateName(candidate.name));
                }
                let name = candidate.name.clone();
                state.relations[position] = candidate;
                info!(%id, name, "updated relation");
                Ok(Outcome::success(format!("updated relation {name}")).with_relation(name))
            }
            None => {
                if state.relation_by_name(&candidate.name, None).is_some() {
                    return Err(CoreError::DuplicateName(candidate.name));
                }
                let id = next_relation_id(state);
                let name = candidate.name.clone();
                state.relations.push(RelationDefinition {
                    id,
                    ..candidate
                });
                info!(%id, name, "added relation");
                Ok(
                    Outcome::success(format!("added relation {name} (id {id})"))
                        .with_relation(name),
                )
            }
        }
    }

    /// Opcode 302.
    fn delete_relation(&mut self, id: RelationId) -> Result<Outcome, CoreError> {
        let state = self.state.as_mut().ok_or(CoreError::NoState)?;
        let position = state
            .relations
            .iter()
            .position(|relation| relation.id == id)
            .ok_or(CoreError::RelationNotFound(id))?;
        let removed = state.relations.remove(position);
        info!(%id, name = removed.name, "deleted relation");
        Ok(
            Outcome::success(format!("deleted relation {}", removed.name))
                .with_relation(removed.name),
        )
    }

    /// Opcode 303.
    fn compare_tokens(
        &mut self,
        token_a: &str,
        token_b: &str,
        relation_id: RelationId,
    ) -> Result<Outcome, CoreError> {
        let state = self.state.as_ref().ok_or(CoreError::NoState)?;
        if token_a.is_empty() {
            return Err(CoreError::MissingArgument("tokenA"));
        }
        if token_b.is_empty() {
            return Err(CoreError::MissingArgument("tokenB"));
        }
        let relation = state
            .relation_by_id(relation_id)
            .ok_or(CoreError::RelationNotFound(relation_id))?;

        // Per-call failure, never fatal to the machine.
        let value = Predicate::compile(&relation.body)
            .and_then(|predicate| predicate.eval(token_a, token_b))
            .map_err(|error| CoreError::Evaluation(error.to_string()))?;

        debug!(relation = relation.name, %value, "compared tokens");
        Ok(Outcome::success(format!(
            "{}({token_a}, {token_b}) = {value}",
            relation.name
        ))
        .with_relation(relation.name.clone())
        .with_tokens(token_a, token_b)
        .with_result(value))
    }

    /// Opcode 304. On any failure the current state is left untouched.
    fn import_state(&mut self, path: &std::path::Path) -> Result<Outcome, CoreError> {
        let bytes = self
            .files
            .read(path)?
            .ok_or_else(|| StoreError::FileNotFound(path.to_path_buf()))?;
        let state = parse_state(&bytes)?;
        let compact = serialize_state(&state, false)?;
        self.kv.set(&self.config.state_key, &compact)?;
        let token_count = state.tokens.len() as u64;
        self.state = Some(state);
        info!(path = %path.display(), "imported state");
        Ok(
            Outcome::success(format!("imported state from {}", path.display()))
                .with_token_count(token_count),
        )
    }

    /// Opcode 305.
    fn export_state(
        &mut self,
        file_name: Option<String>,
        force: bool,
    ) -> Result<Outcome, CoreError> {
        let state = self.state.as_ref().ok_or(CoreError::NoState)?;
        let file_name = file_name.unwrap_or_else(default_export_name);
        let path = self.config.export_dir.join(file_name);

        if self.files.exists(&path) && !force {
            return Ok(Outcome::confirmation(
                format!("{} already exists; confirm to overwrite", path.display()),
                path,
            ));
        }

        let pretty = serialize_state(state, true)?;
        self.files.write(&path, &pretty)?;
        info!(path = %path.display(), "exported state");
        Ok(
            Outcome::success(format!("exported state to {}", path.display()))
                .with_path(path),
        )
    }
}

/// Allocate a relation id: wall-clock milliseconds, bumped past the
/// largest existing id so two relations created in the same tick can
/// never collide.
fn next_relation_id(state: &SystemState) -> RelationId {
    let now = chrono::Utc::now().timestamp_millis();
    RelationId::new(now.max(state.max_relation_id() + 1))
}

/// Time-stamped file name used when opcode 305 is given no explicit name.
fn default_export_name() -> String {
    chrono::Utc::now()
        .format("lexicon-export-%Y%m%d-%H%M%S.json")
        .to_string()
}
