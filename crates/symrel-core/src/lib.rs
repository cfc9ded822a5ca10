//! Instruction-dispatch core for the Symbol Relation Workbench.
//!
//! A [`Machine`] owns the single mutable [`SystemState`] and exposes a
//! fixed, numbered operation set. All state mutation and computation goes
//! through [`Machine::dispatch`]; callers never touch the state directly.
//!
//! # Opcode surface
//!
//! | Opcode | Operation | Notes |
//! |--------|-----------|-------|
//! | 100 | init state | always succeeds, falls back to defaults |
//! | 101 | save state | fails if no state |
//! | 300 | generate tokens | may return a threshold warning |
//! | 301 | upsert relation | fails on duplicate/invalid |
//! | 302 | delete relation | fails if not found |
//! | 303 | compare tokens | returns the untyped predicate result |
//! | 304 | import state | validates snapshot shape |
//! | 305 | export state | may require overwrite confirmation |
//!
//! Every dispatch returns a uniform [`Outcome`]; failures surface as
//! `{ success: false, message }` rather than panics or propagated errors.
//!
//! [`SystemState`]: symrel_model::SystemState

pub mod error;
pub mod generator;
pub mod instruction;
pub mod machine;
pub mod outcome;
pub mod workflow;

pub use error::CoreError;
pub use generator::{GENERATION_WARNING_THRESHOLD, enumerate_tokens, total_token_count};
pub use instruction::Instruction;
pub use machine::{Machine, MachineConfig, STATE_KEY};
pub use outcome::Outcome;
pub use workflow::{DialogPresenter, run_confirmed};
