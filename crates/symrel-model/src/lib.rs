//! Data model for the Symbol Relation Workbench.
//!
//! Defines the lexicon configuration, relation definitions, and the single
//! mutable [`SystemState`] aggregate that the instruction core owns.

pub mod error;
pub mod ids;
pub mod lexicon;
pub mod relation;
pub mod state;

pub use error::{ModelError, Result};
pub use ids::RelationId;
pub use lexicon::LexiconConfig;
pub use relation::{RelationDefinition, normalize_name};
pub use state::SystemState;
