//! CLI argument definitions for the workbench.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "symrel",
    version,
    about = "Symbol Relation Workbench - token lexicons and pairwise relations",
    long_about = "Define a token vocabulary over an alphabet, author named binary\n\
                  relations as predicate expressions, and evaluate them against\n\
                  token pairs. State persists between runs in the state directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the persisted session state.
    #[arg(long = "state-dir", value_name = "DIR", default_value = ".symrel", global = true)]
    pub state_dir: PathBuf,

    /// Directory exports are written to (default: <STATE_DIR>/exports).
    #[arg(long = "export-dir", value_name = "DIR", global = true)]
    pub export_dir: Option<PathBuf>,

    /// Answer yes to every confirmation prompt.
    #[arg(long = "yes", short = 'y', global = true)]
    pub assume_yes: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Regenerate the token vocabulary from an alphabet.
    Generate(GenerateArgs),

    /// List the generated tokens.
    Tokens,

    /// List the relation definitions.
    Relations,

    /// Manage relation definitions.
    #[command(subcommand)]
    Relation(RelationCommand),

    /// Evaluate a relation against a token pair.
    Compare(CompareArgs),

    /// Persist the session state, optionally to a file as well.
    Save(SaveArgs),

    /// Replace the state with a snapshot file.
    Import(ImportArgs),

    /// Write a snapshot into the export directory.
    Export(ExportArgs),

    /// Discard the state and start over from the default snapshot.
    Reset,
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Alphabet characters (duplicates removed, order preserved).
    #[arg(value_name = "ALPHABET")]
    pub alphabet: String,

    /// Maximum token length.
    #[arg(value_name = "MAX_LENGTH")]
    pub max_length: usize,

    /// Skip the large-vocabulary confirmation.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum RelationCommand {
    /// Add a relation; prompts for the definition when omitted.
    Add {
        #[arg(value_name = "NAME")]
        name: String,
        /// Predicate over tokenA and tokenB, e.g. "len(tokenA) == len(tokenB)".
        #[arg(value_name = "DEFINITION")]
        definition: Option<String>,
    },

    /// Replace an existing relation's name and definition.
    Edit {
        #[arg(value_name = "ID")]
        id: i64,
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "DEFINITION")]
        definition: String,
    },

    /// Delete a relation by id.
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },
}

#[derive(Parser)]
pub struct CompareArgs {
    #[arg(value_name = "TOKEN_A")]
    pub token_a: String,

    #[arg(value_name = "TOKEN_B")]
    pub token_b: String,

    /// Id of the relation to evaluate.
    #[arg(long = "relation", short = 'r', value_name = "ID")]
    pub relation_id: i64,
}

#[derive(Parser)]
pub struct SaveArgs {
    /// Also write a pretty-printed snapshot to this path.
    #[arg(long = "path", value_name = "FILE")]
    pub path: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Snapshot file to import.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Export file name (default: time-derived).
    #[arg(value_name = "FILE_NAME")]
    pub file_name: Option<String>,

    /// Overwrite an existing file without asking.
    #[arg(long = "force")]
    pub force: bool,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
