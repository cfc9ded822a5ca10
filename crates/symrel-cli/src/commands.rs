//! Command handlers: wire CLI arguments onto the instruction machine.

use anyhow::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use tracing::debug;

use symrel_core::{
    DialogPresenter, Instruction, Machine, MachineConfig, Outcome, run_confirmed,
};
use symrel_model::RelationId;
use symrel_store::{DirKvStore, DiskFileStore};

use crate::cli::{
    Cli, Command, CompareArgs, ExportArgs, GenerateArgs, ImportArgs, RelationCommand, SaveArgs,
};
use crate::dialog::ConsoleDialog;

/// Run the parsed command; returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let export_dir = cli
        .export_dir
        .clone()
        .unwrap_or_else(|| cli.state_dir.join("exports"));
    let config = MachineConfig::default().with_export_dir(export_dir);
    let mut machine = Machine::new(
        Box::new(DirKvStore::new(&cli.state_dir)),
        Box::new(DiskFileStore),
        config,
    );
    let dialogs = ConsoleDialog::new(cli.assume_yes);

    // Every run starts by adopting the persisted session (or defaults).
    let init = machine.dispatch(Instruction::InitState {
        path: None,
        restore: true,
    });
    debug!(message = init.message.as_deref().unwrap_or(""), "init");

    let code = match cli.command {
        Command::Generate(args) => run_generate(&mut machine, &dialogs, &args),
        Command::Tokens => run_tokens(&machine, &dialogs),
        Command::Relations => run_relations(&machine, &dialogs),
        Command::Relation(command) => run_relation(&mut machine, &dialogs, command),
        Command::Compare(args) => run_compare(&mut machine, &dialogs, &args),
        Command::Save(args) => run_save(&mut machine, &dialogs, &args),
        Command::Import(args) => run_import(&mut machine, &dialogs, &args),
        Command::Export(args) => run_export(&mut machine, &dialogs, &args),
        Command::Reset => run_reset(&mut machine, &dialogs),
    };
    Ok(code)
}

fn run_generate(machine: &mut Machine, dialogs: &ConsoleDialog, args: &GenerateArgs) -> i32 {
    let outcome = run_confirmed(
        machine,
        Instruction::GenerateTokens {
            alphabet: args.alphabet.clone(),
            max_length: args.max_length,
            force: args.force,
        },
        dialogs,
    );
    finish_mutation(machine, dialogs, outcome)
}

fn run_tokens(machine: &Machine, dialogs: &ConsoleDialog) -> i32 {
    let Some(state) = machine.state() else {
        dialogs.notify("no state loaded");
        return 1;
    };
    dialogs.notify(&format!(
        "lexicon: alphabet \"{}\", max length {}, {} tokens",
        state.lexicon.alphabet(),
        state.lexicon.max_length(),
        state.tokens.len()
    ));
    let mut table = new_table(vec!["#", "Token", "Length"]);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (index, token) in state.tokens.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            token.clone(),
            token.chars().count().to_string(),
        ]);
    }
    println!("{table}");
    0
}

fn run_relations(machine: &Machine, dialogs: &ConsoleDialog) -> i32 {
    let Some(state) = machine.state() else {
        dialogs.notify("no state loaded");
        return 1;
    };
    let mut table = new_table(vec!["Id", "Name", "Definition"]);
    align_column(&mut table, 0, CellAlignment::Right);
    for relation in &state.relations {
        table.add_row(vec![
            relation.id.to_string(),
            relation.name.clone(),
            relation.body.clone(),
        ]);
    }
    println!("{table}");
    0
}

fn run_relation(
    machine: &mut Machine,
    dialogs: &ConsoleDialog,
    command: RelationCommand,
) -> i32 {
    let outcome = match command {
        RelationCommand::Add { name, definition } => {
            let definition = match definition {
                Some(definition) => definition,
                None => match dialogs.prompt("Definition", "tokenA == tokenB") {
                    Some(definition) => definition,
                    None => {
                        dialogs.notify("cancelled");
                        return 1;
                    }
                },
            };
            machine.dispatch(Instruction::UpsertRelation {
                id: None,
                name,
                definition,
            })
        }
        RelationCommand::Edit {
            id,
            name,
            definition,
        } => machine.dispatch(Instruction::UpsertRelation {
            id: Some(RelationId::new(id)),
            name,
            definition,
        }),
        RelationCommand::Delete { id } => {
            if !dialogs.confirm(&format!("Delete relation {id}?")) {
                dialogs.notify("cancelled");
                return 1;
            }
            machine.dispatch(Instruction::DeleteRelation {
                id: RelationId::new(id),
            })
        }
    };
    finish_mutation(machine, dialogs, outcome)
}

fn run_compare(machine: &mut Machine, dialogs: &ConsoleDialog, args: &CompareArgs) -> i32 {
    let outcome = machine.dispatch(Instruction::CompareTokens {
        token_a: args.token_a.clone(),
        token_b: args.token_b.clone(),
        relation_id: RelationId::new(args.relation_id),
    });
    finish(dialogs, outcome)
}

fn run_save(machine: &mut Machine, dialogs: &ConsoleDialog, args: &SaveArgs) -> i32 {
    let outcome = machine.dispatch(Instruction::SaveState {
        path: args.path.clone(),
    });
    finish(dialogs, outcome)
}

fn run_import(machine: &mut Machine, dialogs: &ConsoleDialog, args: &ImportArgs) -> i32 {
    let outcome = machine.dispatch(Instruction::ImportState {
        path: args.file.clone(),
    });
    finish(dialogs, outcome)
}

fn run_export(machine: &mut Machine, dialogs: &ConsoleDialog, args: &ExportArgs) -> i32 {
    let outcome = run_confirmed(
        machine,
        Instruction::ExportState {
            file_name: args.file_name.clone(),
            force: args.force,
        },
        dialogs,
    );
    finish(dialogs, outcome)
}

fn run_reset(machine: &mut Machine, dialogs: &ConsoleDialog) -> i32 {
    if !dialogs.confirm("Discard the current state and restore defaults?") {
        dialogs.notify("cancelled");
        return 1;
    }
    let outcome = machine.dispatch(Instruction::InitState {
        path: None,
        restore: false,
    });
    finish_mutation(machine, dialogs, outcome)
}

/// Report an outcome and, when it succeeded, persist the mutated state.
fn finish_mutation(machine: &mut Machine, dialogs: &ConsoleDialog, outcome: Outcome) -> i32 {
    if outcome.success {
        let saved = machine.dispatch(Instruction::SaveState { path: None });
        if !saved.success {
            if let Some(message) = &saved.message {
                dialogs.notify(message);
            }
            return 1;
        }
    }
    finish(dialogs, outcome)
}

fn finish(dialogs: &ConsoleDialog, outcome: Outcome) -> i32 {
    if let Some(message) = &outcome.message {
        dialogs.notify(message);
    }
    if outcome.success { 0 } else { 1 }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_header(header);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
