//! Interactive confirmation workflows.
//!
//! Two operations can pause for user input: generation past the token
//! threshold and export over an existing file. Both are expressed as one
//! explicit continuation: dispatch, ask, re-dispatch with `force`.
//! Declining leaves state untouched, because the first dispatch already
//! returned without mutating anything.

use tracing::debug;

use crate::instruction::Instruction;
use crate::machine::Machine;
use crate::outcome::Outcome;

/// Dialog collaborator the workflows talk to.
///
/// The console implements this in the CLI; tests script it.
pub trait DialogPresenter {
    fn notify(&self, text: &str);
    fn confirm(&self, text: &str) -> bool;
    /// Ask for a line of input; `None` means cancelled.
    fn prompt(&self, text: &str, default: &str) -> Option<String>;
}

/// Dispatch an instruction, driving its confirmation step if it has one.
///
/// When the outcome carries `warning` or `require_confirmation`, the
/// user is asked to confirm with the outcome's message; on yes the same
/// instruction is re-dispatched with `force` set, on no the original
/// (unapplied) outcome is returned as-is.
pub fn run_confirmed(
    machine: &mut Machine,
    instruction: Instruction,
    dialogs: &dyn DialogPresenter,
) -> Outcome {
    let outcome = machine.dispatch(instruction.clone());
    if outcome.success || !(outcome.warning || outcome.require_confirmation) {
        return outcome;
    }

    let question = outcome
        .message
        .clone()
        .unwrap_or_else(|| "confirm to proceed".to_string());
    if !dialogs.confirm(&question) {
        debug!("confirmation declined, aborting");
        return outcome;
    }
    machine.dispatch(instruction.with_force())
}
