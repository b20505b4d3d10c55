use std::io::Write;

use mdnb::Document;
use tracing::debug;

use crate::action::{ActionMap, ActionResult, run_action};
use crate::error::RunError;

/// Run the action for every code cell, writing each payload to `output`.
/// Payloads are separated by a blank line.
pub fn execute_document(
    document: &Document,
    actions: &ActionMap,
    output: &mut dyn Write,
) -> Result<Vec<ActionResult>, RunError> {
    let indices: Vec<usize> = document.code_cells().map(|(i, _)| i).collect();
    execute_cells(document, &indices, actions, output)
}

/// Run the action for the code cells at `indices`, in the given order.
pub fn execute_cells(
    document: &Document,
    indices: &[usize],
    actions: &ActionMap,
    output: &mut dyn Write,
) -> Result<Vec<ActionResult>, RunError> {
    let mut results = Vec::with_capacity(indices.len());

    for &index in indices {
        let cell = document.get(index).ok_or(RunError::CellOutOfRange {
            index,
            len: document.len(),
        })?;
        if !cell.is_code() {
            return Err(RunError::NotCode(index));
        }

        let result = run_action(cell, actions);
        if !results.is_empty() {
            writeln!(output)?;
        }
        writeln!(output, "{}", result.text)?;
        results.push(result);
    }

    debug!(actions = results.len(), "executed cells");
    Ok(results)
}
