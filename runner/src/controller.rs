//! Host-facing wiring: the controller a notebook host drives to show run
//! buttons on code cells and to execute them.

use mdnb::Cell;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::action::{MARKUP_LANGUAGE, resolve_label, run_action};
use crate::config::Settings;

pub const NOTEBOOK_TYPE: &str = "mdnb";
pub const CONTROLLER_ID: &str = "mdnb-controller";
pub const CONTROLLER_LABEL: &str = "MDNB Custom Actions";
pub const RUN_LANGUAGE_ACTION_COMMAND: &str = "mdnb.runLanguageAction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub id: &'static str,
    pub title: String,
}

/// A button shown in a code cell's status bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusItem {
    pub text: String,
    pub alignment: Alignment,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellOutput {
    pub mime: &'static str,
    pub text: String,
}

/// The record of one cell run. Its outputs replace whatever the cell showed before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellExecution {
    /// 1-based, increasing across the controller's lifetime.
    pub order: u32,
    pub language: String,
    pub outputs: Vec<CellOutput>,
    pub success: bool,
}

/// Explicit context handle for the host integration, created by
/// [`Controller::activate`] and torn down by [`Controller::deactivate`].
#[derive(Debug)]
pub struct Controller {
    settings: Settings,
    execution_order: u32,
}

impl Controller {
    pub fn activate(settings: Settings) -> Self {
        info!(
            notebook_type = NOTEBOOK_TYPE,
            controller = CONTROLLER_ID,
            actions = settings.language_actions.len(),
            "controller activated"
        );
        Controller {
            settings,
            execution_order: 0,
        }
    }

    pub fn deactivate(self) {
        info!(
            controller = CONTROLLER_ID,
            executions = self.execution_order,
            "controller deactivated"
        );
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap in freshly loaded settings; later labels and runs use them.
    pub fn reconfigure(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn supports(&self, language: &str) -> bool {
        self.settings
            .supported_languages
            .iter()
            .any(|l| l == language)
    }

    pub fn status_item(&self, cell: &Cell) -> Option<StatusItem> {
        let language = cell.language()?;
        let label = resolve_label(&self.settings.language_actions, language);
        Some(StatusItem {
            text: label.clone(),
            alignment: Alignment::Right,
            command: Command {
                id: RUN_LANGUAGE_ACTION_COMMAND,
                title: label,
            },
        })
    }

    pub fn execute<'a>(&mut self, cells: impl IntoIterator<Item = &'a Cell>) -> Vec<CellExecution> {
        cells.into_iter().map(|cell| self.execute_one(cell)).collect()
    }

    /// The run command bound to status items. Does nothing without a cell.
    pub fn run_command(&mut self, cell: Option<&Cell>) -> Option<CellExecution> {
        cell.map(|cell| self.execute_one(cell))
    }

    fn execute_one(&mut self, cell: &Cell) -> CellExecution {
        let language = cell.language().unwrap_or(MARKUP_LANGUAGE);
        if !self.supports(language) {
            warn!(language, "language is not in supported_languages");
        }

        self.execution_order += 1;
        let result = run_action(cell, &self.settings.language_actions);
        debug!(order = self.execution_order, language, "cell executed");

        CellExecution {
            order: self.execution_order,
            language: result.language,
            outputs: vec![CellOutput {
                mime: "text/plain",
                text: result.text,
            }],
            success: true,
        }
    }
}
