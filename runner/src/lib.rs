pub mod action;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;

pub use action::{ActionMap, ActionResult, resolve_label, run_action};
pub use config::Settings;
pub use controller::Controller;
pub use error::{ConfigError, RunError};
pub use executor::{execute_cells, execute_document};
