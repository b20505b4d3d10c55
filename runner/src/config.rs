use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::action::ActionMap;
use crate::error::ConfigError;

/// Settings file looked up next to a document.
pub const SETTINGS_FILE: &str = "mdnb.toml";

/// Host settings: action labels and the languages the controller offers to run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Language tag → action label.
    #[serde(default)]
    pub language_actions: ActionMap,

    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,
}

fn default_supported_languages() -> Vec<String> {
    ["javascript", "python", "sql", "plaintext"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            language_actions: ActionMap::new(),
            supported_languages: default_supported_languages(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load `mdnb.toml` from the document's directory, or fall back to defaults.
    pub fn discover(document: &Path) -> Result<Self, ConfigError> {
        let dir = document
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Settings::default())
        }
    }
}
