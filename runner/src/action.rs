use std::collections::BTreeMap;

use mdnb::{Cell, DEFAULT_LANGUAGE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Language id hosts give to prose cells.
pub const MARKUP_LANGUAGE: &str = "markdown";

/// Separates the label from the echoed cell text in an action payload.
pub const CONTENT_SEPARATOR: &str = "\n\nCell content:\n";

/// Display labels keyed by language tag, as supplied by configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionMap(BTreeMap<String, String>);

impl ActionMap {
    pub fn new() -> Self {
        ActionMap(BTreeMap::new())
    }

    pub fn insert(&mut self, language: impl Into<String>, label: impl Into<String>) {
        self.0.insert(language.into(), label.into());
    }

    /// The configured label for `language`. Empty labels count as unset.
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0
            .get(language)
            .map(String::as_str)
            .filter(|label| !label.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ActionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ActionMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// What an action produced for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub language: String,
    pub label: String,
    /// `"{label}\n\nCell content:\n{cell text}"`.
    pub text: String,
}

/// Label for the action bound to `language`, or `Run {language} action`.
pub fn resolve_label(actions: &ActionMap, language: &str) -> String {
    match actions.get(language) {
        Some(label) => label.to_string(),
        None => format!("Run {} action", language),
    }
}

/// Run the action for a cell. Code cells use their language tag; prose cells
/// use the markup language id.
pub fn run_action(cell: &Cell, actions: &ActionMap) -> ActionResult {
    let language = cell.language().unwrap_or(MARKUP_LANGUAGE);
    run_language_action(language, cell.content(), actions)
}

/// Run the action for a `(language, text)` pair. An empty language is
/// treated as `plaintext`.
pub fn run_language_action(language: &str, text: &str, actions: &ActionMap) -> ActionResult {
    let language = if language.is_empty() {
        DEFAULT_LANGUAGE
    } else {
        language
    };
    let label = resolve_label(actions, language);
    debug!(language, label = %label, bytes = text.len(), "running action");

    ActionResult {
        language: language.to_string(),
        text: format!("{}{}{}", label, CONTENT_SEPARATOR, text),
        label,
    }
}
