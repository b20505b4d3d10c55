use serde::{Deserialize, Serialize};

/// Language assigned to fenced blocks that carry no tag.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Prose,
    Code,
}

/// One editable unit of a notebook document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Cell {
    /// A literal slice of markdown between fences.
    Prose { content: String },
    /// The body of a fenced block, without delimiters or tag.
    Code { language: String, content: String },
}

impl Cell {
    pub fn prose(content: impl Into<String>) -> Self {
        Cell::Prose {
            content: content.into(),
        }
    }

    pub fn code(language: impl Into<String>, content: impl Into<String>) -> Self {
        Cell::Code {
            language: language.into(),
            content: content.into(),
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Prose { .. } => CellKind::Prose,
            Cell::Code { .. } => CellKind::Code,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Cell::Prose { content } | Cell::Code { content, .. } => content,
        }
    }

    /// The language tag of a code cell. An empty tag reads as `plaintext`.
    /// Prose cells have no language.
    pub fn language(&self) -> Option<&str> {
        match self {
            Cell::Prose { .. } => None,
            Cell::Code { language, .. } if language.is_empty() => Some(DEFAULT_LANGUAGE),
            Cell::Code { language, .. } => Some(language),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Cell::Code { .. })
    }

    /// Whether the rendered cell ends in a newline. Code cells end in a fence.
    pub fn ends_with_newline(&self) -> bool {
        matches!(self, Cell::Prose { content } if content.ends_with('\n'))
    }

    /// Whether the rendered cell starts with a newline. Code cells start with a fence.
    pub fn starts_with_newline(&self) -> bool {
        matches!(self, Cell::Prose { content } if content.starts_with('\n'))
    }

    /// True for prose that would be dropped by the next parse.
    pub fn is_blank_prose(&self) -> bool {
        matches!(self, Cell::Prose { content } if content.trim().is_empty())
    }
}
