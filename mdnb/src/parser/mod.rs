pub mod scanner;

use tracing::debug;

use crate::cell::{Cell, DEFAULT_LANGUAGE};
use crate::document::Document;
use crate::parser::scanner::{Scanner, SegmentKind};

/// Parse markdown source into cells.
///
/// Text between fences becomes prose unless it is empty or whitespace only.
/// Each fence becomes a code cell whose body loses exactly one trailing
/// newline. Never returns an empty document.
pub fn parse(source: &str) -> Document {
    let mut cells = Vec::new();

    for segment in Scanner::new(source) {
        match segment.kind {
            SegmentKind::Text => {
                let text = &source[segment.span];
                if !text.trim().is_empty() {
                    cells.push(Cell::prose(text));
                }
            }
            SegmentKind::Fence { tag, body } => {
                let content = body.strip_suffix('\n').unwrap_or(body);
                cells.push(Cell::code(tag.unwrap_or(DEFAULT_LANGUAGE), content));
            }
        }
    }

    if cells.is_empty() {
        return Document::blank();
    }

    debug!(cells = cells.len(), bytes = source.len(), "parsed document");
    Document::new(cells)
}
