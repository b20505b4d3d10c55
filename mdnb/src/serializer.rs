use crate::document::Document;

/// Render cells back to markdown source.
///
/// Prose is written verbatim; code is wrapped in a fence tagged with its
/// language. Cells are separated by exactly one newline.
pub fn serialize(document: &Document) -> String {
    document.to_string()
}

/// True when `source` is already in the form `serialize` would produce for it.
pub fn is_canonical(source: &str) -> bool {
    serialize(&crate::parser::parse(source)) == source
}
