//! Property tests for the parse/serialize laws.

use mdnb::{Cell, Document, parse, serialize};
use proptest::prelude::*;

fn language() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,10}"
}

/// Code bodies that cannot contain a closing fence.
fn code() -> impl Strategy<Value = Cell> {
    (language(), "[a-z0-9 =;\n]{0,30}").prop_map(|(l, c)| Cell::code(l, c))
}

/// Text with at least one visible character and no backticks.
fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z #*\n]{0,20}[a-zA-Z#*][a-zA-Z #*\n]{0,20}"
}

/// Documents shaped like parser output: prose next to a fence keeps the
/// newline that separates it from the fence.
fn parsed_shape() -> impl Strategy<Value = Document> {
    (
        prop::collection::vec((prop::option::of(text()), code()), 1..6),
        prop::option::of(text()),
    )
        .prop_map(|(blocks, tail)| {
            let mut cells = Vec::new();
            for (gap, code) in blocks {
                if let Some(gap) = gap {
                    let lead = if cells.is_empty() { "" } else { "\n" };
                    cells.push(Cell::prose(format!("{lead}{gap}\n")));
                }
                cells.push(code);
            }
            if let Some(tail) = tail {
                cells.push(Cell::prose(format!("\n{tail}")));
            }
            Document::new(cells)
        })
}

/// Arbitrary cells without blank prose.
fn visible_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![text().prop_map(Cell::prose), code()]
}

/// Arbitrary cells, blank prose included.
fn any_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![visible_cell(), "[ \n\t]{0,5}".prop_map(Cell::prose)]
}

proptest! {
    #[test]
    fn parse_inverts_serialize(doc in parsed_shape()) {
        prop_assert_eq!(parse(&serialize(&doc)), doc);
    }

    #[test]
    fn reserialization_is_idempotent(cells in prop::collection::vec(visible_cell(), 0..8)) {
        let once = serialize(&Document::new(cells));
        prop_assert_eq!(serialize(&parse(&once)), once);
    }

    #[test]
    fn blank_prose_collapse_settles_after_one_pass(cells in prop::collection::vec(any_cell(), 0..8)) {
        let first = serialize(&parse(&serialize(&Document::new(cells))));
        prop_assert_eq!(serialize(&parse(&first)), first);
    }

    #[test]
    fn parse_never_returns_empty(source in "[a-z`\n ]{0,40}") {
        prop_assert!(!parse(&source).is_empty());
    }
}
