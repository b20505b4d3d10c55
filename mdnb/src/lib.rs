pub mod cell;
pub mod document;
pub mod lint;
pub mod parser;
pub mod serializer;

pub use cell::{Cell, CellKind, DEFAULT_LANGUAGE};
pub use document::Document;
pub use parser::parse;
pub use serializer::serialize;
