use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, DEFAULT_LANGUAGE};

/// An ordered sequence of cells, top to bottom as they appear in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    cells: Vec<Cell>,
}

impl Document {
    pub fn new(cells: Vec<Cell>) -> Self {
        Document { cells }
    }

    /// The document produced for input with no content: a single empty prose cell.
    pub fn blank() -> Self {
        Document {
            cells: vec![Cell::prose("")],
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Code cells paired with their index in the document.
    pub fn code_cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().enumerate().filter(|(_, c)| c.is_code())
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

impl From<Vec<Cell>> for Document {
    fn from(cells: Vec<Cell>) -> Self {
        Document { cells }
    }
}

impl FromIterator<Cell> for Document {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Document {
            cells: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = Cell;
    type IntoIter = std::vec::IntoIter<Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// Renders the markdown source. Neighbouring cells are separated by a single
/// newline; the separator is omitted when the boundary already has one, which
/// is the newline the parser leaves in prose next to a fence.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut previous: Option<&Cell> = None;
        for cell in &self.cells {
            if let Some(previous) = previous {
                if !previous.ends_with_newline() && !cell.starts_with_newline() {
                    writeln!(f)?;
                }
            }
            write!(f, "{}", cell)?;
            previous = Some(cell);
        }
        Ok(())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Prose { content } => write!(f, "{}", content),
            Cell::Code { language, content } => {
                let language = if language.is_empty() {
                    DEFAULT_LANGUAGE
                } else {
                    language
                };
                write!(f, "```{}\n{}\n```", language, content)
            }
        }
    }
}
