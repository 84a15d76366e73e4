//! # Document Block Model
//!
//! A decoded document is an ordered tree of blocks: headings, plain paragraphs and
//! tables whose cells hold blocks of their own. The [`iter_blocks`] function walks
//! one scope of that tree (the whole document, a row or a cell) in document order.
use thiserror::Error;

pub mod docx;
pub mod style;

/// Errors raised while decoding or traversing a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Block iteration was requested over something that is not a block container
    #[error("Unsupported block scope '{0}', expected a document, row or cell")]
    UnsupportedScope(&'static str),

    /// A heading style without a trailing level number
    #[error("Cannot derive heading level from style '{0}'")]
    InvalidHeadingLevel(String),

    /// A required package part is absent
    #[error("Missing package part '{0}'")]
    MissingPart(String),
}

/// Paragraph styled with a heading style.
#[derive(Clone, Debug, PartialEq)]
pub struct Heading {
    /// Outline level, 1-based
    pub level: usize,
    pub text: String,
    /// UI style name, e.g. `Heading 2`
    pub style: String,
}

/// Any paragraph that is not a heading.
#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    /// UI style name, e.g. `Normal`
    pub style: String,
    pub text: String,
}

/// Simple table; the first row is conventionally a header row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

/// Table cell, itself a container of blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub blocks: Vec<Block>,
}

/// One unit of document content in document order.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Heading(Heading),
    Paragraph(Paragraph),
    Table(Table),
}

/// Decoded document body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Heading {
    pub fn new(level: usize, text: &str) -> Self {
        Heading {
            level,
            text: text.to_owned(),
            style: format!("Heading {level}"),
        }
    }
}

impl Paragraph {
    pub fn new(style: &str, text: &str) -> Self {
        Paragraph {
            style: style.to_owned(),
            text: text.to_owned(),
        }
    }
}

impl Cell {
    /// Builds a cell holding a single `Normal` paragraph.
    pub fn from_text(text: &str) -> Self {
        Cell {
            blocks: vec![Block::Paragraph(Paragraph::new(style::NORMAL_STYLE, text))],
        }
    }

    /// Text of the cell's own paragraphs joined by newlines; nested tables contribute nothing.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading(heading) => Some(heading.text.as_str()),
                Block::Paragraph(paragraph) => Some(paragraph.text.as_str()),
                Block::Table(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Row {
    pub fn texts(&self) -> Vec<String> {
        self.cells.iter().map(Cell::text).collect()
    }
}

impl Table {
    /// Builds a table from rows of plain cell texts.
    pub fn from_texts<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|cells| Row {
                cells: cells
                    .into_iter()
                    .map(|text| Cell::from_text(text.as_ref()))
                    .collect(),
            })
            .collect();
        Table { rows }
    }
}

/// Handle on a part of the document tree that blocks may be requested from.
#[derive(Copy, Clone, Debug)]
pub enum Scope<'a> {
    Document(&'a Document),
    Row(&'a Row),
    Cell(&'a Cell),
    Table(&'a Table),
    Paragraph(&'a Paragraph),
}

impl Scope<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Scope::Document(_) => "document",
            Scope::Row(_) => "row",
            Scope::Cell(_) => "cell",
            Scope::Table(_) => "table",
            Scope::Paragraph(_) => "paragraph",
        }
    }
}

/// Lazy iterator over the blocks of one scope.
pub struct Blocks<'a> {
    inner: Box<dyn Iterator<Item = &'a Block> + 'a>,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Iterates the blocks of `scope` in document order.
///
/// A row yields the blocks of each of its cells in turn. Every call starts a fresh
/// traversal, so the same scope can be walked any number of times.
///
/// # Errors
///
/// Returns [`DocumentError::UnsupportedScope`] for tables and paragraphs, which are
/// blocks rather than block containers.
pub fn iter_blocks<'a>(scope: Scope<'a>) -> Result<Blocks<'a>, DocumentError> {
    let inner: Box<dyn Iterator<Item = &'a Block> + 'a> = match scope {
        Scope::Document(document) => Box::new(document.blocks.iter()),
        Scope::Cell(cell) => Box::new(cell.blocks.iter()),
        Scope::Row(row) => Box::new(row.cells.iter().flat_map(|cell| cell.blocks.iter())),
        Scope::Table(_) | Scope::Paragraph(_) => {
            return Err(DocumentError::UnsupportedScope(scope.kind()))
        }
    };
    Ok(Blocks { inner })
}
