//! Document-to-schema extraction.
//!
//! The extractor walks the document blocks once, keeping a [`HeadingContext`] of the
//! enclosing headings and the paragraphs written under the current heading. Every
//! table met under a heading is a candidate schema table: its name comes from the
//! current heading, its primary key from the first body paragraph under that heading
//! carrying the primary-key marker.
use crate::document::iter_blocks;
use crate::document::Block;
use crate::document::Document;
use crate::document::Heading;
use crate::document::Paragraph;
use crate::document::Scope;
use crate::document::Table;
use crate::error::DocxDdlError;
use crate::schema::converter::convert_table;
use crate::schema::diagnostics::Diagnostic;
use crate::schema::diagnostics::Diagnostics;
use crate::schema::options::ExtractOptions;
use crate::schema::options::MissingPrimaryKey;
use crate::schema::SchemaMap;
use crate::schema::TableSchema;

/// Separator between outline numbering and the table name in a heading
const NAME_SEPARATOR: char = '/';
/// Full-width parenthesis opening the display name after the table name
const DISPLAY_NAME_OPENING: char = '（';
/// Separator between annotation prose and the primary-key column list
const PRIMARY_KEY_SEPARATOR: char = '+';
/// Separators between primary-key columns
const PRIMARY_KEY_COLUMN_SEPARATORS: [char; 5] = [',', '，', '、', ';', '；'];

/// Whether any heading has been seen yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Tables are not schema-relevant
    NoHeadingSeen,
    /// Tables are candidate schema tables
    InHeading,
}

/// Position in the document outline.
#[derive(Clone, Debug)]
pub struct HeadingContext {
    mode: Mode,
    /// Enclosing headings, outermost first, levels strictly increasing
    headings: Vec<Heading>,
    /// Paragraphs after the innermost heading
    paragraphs: Vec<Paragraph>,
    current_level: usize,
}

impl Default for HeadingContext {
    fn default() -> Self {
        HeadingContext {
            mode: Mode::NoHeadingSeen,
            headings: Vec::new(),
            paragraphs: Vec::new(),
            current_level: 0,
        }
    }
}

impl HeadingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Level of the most recent heading, 0 before any heading
    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// The most recent heading
    pub fn current_heading(&self) -> Option<&Heading> {
        self.headings.last()
    }

    /// Number of context entries, headings and paragraphs together.
    pub fn len(&self) -> usize {
        self.headings.len() + self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enters a heading: drops every heading at the same or a deeper level together
    /// with the paragraphs under it, then makes `heading` the innermost entry.
    pub fn enter_heading(&mut self, heading: &Heading) {
        self.headings.retain(|outer| outer.level < heading.level);
        self.headings.push(heading.clone());
        self.paragraphs.clear();
        self.current_level = heading.level;
        self.mode = Mode::InHeading;
        tracing::debug!(level = heading.level, text = %heading.text, depth = self.headings.len(), "entered heading");
    }

    /// Records a plain paragraph under the current heading; ignored before any heading.
    pub fn push_paragraph(&mut self, paragraph: &Paragraph) {
        if self.mode == Mode::InHeading {
            self.paragraphs.push(paragraph.clone());
        }
    }

    /// First body-style paragraph under the current heading that carries the marker.
    pub fn primary_key_annotation(&self, options: &ExtractOptions) -> Option<&Paragraph> {
        self.paragraphs.iter().find(|paragraph| {
            paragraph.style == options.body_style && paragraph.text.contains(&options.primary_key_marker)
        })
    }

    /// Concatenated text of all entries, for diagnostics
    fn describe(&self) -> String {
        self.headings
            .iter()
            .map(|heading| heading.text.as_str())
            .chain(self.paragraphs.iter().map(|paragraph| paragraph.text.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Derives a table name from heading text.
///
/// Takes the text after the last `/`, cuts it at the first `（` and lower-cases the
/// trimmed remainder: `1.2 / Users（用户表）` becomes `users`.
pub fn derive_table_name(heading: &str) -> String {
    let name = heading.rsplit(NAME_SEPARATOR).next().unwrap_or_default();
    let name = name.split(DISPLAY_NAME_OPENING).next().unwrap_or_default();
    name.trim().to_lowercase()
}

/// Parses the primary-key columns of an annotation paragraph.
///
/// The column list follows the last `+`. Columns are separated by commas, semicolons
/// or `、`; a column written as `显示名/name` contributes the part after the last `/`.
pub fn parse_primary_key_columns(annotation: &str) -> Vec<String> {
    let columns = annotation.rsplit(PRIMARY_KEY_SEPARATOR).next().unwrap_or_default();
    columns
        .split(PRIMARY_KEY_COLUMN_SEPARATORS)
        .filter_map(|column| column.rsplit(NAME_SEPARATOR).next())
        .map(|column| column.trim().to_lowercase())
        .filter(|column| !column.is_empty())
        .collect()
}

/// Walks document blocks and builds the schema map.
pub struct Extractor<'a> {
    options: &'a ExtractOptions,
    diagnostics: &'a mut dyn Diagnostics,
}

impl<'a> Extractor<'a> {
    pub fn new(options: &'a ExtractOptions, diagnostics: &'a mut dyn Diagnostics) -> Self {
        Extractor { options, diagnostics }
    }

    /// Extracts the schema of a whole document.
    pub fn extract_document(&mut self, document: &Document) -> Result<SchemaMap, DocxDdlError> {
        self.extract(iter_blocks(Scope::Document(document))?)
    }

    /// Extracts the schema from blocks in document order.
    ///
    /// Each call starts from an empty heading context.
    ///
    /// # Errors
    ///
    /// A malformed table row aborts the whole extraction; no partial schema is returned.
    pub fn extract<'b, I>(&mut self, blocks: I) -> Result<SchemaMap, DocxDdlError>
    where
        I: IntoIterator<Item = &'b Block>,
    {
        let mut context = HeadingContext::new();
        let mut schema = SchemaMap::new();
        for block in blocks {
            match block {
                Block::Heading(heading) => context.enter_heading(heading),
                Block::Paragraph(paragraph) => context.push_paragraph(paragraph),
                Block::Table(table) => self.visit_table(&context, table, &mut schema)?,
            }
        }
        Ok(schema)
    }

    fn visit_table(
        &mut self,
        context: &HeadingContext,
        table: &Table,
        schema: &mut SchemaMap,
    ) -> Result<(), DocxDdlError> {
        let heading = match (context.mode(), context.current_heading()) {
            (Mode::InHeading, Some(heading)) => heading,
            _ => return Ok(()),
        };

        let table_name = derive_table_name(&heading.text);
        if table_name.is_empty() {
            self.diagnostics.report(Diagnostic::EmptyTableName {
                context: context.describe(),
            });
        }
        if !self.options.accept(&table_name) {
            self.diagnostics.report(Diagnostic::FilteredTable { table: table_name });
            return Ok(());
        }

        let structure = convert_table(table, &table_name, self.diagnostics)?;

        let pk_columns = match context.primary_key_annotation(self.options) {
            Some(annotation) => parse_primary_key_columns(&annotation.text),
            None => {
                self.diagnostics.report(Diagnostic::MissingPrimaryKey {
                    table: table_name.clone(),
                });
                match self.options.missing_primary_key {
                    MissingPrimaryKey::Exclude => return Ok(()),
                    MissingPrimaryKey::KeepWithoutConstraint => Vec::new(),
                }
            }
        };

        tracing::debug!(table = %table_name, columns = structure.len(), pk = ?pk_columns, "extracted table");
        let replaced = schema.insert(table_name.clone(), TableSchema { structure, pk_columns });
        if replaced.is_some() {
            self.diagnostics.report(Diagnostic::DuplicateTable { table: table_name });
        }
        Ok(())
    }
}
