//! Data-quality diagnostics reported while extracting a schema.
//!
//! The extractor never prints; it hands every finding to a [`Diagnostics`] sink chosen
//! by the caller. [`LogDiagnostics`] forwards to `tracing`, and a `Vec<Diagnostic>`
//! collects findings for inspection.
use std::fmt;

/// A non-fatal finding about the authored schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// The heading above a table yields an empty table name; `context` is the heading context text
    EmptyTableName { context: String },
    /// A later row redefined a column; the later row wins
    DuplicateColumn { table: String, column: String },
    /// A data row without a column name was skipped
    BlankColumnName { table: String, row: usize },
    /// No primary-key annotation precedes the table
    MissingPrimaryKey { table: String },
    /// A later table derived the same name and replaced the earlier entry
    DuplicateTable { table: String },
    /// The table name did not match the configured name patterns
    FilteredTable { table: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyTableName { context } => {
                write!(f, "Empty table name derived from heading context '{context}'")
            }
            Diagnostic::DuplicateColumn { table, column } => {
                write!(f, "Column '{column}' of table '{table}' is defined more than once, keeping the last definition")
            }
            Diagnostic::BlankColumnName { table, row } => {
                write!(f, "Row {row} of table '{table}' has no column name and was skipped")
            }
            Diagnostic::MissingPrimaryKey { table } => {
                write!(f, "Table '{table}' has no primary key annotation")
            }
            Diagnostic::DuplicateTable { table } => {
                write!(f, "Table '{table}' is defined more than once, keeping the last definition")
            }
            Diagnostic::FilteredTable { table } => {
                write!(f, "Table '{table}' does not match the table name patterns")
            }
        }
    }
}

/// Sink receiving diagnostics during extraction.
pub trait Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `tracing` subscriber.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::FilteredTable { .. } => tracing::debug!("{diagnostic}"),
            _ => tracing::warn!("{diagnostic}"),
        }
    }
}

impl Diagnostics for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
