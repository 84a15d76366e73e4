//! Conversion of a column-definition table into a table structure
use crate::document::Table;
use crate::schema::diagnostics::Diagnostic;
use crate::schema::diagnostics::Diagnostics;
use crate::schema::ColumnInfo;
use crate::schema::Structure;
use thiserror::Error;

/// Positional meaning of the cells of a column-definition row:
/// Chinese name, English name, type, not-null flag, comment
pub const COLUMN_FIELDS: [&str; 5] = ["cn_name", "name", "type", "not_null", "comment"];

/// Oracle to PostgreSQL type spellings, applied in this order
const TYPE_REPLACEMENTS: [(&str, &str); 3] = [
    ("number", "numeric"),
    ("varchar2", "varchar"),
    ("date", "timestamp"),
];

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Malformed row {row} in table '{table}': expected {expected} cells, found {cells}")]
    MalformedRow {
        table: String,
        row: usize,
        cells: usize,
        expected: usize,
    },
}

/// Lower-cases a source type and rewrites it to its normalized spelling.
///
/// Already normalized types are left unchanged.
pub fn normalize_type(kind: &str) -> String {
    TYPE_REPLACEMENTS
        .iter()
        .fold(kind.to_lowercase(), |kind, (from, to)| kind.replace(from, to))
}

/// Converts a column-definition table into its structure.
///
/// Row 0 is the header and is skipped. Every cell text is lower-cased and trimmed.
/// Rows are keyed by column name; a repeated name replaces the earlier row and is
/// reported as [`Diagnostic::DuplicateColumn`]. Rows without a name are reported
/// and skipped.
///
/// # Errors
///
/// [`ConverterError::MalformedRow`] when a data row has fewer cells than [`COLUMN_FIELDS`].
pub fn convert_table(
    table: &Table,
    table_name: &str,
    diagnostics: &mut dyn Diagnostics,
) -> Result<Structure, ConverterError> {
    let mut structure = Structure::new();
    for (index, row) in table.rows.iter().enumerate().skip(1) {
        let cells: Vec<String> = row
            .texts()
            .iter()
            .map(|text| text.trim().to_lowercase())
            .collect();
        let [cn_name, name, kind, not_null, comment] = match <[String; 5]>::try_from(
            cells.into_iter().take(COLUMN_FIELDS.len()).collect::<Vec<_>>(),
        ) {
            Ok(fields) => fields,
            Err(fields) => Err(ConverterError::MalformedRow {
                table: table_name.to_owned(),
                row: index,
                cells: fields.len(),
                expected: COLUMN_FIELDS.len(),
            })?,
        };

        if name.is_empty() {
            diagnostics.report(Diagnostic::BlankColumnName {
                table: table_name.to_owned(),
                row: index,
            });
            continue;
        }

        let column = ColumnInfo {
            cn_name,
            name: name.clone(),
            kind: normalize_type(&kind),
            not_null,
            comment,
        };
        if structure.insert(name.clone(), column).is_some() {
            diagnostics.report(Diagnostic::DuplicateColumn {
                table: table_name.to_owned(),
                column: name,
            });
        }
    }
    Ok(structure)
}
