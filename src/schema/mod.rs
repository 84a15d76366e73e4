//! # Schema Model
//!
//! The schema map produced by extraction, keyed by table name in document order,
//! together with its JSON cache form:
//!
//! ```json
//! {"users": {"structure": {"id": {"cn_name": "主键", "name": "id", "type": "numeric",
//!            "not_null": "y", "comment": "用户id"}}, "pk_columns": ["id"]}}
//! ```
use crate::document::Document;
use crate::error::DocxDdlError;
use crate::error::ResultMessage;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub mod converter;
pub mod diagnostics;
pub mod extractor;
pub mod options;

use diagnostics::Diagnostics;
use extractor::Extractor;
use options::ExtractOptions;

/// Not-null flag value marking a mandatory column
const NOT_NULL_FLAG: &str = "y";

/// Metadata of one column as authored in the document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Display (Chinese) name
    pub cn_name: String,
    /// Column name, unique within its table
    pub name: String,
    /// Normalized SQL type
    #[serde(rename = "type")]
    pub kind: String,
    /// `y` for NOT NULL columns
    pub not_null: String,
    pub comment: String,
}

impl ColumnInfo {
    pub fn is_not_null(&self) -> bool {
        self.not_null == NOT_NULL_FLAG
    }
}

/// Columns of a table keyed by column name, in row order.
pub type Structure = IndexMap<String, ColumnInfo>;

/// One extracted table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub structure: Structure,
    /// Primary-key column names in declaration order
    pub pk_columns: Vec<String>,
}

/// Extracted tables keyed by table name, in order of first appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaMap {
    tables: IndexMap<String, TableSchema>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a table, returning the entry it replaced.
    /// A replaced table keeps its original position.
    pub fn insert(&mut self, name: String, table: TableSchema) -> Option<TableSchema> {
        self.tables.insert(name, table)
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableSchema)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// Serializes to human-readable JSON, four-space indented, non-ASCII kept as is.
    pub fn to_json(&self) -> Result<String, DocxDdlError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DocxDdlError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the JSON cache file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), DocxDdlError> {
        let path = path.as_ref();
        self.to_json()
            .and_then(|json| Ok(fs::write(path, json)?))
            .with_prefix(&path.display().to_string())
    }

    /// Reads a JSON cache file.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, DocxDdlError> {
        let path = path.as_ref();
        fs::read_to_string(path)
            .map_err(DocxDdlError::from)
            .and_then(|json| Self::from_json(&json))
            .with_prefix(&path.display().to_string())
    }
}

impl<'a> IntoIterator for &'a SchemaMap {
    type Item = (&'a String, &'a TableSchema);
    type IntoIter = indexmap::map::Iter<'a, String, TableSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

/// Returns the schema of `document`, going through a JSON cache when one is given.
///
/// With a cache path, an existing cache is read back unless `refresh` is set;
/// otherwise the document is extracted and the cache written. Without a cache path
/// the document is always extracted.
pub fn load_or_extract(
    document: &Path,
    cache: Option<&Path>,
    refresh: bool,
    options: &ExtractOptions,
    diagnostics: &mut dyn Diagnostics,
) -> Result<SchemaMap, DocxDdlError> {
    if let Some(cache) = cache.filter(|cache| !refresh && cache.exists()) {
        tracing::info!(cache = %cache.display(), "reading schema cache");
        return SchemaMap::read_from(cache);
    }

    tracing::info!(document = %document.display(), "extracting schema");
    let decoded = Document::open(document)?;
    let schema = Extractor::new(options, diagnostics).extract_document(&decoded)?;
    if let Some(cache) = cache {
        schema.write_to(cache)?;
        tracing::info!(cache = %cache.display(), tables = schema.len(), "wrote schema cache");
    }
    Ok(schema)
}
