//! # Document Schema to DDL
//!
//! Extracts a relational schema authored in a Word document and renders it as SQL.
//!
//! A schema document describes every table with a heading, an optional primary-key
//! annotation paragraph and a column-definition table:
//!
//! ```text
//! 1 / users（用户表）            <- Heading 1, table name "users"
//! 主键 + id                       <- Normal paragraph, primary key (id)
//! | 中文名 | name | type   | 非空 | 备注   |
//! | 主键   | id   | NUMBER | y    | 用户ID |
//! ```
//!
//! ## Pipeline
//!
//! - [`document`]: decodes the `.docx` package into ordered blocks
//! - [`schema`]: walks the blocks with a heading context and builds the [`SchemaMap`],
//!   optionally cached as JSON
//! - [`ddl`]: renders each table as `CREATE TABLE` plus a primary-key constraint
//!
//! ```no_run
//! use docx_ddl::{generate_schema, load_or_extract, ExtractOptions, LogDiagnostics};
//! use std::path::Path;
//!
//! let schema = load_or_extract(
//!     Path::new("schema.docx"),
//!     None,
//!     false,
//!     &ExtractOptions::default(),
//!     &mut LogDiagnostics,
//! )?;
//! for (_, ddl) in generate_schema(&schema) {
//!     println!("{}", ddl?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod ddl;
pub mod document;
pub mod error;
pub(crate) mod helpers;
pub mod schema;

pub use ddl::generate_schema;
pub use ddl::generate_table;
pub use ddl::TableDdl;
pub use document::Document;
pub use error::DocxDdlError;
pub use schema::diagnostics::Diagnostic;
pub use schema::diagnostics::Diagnostics;
pub use schema::diagnostics::LogDiagnostics;
pub use schema::extractor::Extractor;
pub use schema::load_or_extract;
pub use schema::options::ExtractOptions;
pub use schema::options::MissingPrimaryKey;
pub use schema::SchemaMap;
