//! # SQL Generator
//!
//! Renders schema map entries as PostgreSQL DDL:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS users (
//!     id numeric NOT NULL,
//!     name varchar
//! );
//! ALTER TABLE users ADD CONSTRAINT pk_users PRIMARY KEY (id);
//! ```
//!
//! Every table is validated on its own, so one broken entry does not hold back the
//! statements of the others.
use crate::schema::SchemaMap;
use crate::schema::TableSchema;
use std::fmt;
use thiserror::Error;

/// Indentation of column lines inside `CREATE TABLE`
const COLUMN_INDENT: &str = "    ";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DdlError {
    #[error("Table name is empty")]
    EmptyTableName,

    #[error("Table '{table}' has no columns")]
    EmptyTable { table: String },

    #[error("Column '{column}' of table '{table}' has no type")]
    MissingColumnType { table: String, column: String },

    #[error("Primary key column '{column}' is not a column of table '{table}'")]
    DanglingPrimaryKey { table: String, column: String },
}

/// The statements generated for one table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableDdl {
    pub create_table: String,
    /// Present when the table declares primary-key columns
    pub primary_key: Option<String>,
}

impl fmt::Display for TableDdl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.create_table)?;
        if let Some(primary_key) = &self.primary_key {
            write!(f, "\n{primary_key}")?;
        }
        Ok(())
    }
}

/// Generates the DDL of one table.
///
/// # Errors
///
/// * [`DdlError::EmptyTableName`] when the name is blank
/// * [`DdlError::EmptyTable`] when the structure has no columns
/// * [`DdlError::MissingColumnType`] when a column has a blank type
/// * [`DdlError::DanglingPrimaryKey`] when a primary-key column is not in the structure
pub fn generate_table(table_name: &str, table: &TableSchema) -> Result<TableDdl, DdlError> {
    validate(table_name, table)?;

    let columns = table
        .structure
        .values()
        .map(|column| {
            let mut line = format!("{COLUMN_INDENT}{} {}", column.name, column.kind);
            if column.is_not_null() {
                line.push_str(" NOT NULL");
            }
            line
        })
        .collect::<Vec<_>>()
        .join(",\n");
    let create_table = format!("CREATE TABLE IF NOT EXISTS {table_name} (\n{columns}\n);");

    let primary_key = (!table.pk_columns.is_empty()).then(|| {
        format!(
            "ALTER TABLE {table_name} ADD CONSTRAINT pk_{table_name} PRIMARY KEY ({});",
            table.pk_columns.join(", ")
        )
    });

    Ok(TableDdl {
        create_table,
        primary_key,
    })
}

/// Generates the DDL of every table of the schema map, in map order.
pub fn generate_schema(schema: &SchemaMap) -> Vec<(String, Result<TableDdl, DdlError>)> {
    schema
        .iter()
        .map(|(name, table)| (name.to_owned(), generate_table(name, table)))
        .collect()
}

fn validate(table_name: &str, table: &TableSchema) -> Result<(), DdlError> {
    if table_name.trim().is_empty() {
        return Err(DdlError::EmptyTableName);
    }
    if table.structure.is_empty() {
        return Err(DdlError::EmptyTable {
            table: table_name.to_owned(),
        });
    }
    if let Some(column) = table.structure.values().find(|column| column.kind.trim().is_empty()) {
        return Err(DdlError::MissingColumnType {
            table: table_name.to_owned(),
            column: column.name.clone(),
        });
    }
    if let Some(column) = table
        .pk_columns
        .iter()
        .find(|column| !table.structure.contains_key(column.as_str()))
    {
        return Err(DdlError::DanglingPrimaryKey {
            table: table_name.to_owned(),
            column: column.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnInfo;
    use crate::schema::Structure;

    fn column(name: &str, kind: &str, not_null: &str) -> ColumnInfo {
        ColumnInfo {
            cn_name: String::new(),
            name: name.to_owned(),
            kind: kind.to_owned(),
            not_null: not_null.to_owned(),
            comment: String::new(),
        }
    }

    fn table(columns: &[ColumnInfo], pk_columns: &[&str]) -> TableSchema {
        let structure: Structure = columns
            .iter()
            .map(|column| (column.name.clone(), column.clone()))
            .collect();
        TableSchema {
            structure,
            pk_columns: pk_columns.iter().map(|column| column.to_string()).collect(),
        }
    }

    #[test]
    fn create_table_with_primary_key() {
        let users = table(&[column("id", "numeric", "y")], &["id"]);
        let ddl = generate_table("users", &users).unwrap();
        assert_eq!(ddl.create_table, "CREATE TABLE IF NOT EXISTS users (\n    id numeric NOT NULL\n);");
        assert_eq!(
            ddl.primary_key.as_deref(),
            Some("ALTER TABLE users ADD CONSTRAINT pk_users PRIMARY KEY (id);")
        );
        assert_eq!(
            ddl.to_string(),
            "CREATE TABLE IF NOT EXISTS users (\n    id numeric NOT NULL\n);\n\
             ALTER TABLE users ADD CONSTRAINT pk_users PRIMARY KEY (id);"
        );
    }

    #[test]
    fn not_null_only_for_flagged_columns() {
        let orders = table(
            &[
                column("id", "numeric", "y"),
                column("note", "varchar(20)", ""),
                column("created", "timestamp", "n"),
            ],
            &[],
        );
        let ddl = generate_table("orders", &orders).unwrap();
        assert_eq!(
            ddl.create_table,
            "CREATE TABLE IF NOT EXISTS orders (\n    id numeric NOT NULL,\n    note varchar(20),\n    created timestamp\n);"
        );
        assert_eq!(ddl.primary_key, None);
        assert_eq!(ddl.to_string(), ddl.create_table);
    }

    #[test]
    fn composite_key_keeps_declared_order() {
        let items = table(
            &[column("order_id", "numeric", "y"), column("line", "numeric", "y")],
            &["line", "order_id"],
        );
        let ddl = generate_table("items", &items).unwrap();
        assert_eq!(
            ddl.primary_key.as_deref(),
            Some("ALTER TABLE items ADD CONSTRAINT pk_items PRIMARY KEY (line, order_id);")
        );
    }

    #[test]
    fn dangling_primary_key() {
        let users = table(&[column("id", "numeric", "y")], &["uid"]);
        assert_eq!(
            generate_table("users", &users),
            Err(DdlError::DanglingPrimaryKey {
                table: "users".to_owned(),
                column: "uid".to_owned(),
            })
        );
    }

    #[test]
    fn empty_table() {
        assert_eq!(
            generate_table("users", &TableSchema::default()),
            Err(DdlError::EmptyTable { table: "users".to_owned() })
        );
    }

    #[test]
    fn empty_table_name() {
        let unnamed = table(&[column("id", "numeric", "y")], &["id"]);
        assert_eq!(generate_table("", &unnamed), Err(DdlError::EmptyTableName));
        assert_eq!(generate_table("  ", &unnamed), Err(DdlError::EmptyTableName));
    }

    #[test]
    fn unnamed_table_does_not_block_named_ones() {
        let mut schema = SchemaMap::new();
        schema.insert(String::new(), table(&[column("id", "numeric", "y")], &["id"]));
        schema.insert("users".to_owned(), table(&[column("id", "numeric", "y")], &["id"]));

        let generated = generate_schema(&schema);
        assert_eq!(generated[0], (String::new(), Err(DdlError::EmptyTableName)));
        assert_eq!(generated[1].0, "users");
        assert!(generated[1].1.as_ref().unwrap().create_table.starts_with("CREATE TABLE IF NOT EXISTS users ("));
    }

    #[test]
    fn missing_column_type() {
        let users = table(&[column("id", "", "y")], &[]);
        assert!(matches!(
            generate_table("users", &users),
            Err(DdlError::MissingColumnType { column, .. }) if column == "id"
        ));
    }

    #[test]
    fn one_broken_table_does_not_block_others() {
        let mut schema = SchemaMap::new();
        schema.insert("broken".to_owned(), table(&[column("id", "numeric", "y")], &["nope"]));
        schema.insert("users".to_owned(), table(&[column("id", "numeric", "y")], &["id"]));

        let generated = generate_schema(&schema);
        assert_eq!(generated.len(), 2);
        assert_eq!(generated[0].0, "broken");
        assert!(generated[0].1.is_err());
        assert_eq!(generated[1].0, "users");
        assert!(generated[1].1.is_ok());
    }
}
