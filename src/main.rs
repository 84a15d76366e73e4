use anyhow::{Context, Result};
use clap::Parser;
use docx_ddl::{generate_schema, load_or_extract, ExtractOptions, LogDiagnostics, MissingPrimaryKey};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docx-ddl", version, about = "Generate SQL DDL from a Word schema document")]
struct Cli {
    /// Schema document (.docx)
    document: PathBuf,

    /// JSON schema cache, read when present, written after extraction otherwise
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Extract from the document even if the cache exists
    #[arg(long)]
    refresh: bool,

    /// Write the SQL to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Token marking a primary-key annotation paragraph
    #[arg(long, default_value = docx_ddl::schema::options::DEFAULT_PRIMARY_KEY_MARKER)]
    pk_marker: String,

    /// Style name of body paragraphs eligible as annotations
    #[arg(long, default_value = docx_ddl::document::style::NORMAL_STYLE)]
    body_style: String,

    /// Keep tables without a primary-key annotation, without a constraint
    #[arg(long)]
    keep_tables_without_pk: bool,

    /// Only extract tables whose name matches this glob. Repeatable.
    #[arg(short, long = "table", value_name = "GLOB")]
    tables: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docx_ddl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let missing_primary_key = if cli.keep_tables_without_pk {
        MissingPrimaryKey::KeepWithoutConstraint
    } else {
        MissingPrimaryKey::Exclude
    };
    let options = ExtractOptions::default()
        .with_primary_key_marker(&cli.pk_marker)
        .with_body_style(&cli.body_style)
        .with_missing_primary_key(missing_primary_key)
        .with_table_name_patterns(&cli.tables)
        .context("Invalid table name pattern")?;

    let schema = load_or_extract(
        &cli.document,
        cli.cache.as_deref(),
        cli.refresh,
        &options,
        &mut LogDiagnostics,
    )
    .with_context(|| format!("Failed to load schema of {}", cli.document.display()))?;

    let mut sql = String::new();
    let mut failed = 0;
    for (table, ddl) in generate_schema(&schema) {
        match ddl {
            Ok(ddl) => {
                sql.push_str(&ddl.to_string());
                sql.push_str("\n\n");
            }
            Err(e) => {
                failed += 1;
                tracing::error!(table = %table, "{e}");
            }
        }
    }
    tracing::info!(tables = schema.len(), failed, "generated DDL");

    match &cli.output {
        Some(path) => fs::write(path, sql).with_context(|| format!("Failed to write {}", path.display()))?,
        None => io::stdout()
            .lock()
            .write_all(sql.as_bytes())
            .context("Failed to write SQL to stdout")?,
    }
    Ok(())
}
