//! rust-schemascript: Reconstruct a SQL Server schema script from catalog metadata
//!
//! This library turns the tabular output of catalog queries (as captured
//! from `sqlcmd`) into an executable, dependency-ordered DDL script: drop
//! statements, `CREATE TABLE` statements with their keys and indexes, and
//! verbatim procedure and view bodies.

pub mod catalog;
pub mod error;
pub mod model;
pub mod parser;
pub mod script;
mod util;

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDateTime;

pub use catalog::{CatalogDumps, CatalogQuery};
pub use error::SchemaScriptError;
pub use model::{RoutineKind, SchemaSnapshot, SchemaSummary};
pub use script::{GeneratedScript, SkippedTable};

use model::{build_from_records, CatalogRecords};

/// What to do with a table whose statements fail validation during emission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidTablePolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Leave the table out of the create section and report it
    Skip,
}

/// Options for generating a schema script
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Field delimiter of the tabular listings
    pub delimiter: char,
    /// Marker written after each executable batch
    pub batch_separator: String,
    /// Database to `USE` before the drop section
    pub database: Option<String>,
    /// Server name for the header
    pub server: Option<String>,
    pub title: String,
    /// Timestamp for the header; `None` keeps output identical across runs
    pub generated_at: Option<NaiveDateTime>,
    pub on_invalid_table: InvalidTablePolicy,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            delimiter: parser::DEFAULT_DELIMITER,
            batch_separator: "GO".to_string(),
            database: None,
            server: None,
            title: "Database Schema".to_string(),
            generated_at: None,
            on_invalid_table: InvalidTablePolicy::Abort,
        }
    }
}

/// Parse catalog dumps into a schema snapshot
pub fn parse_catalog(
    dumps: &CatalogDumps,
    options: &ScriptOptions,
) -> error::Result<SchemaSnapshot> {
    // Step 1: Normalize the tabular listings
    let rows = dumps.parse(options.delimiter);

    tracing::info!(
        columns = rows.columns.len(),
        primary_keys = rows.primary_keys.len(),
        foreign_keys = rows.foreign_keys.len(),
        indexes = rows.indexes.len(),
        procedures = rows.procedures.len(),
        views = rows.views.len(),
        "parsed catalog rows"
    );

    // Step 2: Decode typed records and apply standalone definitions
    let mut records = CatalogRecords::decode(&rows)?;
    records.merge_definitions(dumps.definitions.clone());

    // Step 3: Build the snapshot
    build_from_records(records)
}

/// Generate the full schema script from in-memory dumps
pub fn generate_script(
    dumps: &CatalogDumps,
    options: &ScriptOptions,
) -> error::Result<GeneratedScript> {
    let snapshot = parse_catalog(dumps, options)?;
    script::write_schema_script(&snapshot, options)
}

/// Generate the full schema script from a dump directory
pub fn generate_from_dir(dir: &Path, options: &ScriptOptions) -> Result<GeneratedScript> {
    let dumps = CatalogDumps::load(dir)?;
    Ok(generate_script(&dumps, options)?)
}

/// Write a script to disk, creating the parent directory if needed
pub fn write_output(path: &Path, text: &str) -> error::Result<()> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)
    };
    write().map_err(|source| SchemaScriptError::OutputWriteError {
        path: path.to_path_buf(),
        source,
    })
}
