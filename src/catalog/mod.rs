//! Catalog dump loading
//!
//! A dump directory holds the captured output of each query in
//! [`queries`], one file per listing, plus optional `procedures/` and
//! `views/` directories with one standalone definition dump per object:
//!
//! ```text
//! dump/
//!   columns.txt
//!   primary_keys.txt
//!   foreign_keys.txt
//!   indexes.txt
//!   procedures.txt
//!   views.txt
//!   procedures/usp_Cleanup.sql
//!   views/vActiveUsers.sql
//! ```

pub mod queries;

use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;

use crate::error::{Result, SchemaScriptError};
use crate::model::{CatalogRows, RoutineDefinition, RoutineKind};
use crate::parser::{clean_definition_output, parse_tabular, TabularOutput};

pub use queries::CatalogQuery;

/// Raw text of every catalog listing
#[derive(Debug, Clone, Default)]
pub struct CatalogDumps {
    pub columns: String,
    pub primary_keys: String,
    pub foreign_keys: String,
    pub indexes: String,
    pub procedures: String,
    pub views: String,
    /// Routine bodies from standalone definition dumps
    pub definitions: Vec<RoutineDefinition>,
}

impl CatalogDumps {
    pub fn listing(&self, query: CatalogQuery) -> &str {
        match query {
            CatalogQuery::Columns => &self.columns,
            CatalogQuery::PrimaryKeys => &self.primary_keys,
            CatalogQuery::ForeignKeys => &self.foreign_keys,
            CatalogQuery::Indexes => &self.indexes,
            CatalogQuery::Procedures => &self.procedures,
            CatalogQuery::Views => &self.views,
        }
    }

    fn listing_mut(&mut self, query: CatalogQuery) -> &mut String {
        match query {
            CatalogQuery::Columns => &mut self.columns,
            CatalogQuery::PrimaryKeys => &mut self.primary_keys,
            CatalogQuery::ForeignKeys => &mut self.foreign_keys,
            CatalogQuery::Indexes => &mut self.indexes,
            CatalogQuery::Procedures => &mut self.procedures,
            CatalogQuery::Views => &mut self.views,
        }
    }

    /// Load a dump directory.
    ///
    /// `columns.txt` is required since it defines the table set. Any other
    /// missing listing is read as empty.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut dumps = CatalogDumps::default();

        for query in CatalogQuery::ALL {
            let path = dir.join(query.file_name());
            if !path.exists() && query != CatalogQuery::Columns {
                tracing::debug!(path = %path.display(), "listing not present, treating as empty");
                continue;
            }
            *dumps.listing_mut(query) = read_dump(&path)?;
        }

        for kind in [RoutineKind::Procedure, RoutineKind::View] {
            dumps.definitions.extend(load_definitions(dir, kind)?);
        }

        tracing::info!(
            dir = %dir.display(),
            definitions = dumps.definitions.len(),
            "loaded catalog dumps"
        );

        Ok(dumps)
    }

    /// Normalize every listing, logging row-count mismatches per listing.
    pub fn parse(&self, delimiter: char) -> CatalogRows {
        let parse = |query: CatalogQuery| {
            let TabularOutput { rows, skipped } = parse_tabular(self.listing(query), delimiter);
            if skipped > 0 {
                tracing::warn!(listing = %query, consumed = rows.len(), skipped, "malformed rows dropped");
            }
            rows
        };

        CatalogRows {
            columns: parse(CatalogQuery::Columns),
            primary_keys: parse(CatalogQuery::PrimaryKeys),
            foreign_keys: parse(CatalogQuery::ForeignKeys),
            indexes: parse(CatalogQuery::Indexes),
            procedures: parse(CatalogQuery::Procedures),
            views: parse(CatalogQuery::Views),
        }
    }
}

/// Read one dump, stripping a UTF-8 BOM.
fn read_dump(path: &Path) -> Result<String> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|source| SchemaScriptError::InputReadError {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(content
        .strip_prefix('\u{FEFF}')
        .map(str::to_string)
        .unwrap_or(content))
}

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(err) => {
            // sqlcmd output captured on Windows is commonly in the ANSI code page
            let bytes = err.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}

/// Load `<dir>/procedures/*.sql` or `<dir>/views/*.sql`; the file stem is the object name.
fn load_definitions(dir: &Path, kind: RoutineKind) -> Result<Vec<RoutineDefinition>> {
    let subdir = match kind {
        RoutineKind::Procedure => "procedures",
        RoutineKind::View => "views",
    };
    let root = dir.join(subdir);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/*.sql",
        glob::Pattern::escape(&root.to_string_lossy())
    );
    let paths = glob::glob(&pattern).map_err(|err| SchemaScriptError::InputReadError {
        path: root.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()),
    })?;

    let mut definitions = Vec::new();
    for entry in paths {
        let path: PathBuf = entry.map_err(|err| SchemaScriptError::InputReadError {
            path: err.path().to_path_buf(),
            source: err.into(),
        })?;
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        definitions.push(RoutineDefinition {
            kind,
            name: name.to_string(),
            definition: clean_definition_output(&read_dump(&path)?),
        });
    }

    Ok(definitions)
}
