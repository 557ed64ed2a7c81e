//! Error types for rust-schemascript

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the metadata-to-script core
pub type Result<T> = std::result::Result<T, SchemaScriptError>;

/// Errors that can occur while turning catalog dumps into a schema script
#[derive(Error, Debug)]
pub enum SchemaScriptError {
    #[error("Failed to read catalog dump: {path}")]
    InputReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write script to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing field '{field}' in {listing} row {row}")]
    MissingField {
        listing: &'static str,
        field: &'static str,
        row: usize,
    },

    #[error("Invalid value '{value}' for field '{field}' in {listing} row {row}")]
    InvalidFieldValue {
        listing: &'static str,
        field: &'static str,
        value: String,
        row: usize,
    },

    #[error("Duplicate column ordinal {ordinal} in table {table}")]
    DuplicateColumnOrdinal { table: String, ordinal: i32 },

    #[error("{kind} {name} references unknown table {table}")]
    DanglingReference {
        kind: &'static str,
        name: String,
        table: String,
    },

    #[error(
        "Foreign key {constraint} has {owning} owning column(s) but {referenced} referenced column(s)"
    )]
    ForeignKeyColumnMismatch {
        constraint: String,
        owning: usize,
        referenced: usize,
    },

    #[error("Inconsistent fragments for {kind} {name}: {detail}")]
    InconsistentFragment {
        kind: &'static str,
        name: String,
        detail: String,
    },

    #[error("Table {table} has more than one primary key: {first} and {second}")]
    ConflictingPrimaryKey {
        table: String,
        first: String,
        second: String,
    },

    #[error("Partial identity metadata for column {column} in table {table}: seed and increment must both be present or both empty")]
    PartialIdentity { table: String, column: String },

    #[error("Unknown referential action '{action}' on foreign key {constraint}")]
    UnknownReferentialAction { constraint: String, action: String },
}

impl SchemaScriptError {
    /// Whether this error reports inconsistent catalog metadata, as opposed to
    /// an I/O failure or an undecodable field.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SchemaScriptError::DuplicateColumnOrdinal { .. }
                | SchemaScriptError::DanglingReference { .. }
                | SchemaScriptError::ForeignKeyColumnMismatch { .. }
                | SchemaScriptError::InconsistentFragment { .. }
                | SchemaScriptError::ConflictingPrimaryKey { .. }
                | SchemaScriptError::PartialIdentity { .. }
                | SchemaScriptError::UnknownReferentialAction { .. }
        )
    }

    /// The table a validation error is scoped to, when it names one.
    pub fn table(&self) -> Option<&str> {
        match self {
            SchemaScriptError::DuplicateColumnOrdinal { table, .. }
            | SchemaScriptError::DanglingReference { table, .. }
            | SchemaScriptError::ConflictingPrimaryKey { table, .. }
            | SchemaScriptError::PartialIdentity { table, .. } => Some(table),
            _ => None,
        }
    }
}
