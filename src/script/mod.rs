//! Schema script generation

pub mod identifier;
mod script_writer;
mod table_writer;

pub use script_writer::{write_routine_script, write_schema_script, GeneratedScript, SkippedTable};
pub use table_writer::{write_column, write_foreign_key, write_index, write_table, TableScript};
