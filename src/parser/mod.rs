//! Catalog listing parsing

pub mod definition;
mod fields;
mod tabular;

pub use definition::clean_definition_output;
pub use fields::{decode_routines, decode_rows, FieldReader, FromRow};
pub use tabular::{parse_tabular, TabularOutput, TabularRow, DEFAULT_DELIMITER};
