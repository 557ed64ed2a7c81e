//! Cleanup of standalone routine-definition dumps
//!
//! Multi-line procedure and view bodies do not fit the delimited listing
//! format, so they are also fetched one object at a time
//! (`SELECT m.definition FROM sys.sql_modules ...`). That output carries a
//! row-count trailer that is not part of the body.

use crate::util::is_row_count_trailer;

/// Strip row-count trailer lines and surrounding whitespace from a definition dump.
///
/// Only whole trailer lines are dropped, so body comments mentioning
/// affected rows survive.
pub fn clean_definition_output(raw: &str) -> String {
    raw.lines()
        .filter(|line| !is_row_count_trailer(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
