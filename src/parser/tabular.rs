//! Normalization of delimited result-set text
//!
//! `sqlcmd -s "|" -W` prints a result set as a header line, a dashed
//! separator line, one line per data row and a `(N rows affected)` trailer.
//! This module turns that text into ordered rows of header-name to value
//! mappings without interpreting any of the values.

use std::sync::Arc;

use crate::util::is_row_count_trailer;

/// Default field delimiter used by the catalog dumps
pub const DEFAULT_DELIMITER: char = '|';

/// One data row of a result set, addressable by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl TabularRow {
    /// Value of the named field, if the result set has such a column.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == field)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Iterate `(header, value)` pairs in column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .zip(self.values.iter())
            .map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

/// Rows recovered from one result set.
#[derive(Debug, Clone, Default)]
pub struct TabularOutput {
    pub rows: Vec<TabularRow>,
    /// Data lines dropped because their field count did not match the header
    pub skipped: usize,
}

impl TabularOutput {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Parse delimited result-set text into rows.
///
/// Blank lines are ignored. The first remaining line is the header and the
/// second is the separator, which is discarded. Consumption stops at the
/// row-count trailer. A data line whose field count differs from the header is
/// skipped and counted in [`TabularOutput::skipped`] instead of failing the
/// whole parse.
pub fn parse_tabular(text: &str, delimiter: char) -> TabularOutput {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return TabularOutput::default();
    };
    // Separator line
    if lines.next().is_none() {
        return TabularOutput::default();
    }

    let headers: Arc<[String]> = split_fields(header_line, delimiter).collect();

    let mut output = TabularOutput::default();
    for line in lines {
        if is_row_count_trailer(line) {
            break;
        }

        let values: Vec<String> = split_fields(line, delimiter).collect();
        if values.len() != headers.len() {
            output.skipped += 1;
            continue;
        }

        output.rows.push(TabularRow {
            headers: Arc::clone(&headers),
            values,
        });
    }

    if output.skipped > 0 {
        tracing::debug!(
            consumed = output.rows.len(),
            skipped = output.skipped,
            expected_fields = headers.len(),
            "dropped result-set lines whose field count did not match the header"
        );
    }

    output
}

fn split_fields(line: &str, delimiter: char) -> impl Iterator<Item = String> + '_ {
    line.split(delimiter).map(|field| field.trim().to_string())
}
