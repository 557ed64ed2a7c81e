//! Shared utility helpers.

/// Marker sqlcmd appends after a result set, e.g. `(3 rows affected)`.
pub const ROW_COUNT_MARKER: &str = "affected";

/// Whether a line is the row-count summary sqlcmd prints after a result set.
///
/// The whole trimmed line must read `(<digits> row affected)` or
/// `(<digits> rows affected)`, compared case-insensitively. Data rows that
/// merely contain the words, such as a `RowsAffected` column, do not match.
pub fn is_row_count_trailer(line: &str) -> bool {
    let Some(inner) = line
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return false;
    };

    let mut words = inner.split_whitespace();
    let (Some(count), Some(noun), Some(marker), None) =
        (words.next(), words.next(), words.next(), words.next())
    else {
        return false;
    };

    count.bytes().all(|b| b.is_ascii_digit())
        && (noun.eq_ignore_ascii_case("row") || noun.eq_ignore_ascii_case("rows"))
        && marker.eq_ignore_ascii_case(ROW_COUNT_MARKER)
}
