//! T-SQL identifier and literal quoting

/// Wrap an identifier in brackets, doubling any closing bracket it contains.
///
/// ```ignore
/// assert_eq!(quote_identifier("Orders"), "[Orders]");
/// assert_eq!(quote_identifier("Odd]Name"), "[Odd]]Name]");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Bracket-quote and comma-join a column list.
pub fn quote_column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Wrap text in single quotes, doubling embedded quotes.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
