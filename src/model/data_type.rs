//! Rendering of catalog type names into T-SQL type expressions

use super::Column;

/// `max_length` value the catalog uses for `(MAX)` types
pub const UNBOUNDED_LENGTH: i32 = -1;

/// How a catalog type name is parameterized in a column definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeFamily {
    /// `char`/`varchar` (`wide == false`) and `nchar`/`nvarchar` (`wide == true`)
    Character { wide: bool },
    Decimal,
    Binary,
    /// Types written without parameters
    Bare,
    /// Not a built-in type name; written bare as a best effort
    Unrecognized,
}

/// Built-in types that take no parameters in a generated column definition
const BARE_TYPES: &[&str] = &[
    "bigint",
    "bit",
    "date",
    "datetime",
    "datetime2",
    "datetimeoffset",
    "float",
    "geography",
    "geometry",
    "hierarchyid",
    "image",
    "int",
    "money",
    "ntext",
    "real",
    "rowversion",
    "smalldatetime",
    "smallint",
    "smallmoney",
    "sql_variant",
    "sysname",
    "text",
    "time",
    "timestamp",
    "tinyint",
    "uniqueidentifier",
    "xml",
];

fn classify(data_type: &str) -> TypeFamily {
    let lower = data_type.to_ascii_lowercase();
    match lower.as_str() {
        "char" | "varchar" => TypeFamily::Character { wide: false },
        "nchar" | "nvarchar" => TypeFamily::Character { wide: true },
        "decimal" | "numeric" => TypeFamily::Decimal,
        "binary" | "varbinary" => TypeFamily::Binary,
        other if BARE_TYPES.contains(&other) => TypeFamily::Bare,
        _ => TypeFamily::Unrecognized,
    }
}

/// Render a type expression from the raw catalog type name and its size attributes.
///
/// Never fails: unrecognized names are written bare. Double-byte character
/// types store their length in bytes, so the character count is the byte
/// length halved (rounded down).
pub fn render_data_type(data_type: &str, max_length: i32, precision: i32, scale: i32) -> String {
    match classify(data_type) {
        TypeFamily::Character { wide } => {
            if max_length == UNBOUNDED_LENGTH {
                format!("{}(MAX)", data_type)
            } else {
                let chars = if wide { max_length / 2 } else { max_length };
                format!("{}({})", data_type, chars)
            }
        }
        TypeFamily::Binary => {
            if max_length == UNBOUNDED_LENGTH {
                format!("{}(MAX)", data_type)
            } else {
                format!("{}({})", data_type, max_length)
            }
        }
        TypeFamily::Decimal => format!("{}({},{})", data_type, precision, scale),
        TypeFamily::Bare => data_type.to_string(),
        TypeFamily::Unrecognized => {
            tracing::debug!(data_type, "unrecognized type name rendered without parameters");
            data_type.to_string()
        }
    }
}

/// Render the type expression of a column.
pub fn render_column_type(column: &Column) -> String {
    render_data_type(
        &column.data_type,
        column.max_length,
        column.precision,
        column.scale,
    )
}
