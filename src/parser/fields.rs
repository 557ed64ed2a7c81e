//! Typed decoding of normalized catalog rows
//!
//! Field names match the column aliases of the queries in
//! [`crate::catalog::queries`]. Every record type implements [`FromRow`], so a
//! renamed or missing column surfaces as a [`SchemaScriptError::MissingField`]
//! instead of an empty lookup.

use crate::error::{Result, SchemaScriptError};
use crate::model::{
    Column, ForeignKeyFragment, IndexFragment, PrimaryKeyFragment, ReferentialAction,
    RoutineDefinition, RoutineKind,
};

use super::TabularRow;

/// Field accessor bound to one row, carrying context for error messages.
pub struct FieldReader<'a> {
    row: &'a TabularRow,
    listing: &'static str,
    /// 1-based data row number
    index: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(row: &'a TabularRow, listing: &'static str, index: usize) -> Self {
        Self {
            row,
            listing,
            index,
        }
    }

    /// Raw field text; the field must exist.
    pub fn text(&self, field: &'static str) -> Result<&'a str> {
        self.row
            .get(field)
            .ok_or(SchemaScriptError::MissingField {
                listing: self.listing,
                field,
                row: self.index,
            })
    }

    pub fn string(&self, field: &'static str) -> Result<String> {
        self.text(field).map(str::to_string)
    }

    /// Field text with sqlcmd's `NULL` and the empty string both read as absent.
    /// A missing column also reads as absent.
    pub fn optional(&self, field: &'static str) -> Option<&'a str> {
        self.row
            .get(field)
            .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("NULL"))
    }

    pub fn int(&self, field: &'static str) -> Result<i32> {
        let raw = self.text(field)?;
        raw.parse::<i32>().map_err(|_| self.invalid(field, raw))
    }

    /// Catalog bit columns print as `1`/`0`; `true`/`false` is accepted too.
    pub fn flag(&self, field: &'static str) -> Result<bool> {
        let raw = self.text(field)?;
        match raw {
            "1" => Ok(true),
            "0" => Ok(false),
            _ if raw.eq_ignore_ascii_case("true") => Ok(true),
            _ if raw.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(self.invalid(field, raw)),
        }
    }

    fn invalid(&self, field: &'static str, value: &str) -> SchemaScriptError {
        SchemaScriptError::InvalidFieldValue {
            listing: self.listing,
            field,
            value: value.to_string(),
            row: self.index,
        }
    }
}

/// A record that can be decoded from one normalized row.
pub trait FromRow: Sized {
    /// Listing name used in error messages
    const LISTING: &'static str;

    fn from_row(fields: &FieldReader<'_>) -> Result<Self>;
}

/// Decode every row of a listing, stopping at the first undecodable row.
pub fn decode_rows<T: FromRow>(rows: &[TabularRow]) -> Result<Vec<T>> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| T::from_row(&FieldReader::new(row, T::LISTING, idx + 1)))
        .collect()
}

impl FromRow for Column {
    const LISTING: &'static str = "columns";

    fn from_row(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Column {
            table: fields.string("TableName")?,
            name: fields.string("ColumnName")?,
            data_type: fields.string("DataType")?,
            max_length: fields.int("MaxLength")?,
            precision: fields.int("Precision")?,
            scale: fields.int("Scale")?,
            is_nullable: fields.flag("IsNullable")?,
            is_identity: fields.flag("IsIdentity")?,
            identity_seed: fields.optional("IdentitySeed").unwrap_or("").to_string(),
            identity_increment: fields
                .optional("IdentityIncrement")
                .unwrap_or("")
                .to_string(),
            default_value: fields.optional("DefaultValue").map(str::to_string),
            ordinal: fields.int("ColumnOrder")?,
        })
    }
}

impl FromRow for PrimaryKeyFragment {
    const LISTING: &'static str = "primary keys";

    fn from_row(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(PrimaryKeyFragment {
            table: fields.string("TableName")?,
            constraint: fields.string("ConstraintName")?,
            column: fields.string("ColumnName")?,
            key_ordinal: fields.int("KeyOrder")?,
        })
    }
}

impl FromRow for ForeignKeyFragment {
    const LISTING: &'static str = "foreign keys";

    fn from_row(fields: &FieldReader<'_>) -> Result<Self> {
        let constraint = fields.string("ConstraintName")?;
        let action = |field: &'static str| -> Result<ReferentialAction> {
            let raw = fields.text(field)?;
            ReferentialAction::from_catalog(raw).ok_or_else(|| {
                SchemaScriptError::UnknownReferentialAction {
                    constraint: constraint.clone(),
                    action: raw.to_string(),
                }
            })
        };
        let on_delete = action("OnDelete")?;
        let on_update = action("OnUpdate")?;

        Ok(ForeignKeyFragment {
            table: fields.string("TableName")?,
            column: fields.string("ColumnName")?,
            referenced_table: fields.string("ReferencedTable")?,
            referenced_column: fields.string("ReferencedColumn")?,
            on_delete,
            on_update,
            constraint,
        })
    }
}

impl FromRow for IndexFragment {
    const LISTING: &'static str = "indexes";

    fn from_row(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(IndexFragment {
            table: fields.string("TableName")?,
            index: fields.string("IndexName")?,
            is_unique: fields.flag("IsUnique")?,
            column: fields.string("ColumnName")?,
            key_ordinal: fields.int("KeyOrder")?,
        })
    }
}

/// Decode procedure or view rows.
///
/// The name column depends on the kind (`ProcedureName` / `ViewName`), with a
/// plain `Name` accepted as well. `Definition` may be absent when bodies are
/// supplied as standalone dumps.
pub fn decode_routines(rows: &[TabularRow], kind: RoutineKind) -> Result<Vec<RoutineDefinition>> {
    let listing = match kind {
        RoutineKind::Procedure => "procedures",
        RoutineKind::View => "views",
    };

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let fields = FieldReader::new(row, listing, idx + 1);
            let name = match fields.text(kind.name_field()) {
                Ok(name) => name,
                Err(err) => row.get("Name").ok_or(err)?,
            };
            Ok(RoutineDefinition {
                kind,
                name: name.to_string(),
                definition: row.get("Definition").unwrap_or("").to_string(),
            })
        })
        .collect()
}
