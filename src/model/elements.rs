//! Catalog metadata record types
//!
//! Each record mirrors one row of a catalog listing. Multi-column constraints
//! and indexes arrive as fragments, one per participating column, and are
//! grouped later by [`crate::model::constraints`].

/// A table column as described by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub table: String,
    pub name: String,
    /// Raw catalog type name (e.g. `nvarchar`, `decimal`)
    pub data_type: String,
    /// Stored maximum length in bytes; `-1` means unbounded (`MAX`)
    pub max_length: i32,
    pub precision: i32,
    pub scale: i32,
    pub is_nullable: bool,
    pub is_identity: bool,
    /// Identity seed as printed by the catalog, empty when absent
    pub identity_seed: String,
    /// Identity increment as printed by the catalog, empty when absent
    pub identity_increment: String,
    pub default_value: Option<String>,
    /// Position within the table, unique per table
    pub ordinal: i32,
}

/// One column participation in a primary key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyFragment {
    pub table: String,
    pub constraint: String,
    pub column: String,
    pub key_ordinal: i32,
}

/// Referential action on delete/update of a foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferentialAction {
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    /// Parse the catalog's action description (`NO_ACTION`, `SET_NULL`, ...).
    pub fn from_catalog(raw: &str) -> Option<Self> {
        let normalized = raw.trim().replace(' ', "_");
        match normalized.to_ascii_uppercase().as_str() {
            "NO_ACTION" => Some(ReferentialAction::NoAction),
            "CASCADE" => Some(ReferentialAction::Cascade),
            "SET_NULL" => Some(ReferentialAction::SetNull),
            "SET_DEFAULT" => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }

    /// Catalog spelling, with underscores
    pub fn catalog_name(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO_ACTION",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET_NULL",
            ReferentialAction::SetDefault => "SET_DEFAULT",
        }
    }

    /// T-SQL spelling used in `ON DELETE` / `ON UPDATE` clauses
    pub fn sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }

    pub fn is_no_action(&self) -> bool {
        matches!(self, ReferentialAction::NoAction)
    }
}

/// One owning/referenced column pair of a foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyFragment {
    pub constraint: String,
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

/// One column participation in a non-primary-key index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFragment {
    pub table: String,
    pub index: String,
    pub is_unique: bool,
    pub column: String,
    /// Key position; `0` marks an included (non-key) column
    pub key_ordinal: i32,
}

/// Programmable object kinds whose bodies are passed through verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Procedure,
    View,
}

impl RoutineKind {
    /// `OBJECT_ID` type code
    pub fn object_type(&self) -> &'static str {
        match self {
            RoutineKind::Procedure => "P",
            RoutineKind::View => "V",
        }
    }

    /// Keyword used in `DROP <keyword>`
    pub fn keyword(&self) -> &'static str {
        match self {
            RoutineKind::Procedure => "PROCEDURE",
            RoutineKind::View => "VIEW",
        }
    }

    /// Label used in script comments
    pub fn label(&self) -> &'static str {
        match self {
            RoutineKind::Procedure => "Stored Procedure",
            RoutineKind::View => "View",
        }
    }

    /// Name column of the catalog listing
    pub fn name_field(&self) -> &'static str {
        match self {
            RoutineKind::Procedure => "ProcedureName",
            RoutineKind::View => "ViewName",
        }
    }
}

/// A procedure or view body, opaque to this crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineDefinition {
    pub kind: RoutineKind,
    pub name: String,
    pub definition: String,
}
