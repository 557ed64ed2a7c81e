//! Catalog queries whose tabular output feeds the generator
//!
//! These are run by the caller (e.g. `sqlcmd -s "|" -W -Q <query>`); this
//! crate never connects to a database. The column aliases are the field names
//! the record decoders read.

use std::fmt;
use std::str::FromStr;

/// Columns with type, nullability, identity and default metadata
pub const COLUMNS_QUERY: &str = "\
SELECT
    t.name AS TableName,
    c.name AS ColumnName,
    ty.name AS DataType,
    c.max_length AS MaxLength,
    c.precision AS Precision,
    c.scale AS Scale,
    c.is_nullable AS IsNullable,
    c.is_identity AS IsIdentity,
    ISNULL(CAST(ic.seed_value AS VARCHAR), '') AS IdentitySeed,
    ISNULL(CAST(ic.increment_value AS VARCHAR), '') AS IdentityIncrement,
    ISNULL(dc.definition, '') AS DefaultValue,
    c.column_id AS ColumnOrder
FROM sys.tables t
INNER JOIN sys.columns c ON t.object_id = c.object_id
INNER JOIN sys.types ty ON c.user_type_id = ty.user_type_id
LEFT JOIN sys.default_constraints dc ON c.default_object_id = dc.object_id
LEFT JOIN sys.identity_columns ic ON c.object_id = ic.object_id AND c.column_id = ic.column_id
WHERE t.type = 'U'
ORDER BY t.name, c.column_id;";

/// One row per primary key column
pub const PRIMARY_KEYS_QUERY: &str = "\
SELECT
    t.name AS TableName,
    kc.name AS ConstraintName,
    c.name AS ColumnName,
    ic.key_ordinal AS KeyOrder
FROM sys.tables t
INNER JOIN sys.key_constraints kc ON t.object_id = kc.parent_object_id
INNER JOIN sys.index_columns ic ON kc.parent_object_id = ic.object_id AND kc.unique_index_id = ic.index_id
INNER JOIN sys.columns c ON ic.object_id = c.object_id AND ic.column_id = c.column_id
WHERE kc.type = 'PK'
ORDER BY t.name, ic.key_ordinal;";

/// One row per foreign key column pair
pub const FOREIGN_KEYS_QUERY: &str = "\
SELECT
    OBJECT_NAME(fk.parent_object_id) AS TableName,
    fk.name AS ConstraintName,
    COL_NAME(fkc.parent_object_id, fkc.parent_column_id) AS ColumnName,
    OBJECT_NAME(fk.referenced_object_id) AS ReferencedTable,
    COL_NAME(fkc.referenced_object_id, fkc.referenced_column_id) AS ReferencedColumn,
    fk.delete_referential_action_desc AS OnDelete,
    fk.update_referential_action_desc AS OnUpdate
FROM sys.foreign_keys fk
INNER JOIN sys.foreign_key_columns fkc ON fk.object_id = fkc.constraint_object_id
ORDER BY TableName, ConstraintName, fkc.constraint_column_id;";

/// One row per index column, primary keys excluded
pub const INDEXES_QUERY: &str = "\
SELECT
    t.name AS TableName,
    i.name AS IndexName,
    i.is_unique AS IsUnique,
    c.name AS ColumnName,
    ic.key_ordinal AS KeyOrder
FROM sys.tables t
INNER JOIN sys.indexes i ON t.object_id = i.object_id
INNER JOIN sys.index_columns ic ON i.object_id = ic.object_id AND i.index_id = ic.index_id
INNER JOIN sys.columns c ON ic.object_id = c.object_id AND ic.column_id = c.column_id
WHERE i.is_primary_key = 0 AND i.type > 0
ORDER BY t.name, i.name, ic.key_ordinal;";

pub const PROCEDURES_QUERY: &str = "\
SELECT
    p.name AS ProcedureName,
    OBJECT_DEFINITION(p.object_id) AS Definition
FROM sys.procedures p
WHERE p.type = 'P'
ORDER BY p.name;";

pub const VIEWS_QUERY: &str = "\
SELECT
    v.name AS ViewName,
    OBJECT_DEFINITION(v.object_id) AS Definition
FROM sys.views v
ORDER BY v.name;";

/// The six catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogQuery {
    Columns,
    PrimaryKeys,
    ForeignKeys,
    Indexes,
    Procedures,
    Views,
}

impl CatalogQuery {
    pub const ALL: [CatalogQuery; 6] = [
        CatalogQuery::Columns,
        CatalogQuery::PrimaryKeys,
        CatalogQuery::ForeignKeys,
        CatalogQuery::Indexes,
        CatalogQuery::Procedures,
        CatalogQuery::Views,
    ];

    pub fn sql(&self) -> &'static str {
        match self {
            CatalogQuery::Columns => COLUMNS_QUERY,
            CatalogQuery::PrimaryKeys => PRIMARY_KEYS_QUERY,
            CatalogQuery::ForeignKeys => FOREIGN_KEYS_QUERY,
            CatalogQuery::Indexes => INDEXES_QUERY,
            CatalogQuery::Procedures => PROCEDURES_QUERY,
            CatalogQuery::Views => VIEWS_QUERY,
        }
    }

    /// File the listing is stored under in a dump directory
    pub fn file_name(&self) -> &'static str {
        match self {
            CatalogQuery::Columns => "columns.txt",
            CatalogQuery::PrimaryKeys => "primary_keys.txt",
            CatalogQuery::ForeignKeys => "foreign_keys.txt",
            CatalogQuery::Indexes => "indexes.txt",
            CatalogQuery::Procedures => "procedures.txt",
            CatalogQuery::Views => "views.txt",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CatalogQuery::Columns => "columns",
            CatalogQuery::PrimaryKeys => "primary-keys",
            CatalogQuery::ForeignKeys => "foreign-keys",
            CatalogQuery::Indexes => "indexes",
            CatalogQuery::Procedures => "procedures",
            CatalogQuery::Views => "views",
        }
    }
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CatalogQuery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        CatalogQuery::ALL
            .into_iter()
            .find(|q| q.name() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown catalog query '{}' (expected one of: columns, primary-keys, foreign-keys, indexes, procedures, views)",
                    s
                )
            })
    }
}
