//! Grouping of per-column fragments into composite constraints and indexes
//!
//! Catalog listings describe a multi-column key as one row per participating
//! column. The functions here take the flat fragment lists plus a table name
//! and return fully formed definitions. A grouping that cannot be completed
//! losslessly is an error, never a silently shortened constraint.

use std::collections::HashMap;

use crate::error::{Result, SchemaScriptError};

use super::{ForeignKeyFragment, IndexFragment, PrimaryKeyFragment, ReferentialAction};

/// Composite primary key of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyDefinition {
    pub name: String,
    /// Key columns in ascending key-ordinal order
    pub columns: Vec<String>,
}

/// Foreign key owned by one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDefinition {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    /// Positionally paired with `columns`
    pub referenced_columns: Vec<String>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

/// Non-primary-key index of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: String,
    pub table: String,
    pub is_unique: bool,
    /// Key columns in ascending key-ordinal order
    pub columns: Vec<String>,
    /// Non-key (`INCLUDE`) columns in fragment order
    pub include_columns: Vec<String>,
}

/// Group fragments by a name, keeping groups in first-seen order.
fn group_by_name<'a, T, F>(fragments: impl Iterator<Item = &'a T>, name: F) -> Vec<Vec<&'a T>>
where
    T: 'a,
    F: Fn(&T) -> &str,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&'a T>> = Vec::new();

    for fragment in fragments {
        match positions.get(name(fragment)) {
            Some(&idx) => groups[idx].push(fragment),
            None => {
                positions.insert(name(fragment), groups.len());
                groups.push(vec![fragment]);
            }
        }
    }

    groups
}

/// Column name absent from a fragment: empty, or sqlcmd's `NULL`.
fn is_missing(column: &str) -> bool {
    column.is_empty() || column.eq_ignore_ascii_case("NULL")
}

/// Build the primary key of `table`, if it has one.
///
/// Columns are ordered by key ordinal with a stable sort, so duplicate
/// ordinals fall back to fragment order. More than one constraint name for the
/// same table is an error.
pub fn aggregate_primary_key(
    table: &str,
    fragments: &[PrimaryKeyFragment],
) -> Result<Option<PrimaryKeyDefinition>> {
    let mut table_fragments: Vec<&PrimaryKeyFragment> =
        fragments.iter().filter(|f| f.table == table).collect();

    let Some(first) = table_fragments.first() else {
        return Ok(None);
    };
    let name = first.constraint.clone();

    if let Some(other) = table_fragments.iter().find(|f| f.constraint != name) {
        return Err(SchemaScriptError::ConflictingPrimaryKey {
            table: table.to_string(),
            first: name,
            second: other.constraint.clone(),
        });
    }

    table_fragments.sort_by_key(|f| f.key_ordinal);
    if table_fragments
        .windows(2)
        .any(|pair| pair[0].key_ordinal == pair[1].key_ordinal)
    {
        tracing::debug!(
            table,
            constraint = %name,
            "duplicate primary key ordinals; keeping fragment order for ties"
        );
    }

    Ok(Some(PrimaryKeyDefinition {
        name,
        columns: table_fragments.iter().map(|f| f.column.clone()).collect(),
    }))
}

/// Build the foreign keys owned by `table`, in first-seen order.
///
/// Every fragment of one constraint must agree on the referenced table and on
/// both referential actions. The owning and referenced column lists must have
/// equal length, and every fragment must name both its owning and its
/// referenced column. An empty or `NULL` column name counts as missing.
pub fn aggregate_foreign_keys(
    table: &str,
    fragments: &[ForeignKeyFragment],
) -> Result<Vec<ForeignKeyDefinition>> {
    let groups = group_by_name(fragments.iter().filter(|f| f.table == table), |f| {
        f.constraint.as_str()
    });

    groups
        .into_iter()
        .map(|group| {
            let first = group[0];
            for fragment in &group[1..] {
                let detail = if fragment.referenced_table != first.referenced_table {
                    Some(format!(
                        "referenced table {} vs {}",
                        first.referenced_table, fragment.referenced_table
                    ))
                } else if fragment.on_delete != first.on_delete
                    || fragment.on_update != first.on_update
                {
                    Some("referential actions differ".to_string())
                } else {
                    None
                };
                if let Some(detail) = detail {
                    return Err(SchemaScriptError::InconsistentFragment {
                        kind: "foreign key",
                        name: first.constraint.clone(),
                        detail,
                    });
                }
            }

            let owning = group.iter().filter(|f| !is_missing(&f.column)).count();
            let referenced = group
                .iter()
                .filter(|f| !is_missing(&f.referenced_column))
                .count();
            if owning != referenced || owning == 0 {
                return Err(SchemaScriptError::ForeignKeyColumnMismatch {
                    constraint: first.constraint.clone(),
                    owning,
                    referenced,
                });
            }

            // Equal counts can still hide pairs missing opposite sides
            if let Some(position) = group
                .iter()
                .position(|f| is_missing(&f.column) || is_missing(&f.referenced_column))
            {
                return Err(SchemaScriptError::InconsistentFragment {
                    kind: "foreign key",
                    name: first.constraint.clone(),
                    detail: format!("column pair {} is missing one side", position + 1),
                });
            }

            let columns: Vec<String> = group.iter().map(|f| f.column.clone()).collect();
            let referenced_columns: Vec<String> =
                group.iter().map(|f| f.referenced_column.clone()).collect();

            Ok(ForeignKeyDefinition {
                name: first.constraint.clone(),
                table: first.table.clone(),
                columns,
                referenced_table: first.referenced_table.clone(),
                referenced_columns,
                on_delete: first.on_delete,
                on_update: first.on_update,
            })
        })
        .collect()
}

/// Build the indexes of `table`, in first-seen order.
///
/// Fragments are scoped to `table` before grouping, since index names are only
/// unique per table. Key ordinal `0` marks an included column. An index made
/// only of ordinal-0 columns (e.g. a columnstore index) has its columns written
/// as key columns in fragment order.
pub fn aggregate_indexes(table: &str, fragments: &[IndexFragment]) -> Result<Vec<IndexDefinition>> {
    let groups = group_by_name(fragments.iter().filter(|f| f.table == table), |f| {
        f.index.as_str()
    });

    groups
        .into_iter()
        .map(|mut group| {
            let first = group[0];
            if group.iter().any(|f| f.is_unique != first.is_unique) {
                return Err(SchemaScriptError::InconsistentFragment {
                    kind: "index",
                    name: first.index.clone(),
                    detail: "uniqueness flag differs between columns".to_string(),
                });
            }

            if group.iter().all(|f| f.key_ordinal == 0) {
                tracing::warn!(
                    table,
                    index = %first.index,
                    "index has no key columns; writing its columns as keys"
                );
                return Ok(IndexDefinition {
                    name: first.index.clone(),
                    table: first.table.clone(),
                    is_unique: first.is_unique,
                    columns: group.iter().map(|f| f.column.clone()).collect(),
                    include_columns: Vec::new(),
                });
            }

            let include_columns = group
                .iter()
                .filter(|f| f.key_ordinal == 0)
                .map(|f| f.column.clone())
                .collect();
            group.retain(|f| f.key_ordinal != 0);
            group.sort_by_key(|f| f.key_ordinal);

            Ok(IndexDefinition {
                name: first.index.clone(),
                table: first.table.clone(),
                is_unique: first.is_unique,
                columns: group.iter().map(|f| f.column.clone()).collect(),
                include_columns,
            })
        })
        .collect()
}
