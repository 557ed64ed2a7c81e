//! Build a schema snapshot from normalized catalog rows
//!
//! The builder is pure: the same rows always produce the same snapshot.
//! It validates what spans more than one table: duplicate column ordinals,
//! fragments that point at unknown tables, and primary or foreign keys whose
//! fragments disagree about their owning table. Per-constraint consistency is checked
//! when fragments are aggregated for emission.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::{Result, SchemaScriptError};
use crate::parser::{decode_routines, decode_rows, TabularRow};

use super::{
    Column, ForeignKeyFragment, IndexFragment, PrimaryKeyFragment, RoutineDefinition, RoutineKind,
    SchemaSnapshot, TableSnapshot,
};

/// Normalized rows of the six catalog listings
#[derive(Debug, Clone, Default)]
pub struct CatalogRows {
    pub columns: Vec<TabularRow>,
    pub primary_keys: Vec<TabularRow>,
    pub foreign_keys: Vec<TabularRow>,
    pub indexes: Vec<TabularRow>,
    pub procedures: Vec<TabularRow>,
    pub views: Vec<TabularRow>,
}

/// Typed records decoded from [`CatalogRows`]
#[derive(Debug, Clone, Default)]
pub struct CatalogRecords {
    pub columns: Vec<Column>,
    pub primary_keys: Vec<PrimaryKeyFragment>,
    pub foreign_keys: Vec<ForeignKeyFragment>,
    pub indexes: Vec<IndexFragment>,
    pub procedures: Vec<RoutineDefinition>,
    pub views: Vec<RoutineDefinition>,
}

impl CatalogRecords {
    /// Decode every listing into typed records.
    pub fn decode(rows: &CatalogRows) -> Result<Self> {
        Ok(Self {
            columns: decode_rows(&rows.columns)?,
            primary_keys: decode_rows(&rows.primary_keys)?,
            foreign_keys: decode_rows(&rows.foreign_keys)?,
            indexes: decode_rows(&rows.indexes)?,
            procedures: decode_routines(&rows.procedures, RoutineKind::Procedure)?,
            views: decode_routines(&rows.views, RoutineKind::View)?,
        })
    }

    /// Apply routine bodies fetched one object at a time.
    ///
    /// A definition replaces the body of a listed routine with the same name
    /// and kind. An unlisted routine is appended.
    pub fn merge_definitions(&mut self, definitions: Vec<RoutineDefinition>) {
        for definition in definitions {
            let target = match definition.kind {
                RoutineKind::Procedure => &mut self.procedures,
                RoutineKind::View => &mut self.views,
            };
            match target.iter_mut().find(|r| r.name == definition.name) {
                Some(existing) => existing.definition = definition.definition,
                None => target.push(definition),
            }
        }
    }
}

/// Build a snapshot from normalized rows.
pub fn build_snapshot(rows: &CatalogRows) -> Result<SchemaSnapshot> {
    build_from_records(CatalogRecords::decode(rows)?)
}

/// Build a snapshot from decoded records.
pub fn build_from_records(records: CatalogRecords) -> Result<SchemaSnapshot> {
    let CatalogRecords {
        columns,
        primary_keys,
        foreign_keys,
        indexes,
        procedures,
        views,
    } = records;

    // Table set comes from the column listing alone
    let mut by_table: BTreeMap<String, Vec<Column>> = BTreeMap::new();
    for column in columns {
        by_table.entry(column.table.clone()).or_default().push(column);
    }
    for (table, columns) in by_table.iter_mut() {
        columns.sort_by_key(|c| c.ordinal);
        if let Some(pair) = columns
            .windows(2)
            .find(|pair| pair[0].ordinal == pair[1].ordinal)
        {
            return Err(SchemaScriptError::DuplicateColumnOrdinal {
                table: table.clone(),
                ordinal: pair[0].ordinal,
            });
        }
    }

    let known = |table: &str| by_table.contains_key(table);
    let mut primary_key_owners: HashMap<&str, &str> = HashMap::new();
    for fragment in &primary_keys {
        if !known(&fragment.table) {
            return Err(dangling("primary key", &fragment.constraint, &fragment.table));
        }
        let owner = primary_key_owners
            .entry(fragment.constraint.as_str())
            .or_insert(fragment.table.as_str());
        if *owner != fragment.table {
            return Err(SchemaScriptError::InconsistentFragment {
                kind: "primary key",
                name: fragment.constraint.clone(),
                detail: format!("owned by both {} and {}", owner, fragment.table),
            });
        }
    }
    for fragment in &foreign_keys {
        if !known(&fragment.table) {
            return Err(dangling("foreign key", &fragment.constraint, &fragment.table));
        }
        if !known(&fragment.referenced_table) {
            return Err(dangling(
                "foreign key",
                &fragment.constraint,
                &fragment.referenced_table,
            ));
        }
    }
    for fragment in &indexes {
        if !known(&fragment.table) {
            return Err(dangling("index", &fragment.index, &fragment.table));
        }
    }

    let foreign_key_order = foreign_key_order(&foreign_keys)?;
    let order = order_tables(by_table.keys().map(String::as_str), &foreign_keys);

    let mut tables: HashMap<String, TableSnapshot> = by_table
        .into_iter()
        .map(|(name, columns)| {
            let table = TableSnapshot {
                name: name.clone(),
                columns,
                primary_key: Vec::new(),
                foreign_keys: Vec::new(),
                indexes: Vec::new(),
            };
            (name, table)
        })
        .collect();

    for fragment in primary_keys {
        if let Some(table) = tables.get_mut(&fragment.table) {
            table.primary_key.push(fragment);
        }
    }
    for fragment in foreign_keys {
        if let Some(table) = tables.get_mut(&fragment.table) {
            table.foreign_keys.push(fragment);
        }
    }
    for fragment in indexes {
        if let Some(table) = tables.get_mut(&fragment.table) {
            table.indexes.push(fragment);
        }
    }

    let tables: Vec<TableSnapshot> = order
        .iter()
        .filter_map(|name| tables.remove(name))
        .collect();

    tracing::info!(
        tables = tables.len(),
        foreign_keys = foreign_key_order.len(),
        procedures = procedures.len(),
        views = views.len(),
        "built schema snapshot"
    );

    Ok(SchemaSnapshot::new(
        tables,
        foreign_key_order,
        procedures,
        views,
    ))
}

fn dangling(kind: &'static str, name: &str, table: &str) -> SchemaScriptError {
    SchemaScriptError::DanglingReference {
        kind,
        name: name.to_string(),
        table: table.to_string(),
    }
}

/// Distinct `(table, constraint)` pairs in first-seen order.
///
/// A constraint name owned by two different tables cannot be grouped.
fn foreign_key_order(fragments: &[ForeignKeyFragment]) -> Result<Vec<(String, String)>> {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    let mut order = Vec::new();

    for fragment in fragments {
        match owners.get(fragment.constraint.as_str()) {
            Some(owner) if *owner != fragment.table => {
                return Err(SchemaScriptError::InconsistentFragment {
                    kind: "foreign key",
                    name: fragment.constraint.clone(),
                    detail: format!("owned by both {} and {}", owner, fragment.table),
                });
            }
            Some(_) => {}
            None => {
                owners.insert(&fragment.constraint, &fragment.table);
                order.push((fragment.table.clone(), fragment.constraint.clone()));
            }
        }
    }

    Ok(order)
}

/// Order tables so that every referenced table precedes the tables that
/// reference it, breaking ties by name.
///
/// Self-references are ignored. Tables caught in a reference cycle are
/// appended by name once nothing else can be placed.
pub fn order_tables<'a>(
    tables: impl IntoIterator<Item = &'a str>,
    foreign_keys: &[ForeignKeyFragment],
) -> Vec<String> {
    // referenced table -> tables that reference it
    let mut dependents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for table in tables {
        dependents.entry(table).or_default();
    }

    let mut seen_edges: HashSet<(&str, &str)> = HashSet::new();
    let mut indegree: BTreeMap<&str, usize> = dependents.keys().map(|t| (*t, 0)).collect();
    for fk in foreign_keys {
        let (from, to) = (fk.referenced_table.as_str(), fk.table.as_str());
        if from == to || !dependents.contains_key(from) || !dependents.contains_key(to) {
            continue;
        }
        if seen_edges.insert((from, to)) {
            dependents.entry(from).or_default().insert(to);
            *indegree.entry(to).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<&str> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(table, _)| *table)
        .collect();
    let mut order: Vec<String> = Vec::with_capacity(dependents.len());

    while let Some(table) = ready.pop_first() {
        order.push(table.to_string());
        indegree.remove(table);
        if let Some(targets) = dependents.get(table) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*target);
                    }
                }
            }
        }
    }

    if !indegree.is_empty() {
        let cyclic: Vec<&str> = indegree.keys().copied().collect();
        tracing::warn!(
            tables = ?cyclic,
            "foreign key cycle; creating these tables in name order"
        );
        order.extend(cyclic.into_iter().map(str::to_string));
    }

    order
}
