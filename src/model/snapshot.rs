//! In-memory reconstruction of a schema from catalog metadata

use std::collections::HashSet;

use super::{
    Column, ForeignKeyFragment, IndexFragment, PrimaryKeyFragment, RoutineDefinition, RoutineKind,
};

/// One table with its columns and the fragments scoped to it
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub name: String,
    /// Columns in ascending ordinal order
    pub columns: Vec<Column>,
    pub primary_key: Vec<PrimaryKeyFragment>,
    /// Foreign key fragments owned by this table
    pub foreign_keys: Vec<ForeignKeyFragment>,
    pub indexes: Vec<IndexFragment>,
}

/// Object counts reported after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaSummary {
    pub tables: usize,
    pub procedures: usize,
    pub views: usize,
    pub primary_keys: usize,
    pub foreign_keys: usize,
    pub indexes: usize,
}

/// The complete schema reconstruction, built once per run and read-only after.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    /// Tables in declared (creation) order
    tables: Vec<TableSnapshot>,
    /// `(table, constraint)` of every foreign key, in first-seen order
    foreign_key_order: Vec<(String, String)>,
    procedures: Vec<RoutineDefinition>,
    views: Vec<RoutineDefinition>,
}

impl SchemaSnapshot {
    pub(crate) fn new(
        tables: Vec<TableSnapshot>,
        foreign_key_order: Vec<(String, String)>,
        procedures: Vec<RoutineDefinition>,
        views: Vec<RoutineDefinition>,
    ) -> Self {
        Self {
            tables,
            foreign_key_order,
            procedures,
            views,
        }
    }

    /// Tables in declared order; referenced tables precede their dependents.
    pub fn tables(&self) -> &[TableSnapshot] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// `(owning table, constraint name)` pairs in first-seen order
    pub fn foreign_key_names(&self) -> &[(String, String)] {
        &self.foreign_key_order
    }

    pub fn procedures(&self) -> &[RoutineDefinition] {
        &self.procedures
    }

    pub fn views(&self) -> &[RoutineDefinition] {
        &self.views
    }

    pub fn routines(&self, kind: RoutineKind) -> &[RoutineDefinition] {
        match kind {
            RoutineKind::Procedure => &self.procedures,
            RoutineKind::View => &self.views,
        }
    }

    /// Count objects, counting constraints and indexes by distinct name.
    pub fn summary(&self) -> SchemaSummary {
        self.summary_where(|_| true)
    }

    /// Like [`summary`](Self::summary), counting only the tables `include`
    /// accepts along with the keys and indexes they own.
    pub fn summary_where(&self, include: impl Fn(&TableSnapshot) -> bool) -> SchemaSummary {
        let mut tables = HashSet::new();
        let mut primary_keys = HashSet::new();
        let mut indexes = HashSet::new();
        for table in self.tables.iter().filter(|t| include(t)) {
            tables.insert(table.name.as_str());
            primary_keys.extend(table.primary_key.iter().map(|f| f.constraint.as_str()));
            indexes.extend(
                table
                    .indexes
                    .iter()
                    .map(|f| (table.name.as_str(), f.index.as_str())),
            );
        }

        SchemaSummary {
            tables: tables.len(),
            procedures: self.procedures.len(),
            views: self.views.len(),
            primary_keys: primary_keys.len(),
            foreign_keys: self
                .foreign_key_order
                .iter()
                .filter(|(table, _)| tables.contains(table.as_str()))
                .count(),
            indexes: indexes.len(),
        }
    }
}
