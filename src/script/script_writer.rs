//! Whole-schema script assembly.
//!
//! Section order is fixed: header, optional `USE`, drop section (foreign keys,
//! tables in reverse declared order, procedures, views), create-table section
//! in declared order, procedure bodies, view bodies. Each logical group is
//! closed by the batch separator.

use std::collections::HashSet;

use crate::error::Result;
use crate::model::{RoutineDefinition, RoutineKind, SchemaSnapshot, SchemaSummary};
use crate::{InvalidTablePolicy, ScriptOptions};

use super::identifier::{quote_identifier, quote_literal};
use super::table_writer::{write_table, TableScript};

const BANNER: &str = "-- ============================================";

/// A table left out of the create section because its metadata failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTable {
    pub name: String,
    pub reason: String,
}

/// Output of a whole-schema generation run
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub text: String,
    pub summary: SchemaSummary,
    pub skipped_tables: Vec<SkippedTable>,
}

/// Render the full schema script.
///
/// Table statements are rendered before anything is assembled. A validation
/// failure either aborts the run or, under [`InvalidTablePolicy::Skip`], drops
/// that table's statements as a whole, along with every table whose foreign
/// keys reference a dropped table. The summary counts emitted tables only.
pub fn write_schema_script(
    snapshot: &SchemaSnapshot,
    options: &ScriptOptions,
) -> Result<GeneratedScript> {
    let mut table_scripts: Vec<TableScript> = Vec::with_capacity(snapshot.tables().len());
    let mut skipped_tables = Vec::new();

    for table in snapshot.tables() {
        match write_table(table) {
            Ok(script) => table_scripts.push(script),
            Err(err)
                if err.is_validation() && options.on_invalid_table == InvalidTablePolicy::Skip =>
            {
                tracing::warn!(table = %table.name, error = %err, "skipping table");
                skipped_tables.push(SkippedTable {
                    name: table.name.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }
    cascade_skips(snapshot, &mut table_scripts, &mut skipped_tables);

    let emitted: HashSet<&str> = table_scripts.iter().map(|s| s.name.as_str()).collect();
    let summary = snapshot.summary_where(|table| emitted.contains(table.name.as_str()));

    let separator = options.batch_separator.as_str();
    let mut sql = write_header(snapshot, summary.tables, options);

    if let Some(database) = &options.database {
        sql.push_str(&format!("USE {};\n{}\n\n", quote_identifier(database), separator));
    }

    sql.push_str(&write_drop_section(snapshot));
    sql.push_str(&format!("\n{}\n\n", separator));

    sql.push_str(&section("CREATE TABLES"));
    for script in &table_scripts {
        sql.push_str(&script.to_sql());
    }
    sql.push_str(&format!("{}\n\n", separator));

    sql.push_str(&section("CREATE STORED PROCEDURES"));
    for procedure in snapshot.procedures() {
        sql.push_str(&write_routine(procedure, separator));
    }

    sql.push_str(&section("CREATE VIEWS"));
    for view in snapshot.views() {
        sql.push_str(&write_routine(view, separator));
    }

    tracing::info!(
        tables = table_scripts.len(),
        skipped = skipped_tables.len(),
        bytes = sql.len(),
        "generated schema script"
    );

    Ok(GeneratedScript {
        text: sql,
        summary,
        skipped_tables,
    })
}

/// Skip every table with a foreign key into an already skipped table,
/// repeating until no more tables are affected.
fn cascade_skips(
    snapshot: &SchemaSnapshot,
    table_scripts: &mut Vec<TableScript>,
    skipped_tables: &mut Vec<SkippedTable>,
) {
    let mut skipped: HashSet<String> = skipped_tables.iter().map(|t| t.name.clone()).collect();

    loop {
        let before = skipped_tables.len();
        table_scripts.retain(|script| {
            let Some(table) = snapshot.table(&script.name) else {
                return true;
            };
            let Some(fk) = table.foreign_keys.iter().find(|fk| {
                fk.referenced_table != table.name && skipped.contains(&fk.referenced_table)
            }) else {
                return true;
            };
            tracing::warn!(
                table = %table.name,
                referenced = %fk.referenced_table,
                constraint = %fk.constraint,
                "skipping table that references a skipped table"
            );
            skipped_tables.push(SkippedTable {
                name: table.name.clone(),
                reason: format!(
                    "references skipped table {} via {}",
                    fk.referenced_table, fk.constraint
                ),
            });
            skipped.insert(table.name.clone());
            false
        });
        if skipped_tables.len() == before {
            break;
        }
    }
}

/// Render a script holding only the procedures or only the views, ordered by name.
pub fn write_routine_script(
    snapshot: &SchemaSnapshot,
    kind: RoutineKind,
    options: &ScriptOptions,
) -> String {
    let mut routines: Vec<&RoutineDefinition> = snapshot.routines(kind).iter().collect();
    routines.sort_by(|a, b| a.name.cmp(&b.name));

    let title = match kind {
        RoutineKind::Procedure => "CREATE STORED PROCEDURES",
        RoutineKind::View => "CREATE VIEWS",
    };
    let mut sql = section(title);
    for routine in routines {
        sql.push_str(&write_routine(routine, &options.batch_separator));
    }
    sql
}

fn section(title: &str) -> String {
    format!("{}\n-- {}\n{}\n\n", BANNER, title, BANNER)
}

fn write_header(snapshot: &SchemaSnapshot, table_count: usize, options: &ScriptOptions) -> String {
    let mut sql = format!("{}\n-- {}\n", BANNER, options.title);
    if let Some(generated_at) = options.generated_at {
        sql.push_str(&format!(
            "-- Generated: {}\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    sql.push_str(&format!(
        "-- Tables: {} | Stored Procedures: {} | Views: {}\n",
        table_count,
        snapshot.procedures().len(),
        snapshot.views().len()
    ));
    sql.push_str(BANNER);
    sql.push('\n');

    if options.server.is_some() || options.database.is_some() {
        if let Some(server) = &options.server {
            sql.push_str(&format!("-- Server: {}\n", server));
        }
        if let Some(database) = &options.database {
            sql.push_str(&format!("-- Database: {}\n", database));
        }
        sql.push_str(BANNER);
        sql.push('\n');
    }

    sql.push('\n');
    sql
}

/// Existence-guarded drops: foreign keys, tables (reverse declared order),
/// procedures, views.
fn write_drop_section(snapshot: &SchemaSnapshot) -> String {
    let mut sql = section("DROP EXISTING OBJECTS");

    sql.push_str("-- Drop foreign keys first\n");
    for (table, constraint) in snapshot.foreign_key_names() {
        sql.push_str(&format!(
            "IF EXISTS (SELECT * FROM sys.foreign_keys WHERE name = {})\n    ALTER TABLE {} DROP CONSTRAINT {};\n",
            quote_literal(constraint),
            quote_identifier(table),
            quote_identifier(constraint)
        ));
    }

    sql.push_str("\n-- Drop tables\n");
    for table in snapshot.tables().iter().rev() {
        let name = quote_identifier(&table.name);
        sql.push_str(&format!(
            "IF OBJECT_ID({}, 'U') IS NOT NULL DROP TABLE {};\n",
            quote_literal(&name),
            name
        ));
    }

    for (kind, heading) in [
        (RoutineKind::Procedure, "\n-- Drop stored procedures\n"),
        (RoutineKind::View, "\n-- Drop views\n"),
    ] {
        sql.push_str(heading);
        for routine in snapshot.routines(kind) {
            let name = quote_identifier(&routine.name);
            sql.push_str(&format!(
                "IF OBJECT_ID({}, '{}') IS NOT NULL DROP {} {};\n",
                quote_literal(&name),
                kind.object_type(),
                kind.keyword(),
                name
            ));
        }
    }

    sql
}

/// Comment line, verbatim body, batch separator.
fn write_routine(routine: &RoutineDefinition, separator: &str) -> String {
    format!(
        "-- {}: {}\n{}\n{}\n\n",
        routine.kind.label(),
        routine.name,
        routine.definition,
        separator
    )
}
