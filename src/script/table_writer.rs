//! Per-table DDL statement writing.
//!
//! A table is written as one `CREATE TABLE` statement (columns plus an inline
//! primary key), followed by one `ALTER TABLE ... ADD CONSTRAINT` per foreign
//! key and one `CREATE INDEX` per index. All statements of a table are
//! rendered before any of them is returned, so a validation failure never
//! leaves a half-written table behind.

use crate::error::{Result, SchemaScriptError};
use crate::model::{
    aggregate_foreign_keys, aggregate_indexes, aggregate_primary_key, render_column_type, Column,
    ForeignKeyDefinition, IndexDefinition, PrimaryKeyDefinition, TableSnapshot,
};

use super::identifier::{quote_column_list, quote_identifier};

/// Indentation of column and constraint clauses inside `CREATE TABLE`
const CLAUSE_INDENT: &str = "    ";

/// Rendered statements of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableScript {
    pub name: String,
    /// `CREATE TABLE` statement including its terminating `;`
    pub create_table: String,
    /// One `ALTER TABLE ... ADD CONSTRAINT` statement per foreign key
    pub foreign_keys: Vec<String>,
    /// One `CREATE INDEX` statement per index
    pub indexes: Vec<String>,
}

impl TableScript {
    /// The table's block in the create section, preceded by a comment line.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("-- Table: {}\n", self.name);
        sql.push_str(&self.create_table);
        sql.push('\n');
        for statement in self.foreign_keys.iter().chain(self.indexes.iter()) {
            sql.push_str(statement);
            sql.push('\n');
        }
        sql.push('\n');
        sql
    }
}

/// Render every statement of a table.
pub fn write_table(table: &TableSnapshot) -> Result<TableScript> {
    let primary_key = aggregate_primary_key(&table.name, &table.primary_key)?;
    let foreign_keys = aggregate_foreign_keys(&table.name, &table.foreign_keys)?;
    let indexes = aggregate_indexes(&table.name, &table.indexes)?;

    let mut clauses = table
        .columns
        .iter()
        .map(|column| write_column(&table.name, column))
        .collect::<Result<Vec<_>>>()?;
    if let Some(key) = &primary_key {
        clauses.push(write_primary_key(key));
    }

    let create_table = format!(
        "CREATE TABLE {} (\n{}\n);",
        quote_identifier(&table.name),
        clauses.join(",\n")
    );

    tracing::debug!(
        table = %table.name,
        columns = table.columns.len(),
        foreign_keys = foreign_keys.len(),
        indexes = indexes.len(),
        "rendered table"
    );

    Ok(TableScript {
        name: table.name.clone(),
        create_table,
        foreign_keys: foreign_keys.iter().map(write_foreign_key).collect(),
        indexes: indexes.iter().map(write_index).collect(),
    })
}

/// Render one column clause: name, type, identity, nullability, default.
pub fn write_column(table: &str, column: &Column) -> Result<String> {
    let mut clause = format!(
        "{}{} {}",
        CLAUSE_INDENT,
        quote_identifier(&column.name),
        render_column_type(column)
    );

    if column.is_identity {
        clause.push_str(&identity_clause(table, column)?);
    }

    clause.push_str(if column.is_nullable {
        " NULL"
    } else {
        " NOT NULL"
    });

    if let Some(default) = &column.default_value {
        clause.push_str(" DEFAULT ");
        clause.push_str(default);
    }

    Ok(clause)
}

/// `IDENTITY(seed,increment)`; both empty means the engine default `1,1`.
fn identity_clause(table: &str, column: &Column) -> Result<String> {
    let seed = column.identity_seed.as_str();
    let increment = column.identity_increment.as_str();
    match (seed.is_empty(), increment.is_empty()) {
        (true, true) => Ok(" IDENTITY(1,1)".to_string()),
        (false, false) => Ok(format!(" IDENTITY({},{})", seed, increment)),
        _ => Err(SchemaScriptError::PartialIdentity {
            table: table.to_string(),
            column: column.name.clone(),
        }),
    }
}

fn write_primary_key(key: &PrimaryKeyDefinition) -> String {
    format!(
        "{}CONSTRAINT {} PRIMARY KEY CLUSTERED ({})",
        CLAUSE_INDENT,
        quote_identifier(&key.name),
        quote_column_list(&key.columns)
    )
}

/// Render the `ALTER TABLE` statement adding a foreign key.
///
/// `NO ACTION` is the engine default and is left implicit.
pub fn write_foreign_key(fk: &ForeignKeyDefinition) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        quote_identifier(&fk.table),
        quote_identifier(&fk.name),
        quote_column_list(&fk.columns),
        quote_identifier(&fk.referenced_table),
        quote_column_list(&fk.referenced_columns)
    );
    if !fk.on_delete.is_no_action() {
        sql.push_str(" ON DELETE ");
        sql.push_str(fk.on_delete.sql());
    }
    if !fk.on_update.is_no_action() {
        sql.push_str(" ON UPDATE ");
        sql.push_str(fk.on_update.sql());
    }
    sql.push(';');
    sql
}

/// Render the `CREATE INDEX` statement for an index.
pub fn write_index(index: &IndexDefinition) -> String {
    let mut sql = format!(
        "CREATE {}NONCLUSTERED INDEX {} ON {} ({})",
        if index.is_unique { "UNIQUE " } else { "" },
        quote_identifier(&index.name),
        quote_identifier(&index.table),
        quote_column_list(&index.columns)
    );
    if !index.include_columns.is_empty() {
        sql.push_str(" INCLUDE (");
        sql.push_str(&quote_column_list(&index.include_columns));
        sql.push(')');
    }
    sql.push(';');
    sql
}
