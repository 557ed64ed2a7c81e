//! Schema metadata model

mod builder;
pub mod constraints;
pub mod data_type;
mod elements;
mod snapshot;

pub use builder::{build_from_records, build_snapshot, order_tables, CatalogRecords, CatalogRows};
pub use constraints::{
    aggregate_foreign_keys, aggregate_indexes, aggregate_primary_key, ForeignKeyDefinition,
    IndexDefinition, PrimaryKeyDefinition,
};
pub use data_type::{render_column_type, render_data_type, UNBOUNDED_LENGTH};
pub use elements::*;
pub use snapshot::{SchemaSnapshot, SchemaSummary, TableSnapshot};
