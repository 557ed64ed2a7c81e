//! Common test utilities for rust-schemascript tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use rust_schemascript::{GeneratedScript, ScriptOptions};

pub const COLUMNS_HEADER: &str = "TableName|ColumnName|DataType|MaxLength|Precision|Scale|IsNullable|IsIdentity|IdentitySeed|IdentityIncrement|DefaultValue|ColumnOrder\n---------|----------|--------|---------|---------|-----|----------|----------|------------|-----------------|------------|-----------\n";
pub const PRIMARY_KEYS_HEADER: &str =
    "TableName|ConstraintName|ColumnName|KeyOrder\n---------|--------------|----------|--------\n";
pub const FOREIGN_KEYS_HEADER: &str = "TableName|ConstraintName|ColumnName|ReferencedTable|ReferencedColumn|OnDelete|OnUpdate\n---------|--------------|----------|---------------|----------------|--------|--------\n";
pub const INDEXES_HEADER: &str =
    "TableName|IndexName|IsUnique|ColumnName|KeyOrder\n---------|---------|--------|----------|--------\n";

/// Columns of the `Users`/`Orders` sample catalog, deliberately out of order
pub const SAMPLE_COLUMNS: &str = "\
Orders|Id|int|4|10|0|0|1|1000|1||1
Orders|TenantId|int|4|10|0|0|0|NULL|NULL||2
Orders|UserId|int|4|10|0|0|0|NULL|NULL||3
Orders|Total|decimal|9|18|2|0|0|NULL|NULL|((0))|4
Orders|Note|nvarchar|-1|0|0|1|0|NULL|NULL||5
Users|TenantId|int|4|10|0|0|0|NULL|NULL||2
Users|Id|int|4|10|0|0|1|1|1||1
Users|Email|nvarchar|400|0|0|0|0|NULL|NULL||3
Users|CreatedAt|datetime2|8|27|7|0|0|NULL|NULL|(sysutcdatetime())|4
";

pub const SAMPLE_PRIMARY_KEYS: &str = "\
Orders|PK_Orders|Id|1
Users|PK_Users|Id|2
Users|PK_Users|TenantId|1
";

pub const SAMPLE_FOREIGN_KEYS: &str = "\
Orders|FK_Orders_Users|TenantId|Users|TenantId|CASCADE|NO_ACTION
Orders|FK_Orders_Users|UserId|Users|Id|CASCADE|NO_ACTION
";

pub const SAMPLE_INDEXES: &str = "\
Orders|IX_Orders_User|0|Total|0
Orders|IX_Orders_User|0|UserId|1
Users|UX_Users_Email|1|Email|1
";

pub const SAMPLE_PROCEDURES: &str = "\
ProcedureName|Definition
-------------|----------
usp_GetUser|CREATE PROCEDURE usp_GetUser @Id int AS SELECT * FROM Users WHERE Id = @Id

(1 rows affected)
";

pub const SAMPLE_VIEWS: &str = "\
ViewName|Definition
--------|----------
vOrderTotals|CREATE VIEW vOrderTotals AS SELECT UserId, SUM(Total) AS Total FROM Orders GROUP BY UserId

(1 rows affected)
";

/// Format listing rows with a header and a sqlcmd row-count trailer
pub fn listing(header: &str, rows: &str) -> String {
    let count = rows.lines().filter(|l| !l.trim().is_empty()).count();
    format!("{}{}\n({} rows affected)\n", header, rows, count)
}

/// Test context with a temporary dump directory
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub dump_dir: PathBuf,
}

impl TestContext {
    /// Create an empty dump directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dump_dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            dump_dir,
        }
    }

    /// Create a dump directory holding the `Users`/`Orders` sample catalog
    pub fn with_sample_catalog() -> Self {
        let ctx = Self::new();
        ctx.write_dump("columns.txt", &listing(COLUMNS_HEADER, SAMPLE_COLUMNS));
        ctx.write_dump(
            "primary_keys.txt",
            &listing(PRIMARY_KEYS_HEADER, SAMPLE_PRIMARY_KEYS),
        );
        ctx.write_dump(
            "foreign_keys.txt",
            &listing(FOREIGN_KEYS_HEADER, SAMPLE_FOREIGN_KEYS),
        );
        ctx.write_dump("indexes.txt", &listing(INDEXES_HEADER, SAMPLE_INDEXES));
        ctx.write_dump("procedures.txt", SAMPLE_PROCEDURES);
        ctx.write_dump("views.txt", SAMPLE_VIEWS);
        ctx
    }

    /// Write a file relative to the dump directory, creating parent directories
    pub fn write_dump(&self, relative: &str, content: &str) {
        let path = self.dump_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create dump subdirectory");
        }
        fs::write(&path, content).expect("Failed to write dump file");
    }

    pub fn path(&self) -> &Path {
        &self.dump_dir
    }

    /// Generate with the given options, panicking on failure
    pub fn generate(&self, options: &ScriptOptions) -> GeneratedScript {
        rust_schemascript::generate_from_dir(&self.dump_dir, options)
            .unwrap_or_else(|e| panic!("Generation failed: {:#}", e))
    }
}
