//! Whole-script generation tests over on-disk dump directories

use pretty_assertions::assert_eq;

use rust_schemascript::{InvalidTablePolicy, ScriptOptions, SchemaScriptError};

use crate::common::{
    listing, TestContext, COLUMNS_HEADER, FOREIGN_KEYS_HEADER, PRIMARY_KEYS_HEADER,
};

const EXPECTED_SAMPLE_SCRIPT: &str = "\
-- ============================================
-- Database Schema
-- Tables: 2 | Stored Procedures: 1 | Views: 1
-- ============================================

-- ============================================
-- DROP EXISTING OBJECTS
-- ============================================

-- Drop foreign keys first
IF EXISTS (SELECT * FROM sys.foreign_keys WHERE name = 'FK_Orders_Users')
    ALTER TABLE [Orders] DROP CONSTRAINT [FK_Orders_Users];

-- Drop tables
IF OBJECT_ID('[Orders]', 'U') IS NOT NULL DROP TABLE [Orders];
IF OBJECT_ID('[Users]', 'U') IS NOT NULL DROP TABLE [Users];

-- Drop stored procedures
IF OBJECT_ID('[usp_GetUser]', 'P') IS NOT NULL DROP PROCEDURE [usp_GetUser];

-- Drop views
IF OBJECT_ID('[vOrderTotals]', 'V') IS NOT NULL DROP VIEW [vOrderTotals];

GO

-- ============================================
-- CREATE TABLES
-- ============================================

-- Table: Users
CREATE TABLE [Users] (
    [Id] int IDENTITY(1,1) NOT NULL,
    [TenantId] int NOT NULL,
    [Email] nvarchar(200) NOT NULL,
    [CreatedAt] datetime2 NOT NULL DEFAULT (sysutcdatetime()),
    CONSTRAINT [PK_Users] PRIMARY KEY CLUSTERED ([TenantId], [Id])
);
CREATE UNIQUE NONCLUSTERED INDEX [UX_Users_Email] ON [Users] ([Email]);

-- Table: Orders
CREATE TABLE [Orders] (
    [Id] int IDENTITY(1000,1) NOT NULL,
    [TenantId] int NOT NULL,
    [UserId] int NOT NULL,
    [Total] decimal(18,2) NOT NULL DEFAULT ((0)),
    [Note] nvarchar(MAX) NULL,
    CONSTRAINT [PK_Orders] PRIMARY KEY CLUSTERED ([Id])
);
ALTER TABLE [Orders] ADD CONSTRAINT [FK_Orders_Users] FOREIGN KEY ([TenantId], [UserId]) REFERENCES [Users] ([TenantId], [Id]) ON DELETE CASCADE;
CREATE NONCLUSTERED INDEX [IX_Orders_User] ON [Orders] ([UserId]) INCLUDE ([Total]);

GO

-- ============================================
-- CREATE STORED PROCEDURES
-- ============================================

-- Stored Procedure: usp_GetUser
CREATE PROCEDURE usp_GetUser @Id int AS SELECT * FROM Users WHERE Id = @Id
GO

-- ============================================
-- CREATE VIEWS
-- ============================================

-- View: vOrderTotals
CREATE VIEW vOrderTotals AS SELECT UserId, SUM(Total) AS Total FROM Orders GROUP BY UserId
GO

";

#[test]
fn test_sample_catalog_full_script() {
    let ctx = TestContext::with_sample_catalog();
    let script = ctx.generate(&ScriptOptions::default());

    assert_eq!(script.text, EXPECTED_SAMPLE_SCRIPT);
    assert!(script.skipped_tables.is_empty());
}

#[test]
fn test_sample_catalog_summary() {
    let ctx = TestContext::with_sample_catalog();
    let summary = ctx.generate(&ScriptOptions::default()).summary;

    assert_eq!(summary.tables, 2);
    assert_eq!(summary.procedures, 1);
    assert_eq!(summary.views, 1);
    assert_eq!(summary.primary_keys, 2);
    assert_eq!(summary.foreign_keys, 1);
    assert_eq!(summary.indexes, 2);
}

#[test]
fn test_generation_is_idempotent() {
    let ctx = TestContext::with_sample_catalog();
    let first = ctx.generate(&ScriptOptions::default());
    let second = ctx.generate(&ScriptOptions::default());
    assert_eq!(first.text, second.text);
}

#[test]
fn test_drop_order_is_reverse_of_create_order() {
    let ctx = TestContext::with_sample_catalog();
    let text = ctx.generate(&ScriptOptions::default()).text;

    let created: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("CREATE TABLE ["))
        .filter_map(|rest| rest.split(']').next())
        .collect();
    let mut dropped: Vec<&str> = text
        .lines()
        .filter(|line| line.contains("'U') IS NOT NULL DROP TABLE ["))
        .filter_map(|line| line.rsplit('[').next())
        .map(|rest| rest.trim_end_matches("];"))
        .collect();
    dropped.reverse();

    assert_eq!(created, vec!["Users", "Orders"]);
    assert_eq!(dropped, created);

    let fk_drop = text.find("DROP CONSTRAINT [FK_Orders_Users]").unwrap();
    let orders_drop = text.find("DROP TABLE [Orders]").unwrap();
    assert!(fk_drop < orders_drop);
}

#[test]
fn test_header_with_database_server_and_timestamp() {
    let ctx = TestContext::with_sample_catalog();
    let generated_at = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|d| d.and_hms_opt(14, 5, 0))
        .unwrap();
    let options = ScriptOptions {
        database: Some("Sales".to_string()),
        server: Some("db01".to_string()),
        title: "Sales Schema".to_string(),
        generated_at: Some(generated_at),
        ..Default::default()
    };
    let text = ctx.generate(&options).text;

    let expected_header = "\
-- ============================================
-- Sales Schema
-- Generated: 2024-03-09 14:05:00
-- Tables: 2 | Stored Procedures: 1 | Views: 1
-- ============================================
-- Server: db01
-- Database: Sales
-- ============================================

USE [Sales];
GO

-- ============================================
-- DROP EXISTING OBJECTS
";
    assert!(
        text.starts_with(expected_header),
        "unexpected header:\n{}",
        &text[..expected_header.len().min(text.len())]
    );
}

#[test]
fn test_standalone_definition_replaces_listing_body() {
    let ctx = TestContext::with_sample_catalog();
    ctx.write_dump(
        "procedures/usp_GetUser.sql",
        "CREATE PROCEDURE usp_GetUser\n    @Id int\nAS\nBEGIN\n    SELECT * FROM Users WHERE Id = @Id;\nEND\n\n(1 rows affected)\n",
    );
    ctx.write_dump(
        "procedures/usp_Purge.sql",
        "CREATE PROCEDURE usp_Purge AS DELETE FROM Orders\n",
    );

    let script = ctx.generate(&ScriptOptions::default());
    assert!(script.text.contains(
        "-- Stored Procedure: usp_GetUser\nCREATE PROCEDURE usp_GetUser\n    @Id int\nAS\nBEGIN\n    SELECT * FROM Users WHERE Id = @Id;\nEND\nGO\n\n"
    ));
    assert!(script
        .text
        .contains("-- Stored Procedure: usp_Purge\nCREATE PROCEDURE usp_Purge AS DELETE FROM Orders\nGO\n\n"));
    assert!(!script.text.contains("rows affected"));
    assert_eq!(script.summary.procedures, 2);
}

#[test]
fn test_duplicate_ordinal_aborts_without_output() {
    let ctx = TestContext::new();
    ctx.write_dump(
        "columns.txt",
        &listing(
            COLUMNS_HEADER,
            "Orders|Id|int|4|10|0|0|0|NULL|NULL||1\nOrders|Code|int|4|10|0|0|0|NULL|NULL||1\n",
        ),
    );

    let err = rust_schemascript::generate_from_dir(ctx.path(), &ScriptOptions::default())
        .unwrap_err();
    match err.downcast_ref::<SchemaScriptError>() {
        Some(SchemaScriptError::DuplicateColumnOrdinal { table, ordinal }) => {
            assert_eq!(table, "Orders");
            assert_eq!(*ordinal, 1);
        }
        other => panic!("expected DuplicateColumnOrdinal, got {:?}", other),
    }
    assert!(!ctx.path().join("schema.sql").exists());
}

#[test]
fn test_skip_policy_omits_invalid_table() {
    let ctx = TestContext::new();
    ctx.write_dump(
        "columns.txt",
        &listing(
            COLUMNS_HEADER,
            "Parent|Id|int|4|10|0|0|0|NULL|NULL||1\n\
             Parent|Code|int|4|10|0|0|0|NULL|NULL||2\n\
             Child|ParentId|int|4|10|0|0|0|NULL|NULL||1\n\
             GrandChild|ChildId|int|4|10|0|0|0|NULL|NULL||1\n",
        ),
    );
    // Two owning columns, one referenced column; GrandChild depends on Child
    ctx.write_dump(
        "foreign_keys.txt",
        &listing(
            FOREIGN_KEYS_HEADER,
            "Child|FK_Child_Parent|ParentId|Parent|Id|NO_ACTION|NO_ACTION\n\
             Child|FK_Child_Parent|ParentId|Parent||NO_ACTION|NO_ACTION\n\
             GrandChild|FK_GrandChild_Child|ChildId|Child|ParentId|NO_ACTION|NO_ACTION\n",
        ),
    );
    ctx.write_dump(
        "primary_keys.txt",
        &listing(PRIMARY_KEYS_HEADER, "Parent|PK_Parent|Id|1\n"),
    );

    let aborted = rust_schemascript::generate_from_dir(ctx.path(), &ScriptOptions::default());
    assert!(aborted.is_err());

    let options = ScriptOptions {
        on_invalid_table: InvalidTablePolicy::Skip,
        ..Default::default()
    };
    let script = ctx.generate(&options);

    assert_eq!(script.skipped_tables.len(), 2);
    assert_eq!(script.skipped_tables[0].name, "Child");
    assert_eq!(script.skipped_tables[1].name, "GrandChild");
    assert!(script.text.contains("CREATE TABLE [Parent]"));
    assert!(!script.text.contains("CREATE TABLE [Child]"));
    assert!(!script.text.contains("CREATE TABLE [GrandChild]"));
    assert!(!script.text.contains("ADD CONSTRAINT [FK_Child_Parent]"));
    assert!(!script.text.contains("REFERENCES [Child]"));
    // Both are still dropped
    assert!(script
        .text
        .contains("IF OBJECT_ID('[GrandChild]', 'U') IS NOT NULL DROP TABLE [GrandChild];\n"));
    assert!(script
        .text
        .contains("-- Tables: 1 | Stored Procedures: 0 | Views: 0\n"));
    assert_eq!(script.summary.tables, 1);
    assert_eq!(script.summary.primary_keys, 1);
    assert_eq!(script.summary.foreign_keys, 0);
}

#[test]
fn test_routine_only_scripts() {
    let ctx = TestContext::with_sample_catalog();
    let options = ScriptOptions::default();
    let dumps = rust_schemascript::CatalogDumps::load(ctx.path()).unwrap();
    let snapshot = rust_schemascript::parse_catalog(&dumps, &options).unwrap();

    let views = rust_schemascript::script::write_routine_script(
        &snapshot,
        rust_schemascript::RoutineKind::View,
        &options,
    );
    assert_eq!(
        views,
        "-- ============================================\n\
         -- CREATE VIEWS\n\
         -- ============================================\n\
         \n\
         -- View: vOrderTotals\n\
         CREATE VIEW vOrderTotals AS SELECT UserId, SUM(Total) AS Total FROM Orders GROUP BY UserId\n\
         GO\n\
         \n"
    );
}
