//! Dump directory loading tests

use rust_schemascript::{CatalogDumps, CatalogQuery, ScriptOptions, SchemaScriptError};

use crate::common::{listing, TestContext, COLUMNS_HEADER, SAMPLE_COLUMNS};

#[test]
fn test_columns_only_directory() {
    let ctx = TestContext::new();
    ctx.write_dump("columns.txt", &listing(COLUMNS_HEADER, SAMPLE_COLUMNS));

    let script = ctx.generate(&ScriptOptions::default());
    assert_eq!(script.summary.tables, 2);
    assert_eq!(script.summary.foreign_keys, 0);
    // Without foreign keys tables are created in name order
    let orders = script.text.find("CREATE TABLE [Orders]").unwrap();
    let users = script.text.find("CREATE TABLE [Users]").unwrap();
    assert!(orders < users);
    assert!(!script.text.contains("PRIMARY KEY"));
}

#[test]
fn test_missing_columns_listing_is_an_error() {
    let ctx = TestContext::new();
    let err = CatalogDumps::load(ctx.path()).unwrap_err();
    match err {
        SchemaScriptError::InputReadError { path, .. } => {
            assert!(path.ends_with(CatalogQuery::Columns.file_name()));
        }
        other => panic!("expected InputReadError, got {:?}", other),
    }
}

#[test]
fn test_windows_1252_listing() {
    let ctx = TestContext::new();
    let mut bytes = COLUMNS_HEADER.as_bytes().to_vec();
    // "Año" as a column name, encoded in Windows-1252
    bytes.extend_from_slice(b"Sales|A\xF1o|int|4|10|0|1|0|NULL|NULL||1\n");
    std::fs::write(ctx.path().join("columns.txt"), bytes).unwrap();

    let script = ctx.generate(&ScriptOptions::default());
    assert!(script.text.contains("    [Año] int NULL"));
}

#[test]
fn test_bom_and_alternate_delimiter() {
    let ctx = TestContext::new();
    let columns = format!(
        "\u{FEFF}{}",
        listing(COLUMNS_HEADER, "T|Id|int|4|10|0|0|0|NULL|NULL||1\n").replace('|', ";")
    );
    ctx.write_dump("columns.txt", &columns);

    let options = ScriptOptions {
        delimiter: ';',
        ..Default::default()
    };
    let script = ctx.generate(&options);
    assert!(script.text.contains("CREATE TABLE [T] (\n    [Id] int NOT NULL\n);"));
}

#[test]
fn test_malformed_rows_are_skipped() {
    let ctx = TestContext::new();
    ctx.write_dump(
        "columns.txt",
        &listing(
            COLUMNS_HEADER,
            "T|Id|int|4|10|0|0|0|NULL|NULL||1\nT|Broken|int\nT|Name|varchar|50|0|0|1|0|NULL|NULL||2\n",
        ),
    );

    let dumps = CatalogDumps::load(ctx.path()).unwrap();
    let rows = dumps.parse('|');
    assert_eq!(rows.columns.len(), 2);

    let script = rust_schemascript::generate_script(&dumps, &ScriptOptions::default()).unwrap();
    assert!(script.text.contains("    [Name] varchar(50) NULL"));
    assert!(!script.text.contains("Broken"));
}

#[test]
fn test_write_output_creates_parent_directory() {
    let ctx = TestContext::with_sample_catalog();
    let script = ctx.generate(&ScriptOptions::default());
    let output = ctx.path().join("out").join("schema.sql");

    rust_schemascript::write_output(&output, &script.text).unwrap();
    assert_eq!(std::fs::read_to_string(&output).unwrap(), script.text);
}
