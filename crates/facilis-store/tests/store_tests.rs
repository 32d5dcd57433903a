// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use facilis_store::{SqliteStore, validate_db_path};
use facilis_table::{KeyValueStore, Table, TableCommand, TableOptions};
use facilis_testkit::{asset_columns, asset_id, sample_assets, temp_db_path};

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("").is_err());
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("/tmp/facilis.db").is_ok());
    assert!(validate_db_path(":memory:").is_ok());
}

#[test]
fn bootstrap_is_idempotent() -> Result<()> {
    let store = SqliteStore::open_memory()?;
    store.bootstrap()?;
    store.bootstrap()?;
    assert!(store.list_preferences()?.is_empty());
    Ok(())
}

#[test]
fn bootstrap_rejects_preferences_missing_required_column() -> Result<()> {
    let store = SqliteStore::open_memory()?;
    store
        .raw_connection()
        .execute_batch("CREATE TABLE preferences (key TEXT PRIMARY KEY, value TEXT NOT NULL);")?;

    let error = store.bootstrap().expect_err("schema should be rejected");
    assert!(
        error.to_string().contains("updated_at"),
        "unexpected error: {error:#}"
    );
    Ok(())
}

#[test]
fn set_overwrites_and_get_reads_back() -> Result<()> {
    let mut store = SqliteStore::open_memory()?;
    store.bootstrap()?;

    assert_eq!(store.get("assets")?, None);
    store.set("assets", r#"{"order":[],"visibility":{}}"#)?;
    store.set("assets", r#"{"order":["tag"],"visibility":{}}"#)?;
    assert_eq!(
        store.get("assets")?,
        Some(r#"{"order":["tag"],"visibility":{}}"#.to_owned())
    );

    let preferences = store.list_preferences()?;
    assert_eq!(preferences.len(), 1);
    assert_eq!(preferences[0].key, "assets");

    assert!(store.delete_preference("assets")?);
    assert!(!store.delete_preference("assets")?);
    assert_eq!(store.get("assets")?, None);
    Ok(())
}

#[test]
fn unbootstrapped_store_reports_errors() -> Result<()> {
    let mut store = SqliteStore::open_memory()?;
    assert!(store.get("assets").is_err());
    assert!(store.set("assets", "{}").is_err());
    Ok(())
}

#[test]
fn table_layout_survives_reopen() -> Result<()> {
    let (_dir, path) = temp_db_path()?;
    let options = TableOptions {
        storage_key: Some("assets".to_owned()),
        ..TableOptions::default()
    };

    {
        let store = SqliteStore::open(&path)?;
        store.bootstrap()?;
        let mut table = Table::new(asset_columns()?, asset_id, options.clone())
            .with_store(Box::new(store))
            .with_rows(sample_assets(5, 12));
        table.dispatch(TableCommand::ToggleVisibility("notes".to_owned()));
        table.dispatch(TableCommand::MoveColumn {
            key: "site".to_owned(),
            delta: -2,
        });
    }

    let store = SqliteStore::open(&path)?;
    store.bootstrap()?;
    let table = Table::new(asset_columns()?, asset_id, options).with_store(Box::new(store));
    assert_eq!(
        table.state().visible_keys(),
        vec!["tag", "site", "name", "category", "status", "purchased", "cost"]
    );
    Ok(())
}
