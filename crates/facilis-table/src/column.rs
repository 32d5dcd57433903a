// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::CellValue;

type Accessor<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

pub struct Column<R> {
    key: String,
    label: String,
    sortable: bool,
    draggable: bool,
    default_visible: bool,
    accessor: Accessor<R>,
}

impl<R> Column<R> {
    /// Sortable, draggable and visible unless told otherwise.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        accessor: impl Fn(&R) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            draggable: true,
            default_visible: true,
            accessor: Arc::new(accessor),
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn hidden_by_default(mut self) -> Self {
        self.default_visible = false;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    pub fn is_default_visible(&self) -> bool {
        self.default_visible
    }

    pub fn value(&self, row: &R) -> CellValue {
        (self.accessor)(row)
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            sortable: self.sortable,
            draggable: self.draggable,
            default_visible: self.default_visible,
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("draggable", &self.draggable)
            .field("default_visible", &self.default_visible)
            .finish_non_exhaustive()
    }
}

/// Validated column configuration in its configured order.
#[derive(Debug)]
pub struct ColumnSet<R> {
    columns: Vec<Column<R>>,
}

impl<R> ColumnSet<R> {
    pub fn new(columns: Vec<Column<R>>) -> Result<Self> {
        if columns.is_empty() {
            bail!("a table needs at least one column");
        }

        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.key.trim().is_empty() {
                bail!("column labeled {:?} has an empty key", column.label);
            }
            if !seen.insert(column.key.as_str()) {
                bail!(
                    "duplicate column key {:?}; column keys must be unique",
                    column.key
                );
            }
        }

        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column<R>> {
        self.columns.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.key.clone()).collect()
    }
}

impl<R> Clone for ColumnSet<R> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, ColumnSet};
    use crate::CellValue;

    fn text_column(key: &str) -> Column<String> {
        Column::new(key, key.to_uppercase(), |row: &String| CellValue::text(row.clone()))
    }

    #[test]
    fn column_defaults_are_sortable_draggable_and_visible() {
        let column = text_column("name");
        assert!(column.is_sortable());
        assert!(column.is_draggable());
        assert!(column.is_default_visible());
        assert_eq!(column.value(&"pump".to_owned()), CellValue::text("pump"));

        let column = column.sortable(false).draggable(false).hidden_by_default();
        assert!(!column.is_sortable());
        assert!(!column.is_draggable());
        assert!(!column.is_default_visible());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let error = ColumnSet::new(vec![text_column("name"), text_column("name")])
            .expect_err("duplicate keys should fail");
        assert!(error.to_string().contains("duplicate column key"));
    }

    #[test]
    fn empty_configuration_is_rejected() {
        let error = ColumnSet::<String>::new(Vec::new()).expect_err("empty set should fail");
        assert!(error.to_string().contains("at least one column"));

        let error = ColumnSet::new(vec![text_column(" ")]).expect_err("blank key should fail");
        assert!(error.to_string().contains("empty key"));
    }

    #[test]
    fn lookup_by_key() -> anyhow::Result<()> {
        let set = ColumnSet::new(vec![text_column("tag"), text_column("site")])?;
        assert_eq!(set.keys(), vec!["tag".to_owned(), "site".to_owned()]);
        assert!(set.contains("site"));
        assert!(set.get("vendor").is_none());
        Ok(())
    }
}
