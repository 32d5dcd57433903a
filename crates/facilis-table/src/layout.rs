// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::ColumnSet;

/// Column order and visibility, the part of the table state that outlives
/// a single mount. Stored as `{"order": [...], "visibility": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnLayout {
    pub order: Vec<String>,
    pub visibility: BTreeMap<String, bool>,
}

impl ColumnLayout {
    pub fn defaults<R>(columns: &ColumnSet<R>) -> Self {
        Self {
            order: columns.keys(),
            visibility: columns
                .iter()
                .map(|column| (column.key().to_owned(), column.is_default_visible()))
                .collect(),
        }
    }

    /// Parses a persisted layout and reconciles it with the configured
    /// columns. Returns `None` for anything that cannot be trusted: invalid
    /// JSON, a different shape, keys that are not configured, duplicated
    /// keys, or every column hidden. Configured keys missing from the blob
    /// are appended with their default visibility.
    pub fn restore<R>(raw: &str, columns: &ColumnSet<R>) -> Option<Self> {
        let persisted: ColumnLayout = serde_json::from_str(raw).ok()?;

        let mut seen = BTreeSet::new();
        for key in &persisted.order {
            if !columns.contains(key) || !seen.insert(key.as_str()) {
                return None;
            }
        }
        if persisted.visibility.keys().any(|key| !columns.contains(key)) {
            return None;
        }

        let mut order = persisted.order.clone();
        let mut visibility = BTreeMap::new();
        for column in columns.iter() {
            let key = column.key();
            if !seen.contains(key) {
                order.push(key.to_owned());
            }
            let visible = persisted
                .visibility
                .get(key)
                .copied()
                .unwrap_or(column.is_default_visible());
            visibility.insert(key.to_owned(), visible);
        }

        if !visibility.values().any(|visible| *visible) {
            return None;
        }

        Some(Self { order, visibility })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("encode column layout")
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visibility.get(key).copied().unwrap_or(false)
    }

    pub fn visible_keys(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|key| self.is_visible(key))
            .map(String::as_str)
            .collect()
    }
}

/// Moves the key at `from` to `to`, shifting the keys in between. Indices
/// outside the order (a drop with no valid target) leave it unchanged.
pub fn reorder(order: &[String], from: usize, to: usize) -> Vec<String> {
    let mut next = order.to_vec();
    if from >= next.len() || to >= next.len() || from == to {
        return next;
    }
    let key = next.remove(from);
    next.insert(to, key);
    next
}

#[cfg(test)]
mod tests {
    use super::{ColumnLayout, reorder};
    use crate::{CellValue, Column, ColumnSet};

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    fn columns() -> anyhow::Result<ColumnSet<()>> {
        ColumnSet::new(vec![
            Column::new("tag", "Tag", |_: &()| CellValue::Empty),
            Column::new("name", "Name", |_: &()| CellValue::Empty),
            Column::new("cost", "Cost", |_: &()| CellValue::Empty).hidden_by_default(),
        ])
    }

    #[test]
    fn reorder_moves_forward_and_backward() {
        let order = keys(&["a", "b", "c", "d"]);
        assert_eq!(reorder(&order, 0, 2), keys(&["b", "c", "a", "d"]));
        assert_eq!(reorder(&order, 3, 1), keys(&["a", "d", "b", "c"]));
    }

    #[test]
    fn reorder_outside_order_is_a_no_op() {
        let order = keys(&["a", "b", "c"]);
        assert_eq!(reorder(&order, 0, 3), order);
        assert_eq!(reorder(&order, 7, 0), order);
        assert_eq!(reorder(&order, 1, 1), order);
    }

    #[test]
    fn defaults_follow_configuration() -> anyhow::Result<()> {
        let layout = ColumnLayout::defaults(&columns()?);
        assert_eq!(layout.order, keys(&["tag", "name", "cost"]));
        assert_eq!(layout.visible_keys(), vec!["tag", "name"]);
        Ok(())
    }

    #[test]
    fn restore_accepts_well_formed_blob() -> anyhow::Result<()> {
        let raw = r#"{"order":["cost","tag","name"],"visibility":{"cost":true,"tag":false,"name":true}}"#;
        let layout = ColumnLayout::restore(raw, &columns()?).expect("valid layout");
        assert_eq!(layout.order, keys(&["cost", "tag", "name"]));
        assert_eq!(layout.visible_keys(), vec!["cost", "name"]);
        Ok(())
    }

    #[test]
    fn restore_appends_newly_configured_columns() -> anyhow::Result<()> {
        let raw = r#"{"order":["name"],"visibility":{"name":true}}"#;
        let layout = ColumnLayout::restore(raw, &columns()?).expect("valid layout");
        assert_eq!(layout.order, keys(&["name", "tag", "cost"]));
        assert!(layout.is_visible("tag"));
        assert!(!layout.is_visible("cost"));
        Ok(())
    }

    #[test]
    fn restore_discards_malformed_blobs() -> anyhow::Result<()> {
        let columns = columns()?;
        let malformed = [
            "not json",
            "[]",
            r#"{"order":"tag","visibility":{}}"#,
            r#"{"order":["tag","ghost"],"visibility":{}}"#,
            r#"{"order":["tag","tag"],"visibility":{}}"#,
            r#"{"order":["tag"],"visibility":{"ghost":true}}"#,
            r#"{"order":["tag"],"visibility":{"tag":"yes"}}"#,
            r#"{"order":["tag"],"visibility":{},"extra":1}"#,
            r#"{"order":[],"visibility":{"tag":false,"name":false,"cost":false}}"#,
        ];
        for raw in malformed {
            assert!(
                ColumnLayout::restore(raw, &columns).is_none(),
                "expected {raw} to be discarded"
            );
        }
        Ok(())
    }

    #[test]
    fn json_round_trip_shape() -> anyhow::Result<()> {
        let layout = ColumnLayout::defaults(&columns()?);
        let raw = layout.to_json()?;
        assert_eq!(
            raw,
            r#"{"order":["tag","name","cost"],"visibility":{"cost":false,"name":true,"tag":true}}"#
        );
        Ok(())
    }
}
