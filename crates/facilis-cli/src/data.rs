// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Rows loaded from a JSON file: an array of objects whose first element
//! names the columns.

use anyhow::{Context, Result, bail};
use facilis_table::{CellValue, Column, ColumnSet, RowId};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use time::Date;
use time::macros::format_description;

const ID_KEY: &str = "id";

#[derive(Debug, Clone, PartialEq)]
pub struct JsonRow {
    pub id: RowId,
    pub values: Map<String, Value>,
}

impl JsonRow {
    pub fn cell(&self, key: &str) -> CellValue {
        self.values.get(key).map_or(CellValue::Empty, json_cell)
    }
}

pub struct JsonData {
    pub columns: ColumnSet<JsonRow>,
    pub rows: Vec<JsonRow>,
}

pub fn load_json_rows(path: &Path) -> Result<JsonData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read data file {}", path.display()))?;
    parse_json_rows(&raw).with_context(|| format!("load rows from {}", path.display()))
}

pub fn parse_json_rows(raw: &str) -> Result<JsonData> {
    let value: Value = serde_json::from_str(raw).context("parse JSON")?;
    let Value::Array(items) = value else {
        bail!("expected a JSON array of objects at the top level");
    };

    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(object) = item else {
            bail!("row {index} is not a JSON object");
        };
        objects.push(object);
    }

    let Some(first) = objects.first() else {
        bail!("no rows to infer columns from");
    };
    let columns = ColumnSet::new(
        first
            .keys()
            .map(|key| {
                let accessor_key = key.clone();
                Column::new(key.clone(), column_label(key), move |row: &JsonRow| {
                    row.cell(&accessor_key)
                })
            })
            .collect(),
    )
    .context("infer columns from the first row")?;

    let ids = row_ids(&objects);
    let rows = objects
        .into_iter()
        .zip(ids)
        .map(|(values, id)| JsonRow { id, values })
        .collect();

    Ok(JsonData { columns, rows })
}

/// Uses each row's numeric `id` when every row has a distinct one, and the
/// row position otherwise.
fn row_ids(objects: &[Map<String, Value>]) -> Vec<RowId> {
    let explicit = objects
        .iter()
        .map(|object| object.get(ID_KEY).and_then(Value::as_i64))
        .collect::<Option<Vec<_>>>();

    if let Some(ids) = explicit {
        let distinct = ids.iter().collect::<BTreeSet<_>>().len();
        if distinct == ids.len() {
            return ids.into_iter().map(RowId::new).collect();
        }
        tracing::warn!(
            rows = ids.len(),
            distinct,
            "duplicate row ids in data; falling back to row positions"
        );
    }

    (0..objects.len())
        .map(|index| RowId::new(index as i64))
        .collect()
}

fn json_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(value) => CellValue::Bool(*value),
        Value::Number(number) => match number.as_i64() {
            Some(value) => CellValue::Integer(value),
            None => number
                .as_f64()
                .map_or_else(|| CellValue::text(number.to_string()), CellValue::Decimal),
        },
        Value::String(text) => parse_date(text).map_or_else(|| CellValue::text(text), CellValue::Date),
        Value::Array(_) | Value::Object(_) => CellValue::text(value.to_string()),
    }
}

fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw, &format_description!("[year]-[month]-[day]")).ok()
}

/// `purchase_date` -> `Purchase date`.
fn column_label(key: &str) -> String {
    let spaced = key.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}
