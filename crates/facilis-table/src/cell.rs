// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use time::Date;

/// A single projected value. Columns map rows to cells; the table only
/// ever looks at rows through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Money(i64),
    Date(Date),
    Bool(bool),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Stringified form used for search matching and as the default cell
    /// rendering.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Decimal(value) => value.to_string(),
            Self::Money(cents) => format_money(*cents),
            Self::Date(value) => value.to_string(),
            Self::Bool(true) => "yes".to_owned(),
            Self::Bool(false) => "no".to_owned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(value) => value.is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Text counts when it parses as a finite
    /// number after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Decimal(value) if value.is_finite() => Some(*value),
            Self::Money(cents) => Some(*cents as f64 / 100.0),
            Self::Text(value) => parse_number(value),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Date> for CellValue {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Empty)
    }
}

/// Ordering key for one cell. Keys group by kind first (empty cells, then
/// numbers, then dates, then text) so a column that mixes kinds still has a
/// total order: numbers sort ahead of text rather than against its string
/// form.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Empty,
    Number(f64),
    Date(Date),
    Text { folded: String, raw: String },
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Number(_) => 1,
            Self::Date(_) => 2,
            Self::Text { .. } => 3,
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Date(left), Self::Date(right)) => left.cmp(right),
            (
                Self::Text { folded, raw },
                Self::Text {
                    folded: other_folded,
                    raw: other_raw,
                },
            ) => folded.cmp(other_folded).then_with(|| raw.cmp(other_raw)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl CellValue {
    /// Numbers (including numeric text) compare numerically, dates
    /// chronologically, and everything else case-insensitively with the raw
    /// string as tiebreak. Booleans order as their `no`/`yes` text.
    pub fn sort_key(&self) -> SortKey {
        if self.is_empty() {
            return SortKey::Empty;
        }
        if let Self::Date(value) = self {
            return SortKey::Date(*value);
        }
        if let Some(number) = self.as_number() {
            return SortKey::Number(number);
        }
        let raw = self.display();
        SortKey::Text {
            folded: raw.to_lowercase(),
            raw,
        }
    }
}

/// Default sort comparator, an ordering over [`CellValue::sort_key`].
pub fn compare_values(left: &CellValue, right: &CellValue) -> Ordering {
    left.sort_key().cmp(&right.sort_key())
}

pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    let dollars = absolute / 100;
    let cents_component = absolute % 100;
    format!("{sign}${dollars}.{cents_component:02}")
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}
