// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Next sort after a click on `key`: unsorted -> asc -> desc -> unsorted,
/// and any click on another column starts over at asc.
pub fn next_sort(current: Option<&SortSpec>, key: &str) -> Option<SortSpec> {
    match current {
        Some(sort) if sort.key == key => match sort.direction {
            SortDirection::Asc => Some(SortSpec::desc(key)),
            SortDirection::Desc => None,
        },
        _ => Some(SortSpec::asc(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::{SortSpec, next_sort};

    #[test]
    fn clicks_cycle_through_three_states() {
        let first = next_sort(None, "site");
        assert_eq!(first, Some(SortSpec::asc("site")));

        let second = next_sort(first.as_ref(), "site");
        assert_eq!(second, Some(SortSpec::desc("site")));

        let third = next_sort(second.as_ref(), "site");
        assert_eq!(third, None);
    }

    #[test]
    fn other_column_resets_to_ascending() {
        let current = SortSpec::desc("site");
        assert_eq!(next_sort(Some(&current), "tag"), Some(SortSpec::asc("tag")));

        let current = SortSpec::asc("site");
        assert_eq!(next_sort(Some(&current), "tag"), Some(SortSpec::asc("tag")));
    }
}
