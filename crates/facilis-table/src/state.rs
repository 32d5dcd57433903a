// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::layout::reorder;
use crate::sort::next_sort;
use crate::{ColumnLayout, ColumnSet, RowId, SortDirection, SortSpec};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// UI state of one table instance. Every mutation keeps `layout` a
/// permutation of the configured keys with a visibility entry per key, and
/// keeps `sort` on a sortable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub layout: ColumnLayout,
    pub sort: Option<SortSpec>,
    pub search: String,
    pub page: usize,
    /// Rows per page; zero disables pagination.
    pub page_size: usize,
    pub selected: BTreeSet<RowId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    SortUnavailable(String),
    SortAsc(String),
    SortDesc(String),
    SortCleared,
    ColumnHidden(String),
    ColumnShown(String),
    KeepOneColumnVisible,
    ColumnsShown,
    ColumnMoved(String),
    ColumnPinned(String),
    SearchCleared,
    Selected(usize),
    SelectionCleared,
}

impl TableStatus {
    pub fn message(&self) -> String {
        match self {
            Self::SortUnavailable(label) => format!("sort unavailable: {label}"),
            Self::SortAsc(label) => format!("sort {label} asc"),
            Self::SortDesc(label) => format!("sort {label} desc"),
            Self::SortCleared => "sort cleared".to_owned(),
            Self::ColumnHidden(label) => format!("column hidden: {label}"),
            Self::ColumnShown(label) => format!("column shown: {label}"),
            Self::KeepOneColumnVisible => "keep one column visible".to_owned(),
            Self::ColumnsShown => "all columns shown".to_owned(),
            Self::ColumnMoved(label) => format!("column moved: {label}"),
            Self::ColumnPinned(label) => format!("column cannot move: {label}"),
            Self::SearchCleared => "search cleared".to_owned(),
            Self::Selected(count) => format!("{count} selected"),
            Self::SelectionCleared => "selection cleared".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    VisibilityChanged { key: String, visible: bool },
    OrderChanged(Vec<String>),
    SortChanged(Option<SortSpec>),
    SearchChanged(String),
    PageChanged(usize),
    PageSizeChanged(usize),
    SelectionChanged(Vec<RowId>),
    Status(TableStatus),
}

impl TableEvent {
    pub fn changes_layout(&self) -> bool {
        matches!(self, Self::VisibilityChanged { .. } | Self::OrderChanged(_))
    }
}

impl TableState {
    pub fn new<R>(columns: &ColumnSet<R>) -> Self {
        Self::with_layout(ColumnLayout::defaults(columns))
    }

    pub fn with_layout(layout: ColumnLayout) -> Self {
        Self {
            layout,
            sort: None,
            search: String::new(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            selected: BTreeSet::new(),
        }
    }

    pub fn order(&self) -> &[String] {
        &self.layout.order
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.layout.is_visible(key)
    }

    pub fn visible_keys(&self) -> Vec<&str> {
        self.layout.visible_keys()
    }

    pub fn sort_direction(&self, key: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|sort| sort.key == key)
            .map(|sort| sort.direction)
    }

    pub fn is_selected(&self, id: RowId) -> bool {
        self.selected.contains(&id)
    }

    pub fn toggle_visibility<R>(&mut self, columns: &ColumnSet<R>, key: &str) -> Vec<TableEvent> {
        let Some(column) = columns.get(key) else {
            return Vec::new();
        };
        let label = column.label().to_owned();
        let visible = self.is_visible(key);
        if visible && self.visible_keys().len() <= 1 {
            return vec![TableEvent::Status(TableStatus::KeepOneColumnVisible)];
        }

        self.layout.visibility.insert(key.to_owned(), !visible);
        let status = if visible {
            TableStatus::ColumnHidden(label)
        } else {
            TableStatus::ColumnShown(label)
        };
        vec![
            TableEvent::VisibilityChanged {
                key: key.to_owned(),
                visible: !visible,
            },
            TableEvent::Status(status),
        ]
    }

    pub fn show_all_columns(&mut self) -> Vec<TableEvent> {
        let mut events = Vec::new();
        for (key, visible) in &mut self.layout.visibility {
            if !*visible {
                *visible = true;
                events.push(TableEvent::VisibilityChanged {
                    key: key.clone(),
                    visible: true,
                });
            }
        }
        events.push(TableEvent::Status(TableStatus::ColumnsShown));
        events
    }

    /// Drag-and-drop move of the key at `from` to `to`. Columns that are not
    /// draggable keep their index: they cannot be dragged, and nothing can
    /// be dropped across them.
    pub fn reorder<R>(
        &mut self,
        columns: &ColumnSet<R>,
        from: usize,
        to: usize,
    ) -> Vec<TableEvent> {
        if let Some(pinned) = self.pinned_in_range(columns, from, to) {
            return vec![TableEvent::Status(TableStatus::ColumnPinned(pinned))];
        }
        let next = reorder(&self.layout.order, from, to);
        if next == self.layout.order {
            return Vec::new();
        }
        self.layout.order = next;
        vec![TableEvent::OrderChanged(self.layout.order.clone())]
    }

    /// Keyboard form of a drag: moves `key` by `delta` visible positions,
    /// clamped to the ends. Hidden columns are stepped over.
    pub fn move_column<R>(
        &mut self,
        columns: &ColumnSet<R>,
        key: &str,
        delta: isize,
    ) -> Vec<TableEvent> {
        let Some(column) = columns.get(key) else {
            return Vec::new();
        };
        let visible = self
            .layout
            .order
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.layout.is_visible(entry))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        let Some(position) = visible
            .iter()
            .position(|index| self.layout.order[*index] == key)
        else {
            return Vec::new();
        };
        let last = visible.len().saturating_sub(1) as isize;
        let target = (position as isize + delta).clamp(0, last) as usize;
        if target == position && column.is_draggable() {
            return Vec::new();
        }

        let mut events = self.reorder(columns, visible[position], visible[target]);
        if events.iter().any(TableEvent::changes_layout) {
            events.push(TableEvent::Status(TableStatus::ColumnMoved(
                column.label().to_owned(),
            )));
        }
        events
    }

    /// Label of the first non-draggable column a move from `from` to `to`
    /// would displace, starting with the moved column itself.
    fn pinned_in_range<R>(
        &self,
        columns: &ColumnSet<R>,
        from: usize,
        to: usize,
    ) -> Option<String> {
        let order = &self.layout.order;
        if from >= order.len() || to >= order.len() {
            return None;
        }
        let shifted = if from <= to { from..=to } else { to..=from };
        let mut keys = std::iter::once(from)
            .chain(shifted.filter(|index| *index != from))
            .map(|index| order[index].as_str());
        keys.find_map(|key| {
            columns
                .get(key)
                .filter(|column| !column.is_draggable())
                .map(|column| column.label().to_owned())
        })
    }

    pub fn sort_click<R>(&mut self, columns: &ColumnSet<R>, key: &str) -> Vec<TableEvent> {
        let Some(column) = columns.get(key) else {
            return Vec::new();
        };
        let label = column.label().to_owned();
        if !column.is_sortable() {
            return vec![TableEvent::Status(TableStatus::SortUnavailable(label))];
        }

        self.sort = next_sort(self.sort.as_ref(), key);
        let status = match self.sort.as_ref().map(|sort| sort.direction) {
            Some(SortDirection::Asc) => TableStatus::SortAsc(label),
            Some(SortDirection::Desc) => TableStatus::SortDesc(label),
            None => TableStatus::SortCleared,
        };
        vec![
            TableEvent::SortChanged(self.sort.clone()),
            TableEvent::Status(status),
        ]
    }

    pub fn clear_sort(&mut self) -> Vec<TableEvent> {
        if self.sort.take().is_none() {
            return Vec::new();
        }
        vec![
            TableEvent::SortChanged(None),
            TableEvent::Status(TableStatus::SortCleared),
        ]
    }

    pub fn set_search(&mut self, term: &str) -> Vec<TableEvent> {
        if self.search == term {
            return Vec::new();
        }
        self.search = term.to_owned();
        let mut events = vec![TableEvent::SearchChanged(self.search.clone())];
        if term.is_empty() {
            events.push(TableEvent::Status(TableStatus::SearchCleared));
        }
        events.extend(self.set_page(0));
        events
    }

    pub fn set_page(&mut self, page: usize) -> Vec<TableEvent> {
        if self.page == page {
            return Vec::new();
        }
        self.page = page;
        vec![TableEvent::PageChanged(page)]
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Vec<TableEvent> {
        if self.page_size == page_size {
            return Vec::new();
        }
        self.page_size = page_size;
        let mut events = vec![TableEvent::PageSizeChanged(page_size)];
        events.extend(self.set_page(0));
        events
    }

    /// Pulls the page cursor back onto the last page when the filtered set
    /// shrank underneath it.
    pub fn clamp_page(&mut self, page_count: usize) -> Vec<TableEvent> {
        let last = page_count.saturating_sub(1);
        if self.page > last {
            return self.set_page(last);
        }
        Vec::new()
    }

    pub fn toggle_row(&mut self, id: RowId) -> Vec<TableEvent> {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        vec![self.selection_changed()]
    }

    /// Selects every filtered row, or clears the selection when all of them
    /// are already selected.
    pub fn select_all(&mut self, filtered: &[RowId]) -> Vec<TableEvent> {
        let all_selected =
            !filtered.is_empty() && filtered.iter().all(|id| self.selected.contains(id));
        if all_selected {
            return self.clear_selection();
        }

        self.selected = filtered.iter().copied().collect();
        vec![
            self.selection_changed(),
            TableEvent::Status(TableStatus::Selected(self.selected.len())),
        ]
    }

    pub fn clear_selection(&mut self) -> Vec<TableEvent> {
        self.selected.clear();
        vec![
            self.selection_changed(),
            TableEvent::Status(TableStatus::SelectionCleared),
        ]
    }

    fn selection_changed(&self) -> TableEvent {
        TableEvent::SelectionChanged(self.selected.iter().copied().collect())
    }
}
