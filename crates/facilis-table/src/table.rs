// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;

use crate::derive::{derive_view, page_count, paginate};
use crate::{
    ColumnLayout, ColumnSet, DEFAULT_PAGE_SIZE, KeyValueStore, Page, RenderedTable, Renderer,
    RowId, TableEvent, TableState,
};

type RowIdFn<R> = Arc<dyn Fn(&R) -> RowId + Send + Sync>;

/// Feature toggles and persistence for one table mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub pagination: bool,
    pub page_size: usize,
    pub search: bool,
    pub selection: bool,
    /// Key under which column order and visibility are persisted.
    pub storage_key: Option<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            pagination: true,
            page_size: DEFAULT_PAGE_SIZE,
            search: true,
            selection: true,
            storage_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    ToggleVisibility(String),
    ShowAllColumns,
    Reorder { from: usize, to: usize },
    MoveColumn { key: String, delta: isize },
    SortClick(String),
    ClearSort,
    SetSearch(String),
    SetPage(usize),
    NextPage,
    PrevPage,
    SetPageSize(usize),
    ToggleRow(RowId),
    SelectAll,
    ClearSelection,
}

/// A mounted table: columns, data, UI state and the derived view, kept in
/// sync after every command.
pub struct Table<R> {
    columns: ColumnSet<R>,
    rows: Vec<R>,
    row_id: RowIdFn<R>,
    options: TableOptions,
    state: TableState,
    store: Option<Box<dyn KeyValueStore>>,
    view: Vec<usize>,
}

impl<R> Table<R> {
    pub fn new(
        columns: ColumnSet<R>,
        row_id: impl Fn(&R) -> RowId + Send + Sync + 'static,
        options: TableOptions,
    ) -> Self {
        let mut state = TableState::new(&columns);
        state.page_size = if options.pagination {
            options.page_size
        } else {
            0
        };

        Self {
            columns,
            rows: Vec::new(),
            row_id: Arc::new(row_id),
            options,
            state,
            store: None,
            view: Vec::new(),
        }
    }

    /// Attaches the preference store and seeds the column layout from it.
    /// Anything unreadable falls back to the configured defaults.
    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        let restored = self
            .options
            .storage_key
            .as_deref()
            .and_then(|key| load_layout(store.as_ref(), key, &self.columns));
        if let Some(layout) = restored {
            self.state.layout = layout;
        }
        self.store = Some(store);
        self.refresh();
        self
    }

    pub fn with_rows(mut self, rows: Vec<R>) -> Self {
        self.set_rows(rows);
        self
    }

    /// Replaces the data. Selected ids that no longer exist are dropped and
    /// the page cursor is clamped to the new page count.
    pub fn set_rows(&mut self, rows: Vec<R>) -> Vec<TableEvent> {
        self.rows = rows;
        let mut events = Vec::new();

        let before = self.state.selected.len();
        let existing = self
            .rows
            .iter()
            .map(|row| (self.row_id)(row))
            .collect::<std::collections::BTreeSet<_>>();
        self.state.selected.retain(|id| existing.contains(id));
        if self.state.selected.len() != before {
            events.push(TableEvent::SelectionChanged(
                self.state.selected.iter().copied().collect(),
            ));
        }

        events.extend(self.refresh());
        events
    }

    pub fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        let page_before = self.state.page;
        let events = match command {
            TableCommand::ToggleVisibility(key) => {
                self.state.toggle_visibility(&self.columns, &key)
            }
            TableCommand::ShowAllColumns => self.state.show_all_columns(),
            TableCommand::Reorder { from, to } => self.state.reorder(&self.columns, from, to),
            TableCommand::MoveColumn { key, delta } => {
                self.state.move_column(&self.columns, &key, delta)
            }
            TableCommand::SortClick(key) => self.state.sort_click(&self.columns, &key),
            TableCommand::ClearSort => self.state.clear_sort(),
            TableCommand::SetSearch(term) if self.options.search => self.state.set_search(&term),
            TableCommand::SetPage(page) => self.state.set_page(page),
            TableCommand::NextPage => self.state.set_page(self.state.page.saturating_add(1)),
            TableCommand::PrevPage => self.state.set_page(self.state.page.saturating_sub(1)),
            TableCommand::SetPageSize(size) if self.options.pagination => {
                self.state.set_page_size(size)
            }
            TableCommand::ToggleRow(id) if self.options.selection => self.state.toggle_row(id),
            TableCommand::SelectAll if self.options.selection => {
                let filtered = self.filtered_ids();
                self.state.select_all(&filtered)
            }
            TableCommand::ClearSelection if self.options.selection => {
                self.state.clear_selection()
            }
            TableCommand::SetSearch(_)
            | TableCommand::SetPageSize(_)
            | TableCommand::ToggleRow(_)
            | TableCommand::SelectAll
            | TableCommand::ClearSelection => Vec::new(),
        };

        if events.iter().any(TableEvent::changes_layout) {
            self.persist_layout();
        }
        let clamped = self.refresh();
        collapse_page_events(events, clamped, page_before, self.state.page)
    }

    pub fn columns(&self) -> &ColumnSet<R> {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn row_id(&self, row: &R) -> RowId {
        (self.row_id)(row)
    }

    pub fn page(&self) -> Page<'_, R> {
        paginate(&self.rows, &self.view, self.state.page, self.state.page_size)
    }

    /// Ids of every row passing the current search, in display order.
    pub fn filtered_ids(&self) -> Vec<RowId> {
        self.view
            .iter()
            .map(|index| (self.row_id)(&self.rows[*index]))
            .collect()
    }

    pub fn selected_rows(&self) -> Vec<&R> {
        self.rows
            .iter()
            .filter(|row| self.state.is_selected((self.row_id)(row)))
            .collect()
    }

    /// Renderer that only knows how to identify rows; add cell and action
    /// callbacks on top of it.
    pub fn renderer(&self) -> Renderer<'_, R> {
        Renderer::new(move |row: &R| (self.row_id)(row))
    }

    pub fn render(&self, renderer: &Renderer<'_, R>) -> RenderedTable {
        renderer.render(&self.columns, &self.state, &self.page())
    }

    fn refresh(&mut self) -> Vec<TableEvent> {
        self.view = derive_view(&self.rows, &self.columns, &self.state);
        self.state
            .clamp_page(page_count(self.view.len(), self.state.page_size))
    }

    fn persist_layout(&mut self) {
        let (Some(store), Some(key)) = (self.store.as_mut(), &self.options.storage_key) else {
            return;
        };
        let raw = match self.state.layout.to_json() {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(storage_key = %key, error = %format!("{error:#}"), "encode column layout failed");
                return;
            }
        };
        if let Err(error) = store.set(key, &raw) {
            tracing::warn!(storage_key = %key, error = %format!("{error:#}"), "persist column layout failed");
        }
    }
}

fn load_layout<R>(
    store: &dyn KeyValueStore,
    key: &str,
    columns: &ColumnSet<R>,
) -> Option<ColumnLayout> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            tracing::warn!(storage_key = %key, error = %format!("{error:#}"), "read column layout failed");
            return None;
        }
    };
    let layout = ColumnLayout::restore(&raw, columns);
    if layout.is_none() {
        tracing::debug!(storage_key = %key, "discarding malformed column layout");
    }
    layout
}

/// A command may move the page and the refresh may clamp it again; callers
/// only hear about where it ended up.
fn collapse_page_events(
    mut events: Vec<TableEvent>,
    clamped: Vec<TableEvent>,
    before: usize,
    after: usize,
) -> Vec<TableEvent> {
    if clamped.is_empty() {
        return events;
    }
    events.retain(|event| !matches!(event, TableEvent::PageChanged(_)));
    if before != after {
        events.push(TableEvent::PageChanged(after));
    }
    events
}
