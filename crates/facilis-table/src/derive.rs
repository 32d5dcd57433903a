// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Filter, sort and paginate. Everything here is a pure function of the
//! rows, the columns and the table state.

use crate::{Column, ColumnSet, SortDirection, TableState};

/// One page of derived rows plus where it sits in the filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, R> {
    pub rows: Vec<&'a R>,
    /// Effective page index after clamping.
    pub page: usize,
    pub page_count: usize,
    pub filtered_len: usize,
    pub total_len: usize,
}

pub fn derive<'a, R>(rows: &'a [R], columns: &ColumnSet<R>, state: &TableState) -> Page<'a, R> {
    let view = derive_view(rows, columns, state);
    paginate(rows, &view, state.page, state.page_size)
}

/// Indices of the filtered rows in display order.
pub fn derive_view<R>(rows: &[R], columns: &ColumnSet<R>, state: &TableState) -> Vec<usize> {
    let mut view = filter_indices(rows, columns, state);
    sort_indices(rows, columns, state, &mut view);
    view
}

/// Keeps rows where any visible column's display value contains the search
/// term, ignoring case. An empty term keeps everything.
pub fn filter_indices<R>(rows: &[R], columns: &ColumnSet<R>, state: &TableState) -> Vec<usize> {
    let needle = state.search.to_lowercase();
    if needle.is_empty() {
        return (0..rows.len()).collect();
    }

    let visible = visible_columns(columns, state);
    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            visible.iter().any(|column| {
                column
                    .value(row)
                    .display()
                    .to_lowercase()
                    .contains(&needle)
            })
        })
        .map(|(index, _)| index)
        .collect()
}

/// Stable sort of `view` by the active sort column. Descending reverses the
/// comparison rather than the result so equal keys keep their input order.
pub fn sort_indices<R>(rows: &[R], columns: &ColumnSet<R>, state: &TableState, view: &mut [usize]) {
    let Some(sort) = &state.sort else {
        return;
    };
    let Some(column) = columns.get(&sort.key).filter(|column| column.is_sortable()) else {
        return;
    };

    let mut keyed = view
        .iter()
        .map(|index| (*index, column.value(&rows[*index]).sort_key()))
        .collect::<Vec<_>>();
    keyed.sort_by(|(_, left), (_, right)| {
        let order = left.cmp(right);
        match sort.direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    });
    for (slot, (index, _)) in view.iter_mut().zip(keyed) {
        *slot = index;
    }
}

pub fn page_count(filtered_len: usize, page_size: usize) -> usize {
    if page_size == 0 || filtered_len == 0 {
        return 1;
    }
    filtered_len.div_ceil(page_size)
}

/// Slices the derived view into the requested page, clamping to the last
/// page. A page size of zero returns the whole view.
pub fn paginate<'a, R>(rows: &'a [R], view: &[usize], page: usize, page_size: usize) -> Page<'a, R> {
    let page_count = page_count(view.len(), page_size);
    let page = page.min(page_count - 1);
    let window = if page_size == 0 {
        view
    } else {
        let start = (page * page_size).min(view.len());
        let end = start.saturating_add(page_size).min(view.len());
        &view[start..end]
    };

    Page {
        rows: window.iter().map(|index| &rows[*index]).collect(),
        page,
        page_count,
        filtered_len: view.len(),
        total_len: rows.len(),
    }
}

pub(crate) fn visible_columns<'c, R>(
    columns: &'c ColumnSet<R>,
    state: &TableState,
) -> Vec<&'c Column<R>> {
    state
        .order()
        .iter()
        .filter(|key| state.is_visible(key))
        .filter_map(|key| columns.get(key))
        .collect()
}
