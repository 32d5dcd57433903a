// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::derive::visible_columns;
use crate::{ColumnSet, Page, RowId, SortDirection, TableState};

pub const SORT_ASC_MARK: &str = "↑";
pub const SORT_DESC_MARK: &str = "↓";
pub const DRAG_HANDLE: &str = "⠿";

type CellFn<'a, R> = Box<dyn Fn(&R, &str) -> String + 'a>;
type ActionsFn<'a, R> = Box<dyn Fn(&R) -> String + 'a>;
type RowIdFn<'a, R> = Box<dyn Fn(&R) -> RowId + 'a>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub sort: Option<SortDirection>,
    pub draggable: bool,
}

impl HeaderCell {
    /// Label with drag handle and sort marker, e.g. `⠿ Site ↑`.
    pub fn decorated(&self) -> String {
        let mut label = String::new();
        if self.draggable {
            label.push_str(DRAG_HANDLE);
            label.push(' ');
        }
        label.push_str(&self.label);
        match self.sort {
            Some(SortDirection::Asc) => {
                label.push(' ');
                label.push_str(SORT_ASC_MARK);
            }
            Some(SortDirection::Desc) => {
                label.push(' ');
                label.push_str(SORT_DESC_MARK);
            }
            None => {}
        }
        label
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRow {
    pub id: RowId,
    pub selected: bool,
    pub cells: Vec<String>,
    pub actions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub header: Vec<HeaderCell>,
    pub rows: Vec<BodyRow>,
}

/// Paints visible columns over a derived page. Holds only caller callbacks;
/// all state comes in through `render`.
pub struct Renderer<'a, R> {
    row_id: RowIdFn<'a, R>,
    render_cell: Option<CellFn<'a, R>>,
    render_actions: Option<ActionsFn<'a, R>>,
}

impl<'a, R> Renderer<'a, R> {
    pub fn new(row_id: impl Fn(&R) -> RowId + 'a) -> Self {
        Self {
            row_id: Box::new(row_id),
            render_cell: None,
            render_actions: None,
        }
    }

    pub fn with_cell(mut self, render_cell: impl Fn(&R, &str) -> String + 'a) -> Self {
        self.render_cell = Some(Box::new(render_cell));
        self
    }

    pub fn with_actions(mut self, render_actions: impl Fn(&R) -> String + 'a) -> Self {
        self.render_actions = Some(Box::new(render_actions));
        self
    }

    pub fn render(
        &self,
        columns: &ColumnSet<R>,
        state: &TableState,
        page: &Page<'_, R>,
    ) -> RenderedTable {
        let visible = visible_columns(columns, state);

        let header = visible
            .iter()
            .map(|column| HeaderCell {
                key: column.key().to_owned(),
                label: column.label().to_owned(),
                sort: state.sort_direction(column.key()),
                draggable: column.is_draggable(),
            })
            .collect();

        let rows = page
            .rows
            .iter()
            .copied()
            .map(|row| {
                let id = (self.row_id)(row);
                let cells = visible
                    .iter()
                    .map(|column| match &self.render_cell {
                        Some(render_cell) => render_cell(row, column.key()),
                        None => column.value(row).display(),
                    })
                    .collect();
                BodyRow {
                    id,
                    selected: state.is_selected(id),
                    cells,
                    actions: self.render_actions.as_ref().map(|render| render(row)),
                }
            })
            .collect();

        RenderedTable { header, rows }
    }
}

impl RenderedTable {
    pub fn has_actions(&self) -> bool {
        self.rows.iter().any(|row| row.actions.is_some())
    }

    /// Fixed-width text rendering with a selection column, used for
    /// non-interactive output.
    pub fn to_text(&self) -> String {
        let mut headers = vec![" ".to_owned()];
        headers.extend(self.header.iter().map(HeaderCell::decorated));
        if self.has_actions() {
            headers.push("Actions".to_owned());
        }

        let body = self
            .rows
            .iter()
            .map(|row| {
                let mut line = vec![if row.selected { "[x]" } else { "[ ]" }.to_owned()];
                line.extend(row.cells.iter().cloned());
                if self.has_actions() {
                    line.push(row.actions.clone().unwrap_or_default());
                }
                line
            })
            .collect::<Vec<_>>();

        let mut widths = headers.iter().map(|cell| cell.chars().count()).collect::<Vec<_>>();
        for line in &body {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_text_line(&mut out, &headers, &widths);
        for line in &body {
            push_text_line(&mut out, line, &widths);
        }
        out
    }
}

fn push_text_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::{HeaderCell, Renderer};
    use crate::{
        CellValue, Column, ColumnSet, RowId, SortDirection, SortSpec, TableState, derive,
    };
    use anyhow::Result;

    struct Ticket {
        id: i64,
        title: &'static str,
        priority: i64,
    }

    fn columns() -> Result<ColumnSet<Ticket>> {
        ColumnSet::new(vec![
            Column::new("title", "Title", |row: &Ticket| CellValue::text(row.title)),
            Column::new("priority", "Priority", |row: &Ticket| {
                CellValue::Integer(row.priority)
            })
            .draggable(false),
        ])
    }

    fn tickets() -> Vec<Ticket> {
        vec![
            Ticket {
                id: 7,
                title: "Leaking valve",
                priority: 2,
            },
            Ticket {
                id: 8,
                title: "Door closer",
                priority: 1,
            },
        ]
    }

    #[test]
    fn header_follows_order_and_visibility() -> Result<()> {
        let columns = columns()?;
        let rows = tickets();
        let mut state = TableState::new(&columns);
        state.layout.order = vec!["priority".to_owned(), "title".to_owned()];
        state.sort = Some(SortSpec::desc("title"));
        let page = derive(&rows, &columns, &state);

        let rendered =
            Renderer::new(|row: &Ticket| RowId::new(row.id)).render(&columns, &state, &page);
        assert_eq!(
            rendered.header,
            vec![
                HeaderCell {
                    key: "priority".to_owned(),
                    label: "Priority".to_owned(),
                    sort: None,
                    draggable: false,
                },
                HeaderCell {
                    key: "title".to_owned(),
                    label: "Title".to_owned(),
                    sort: Some(SortDirection::Desc),
                    draggable: true,
                },
            ]
        );
        assert_eq!(rendered.header[1].decorated(), "⠿ Title ↓");
        assert_eq!(
            rendered.rows[0].cells,
            vec!["2".to_owned(), "Leaking valve".to_owned()]
        );
        Ok(())
    }

    #[test]
    fn callbacks_override_raw_values() -> Result<()> {
        let columns = columns()?;
        let rows = tickets();
        let mut state = TableState::new(&columns);
        state.toggle_row(RowId::new(8));
        let page = derive(&rows, &columns, &state);

        let renderer = Renderer::new(|row: &Ticket| RowId::new(row.id))
            .with_cell(|row: &Ticket, key: &str| match key {
                "priority" => format!("P{}", row.priority),
                _ => row.title.to_uppercase(),
            })
            .with_actions(|row: &Ticket| format!("open #{}", row.id));
        let rendered = renderer.render(&columns, &state, &page);

        assert!(!rendered.rows[0].selected);
        assert!(rendered.rows[1].selected);
        assert_eq!(
            rendered.rows[1].cells,
            vec!["DOOR CLOSER".to_owned(), "P1".to_owned()]
        );
        assert_eq!(rendered.rows[1].actions.as_deref(), Some("open #8"));
        Ok(())
    }

    #[test]
    fn text_output_aligns_columns() -> Result<()> {
        let columns = columns()?;
        let rows = tickets();
        let state = TableState::new(&columns);
        let page = derive(&rows, &columns, &state);

        let text = Renderer::new(|row: &Ticket| RowId::new(row.id))
            .render(&columns, &state, &page)
            .to_text();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "     ⠿ Title        Priority");
        assert_eq!(lines[1], "[ ]  Leaking valve  2");
        assert_eq!(lines[2], "[ ]  Door closer    1");
        Ok(())
    }
}
