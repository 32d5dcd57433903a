// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use facilis_table::{
    RenderedTable, RowId, SortDirection, Table, TableCommand, TableEvent, TableStatus,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table as TableWidget};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const SELECTED_MARK: &str = "[x]";
const UNSELECTED_MARK: &str = "[ ]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiCommand {
    MoveRow(isize),
    MoveColumn(isize),
    JumpFirstRow,
    JumpLastRow,
    SortCurrentColumn,
    ClearSort,
    HideCurrentColumn,
    ShowAllColumns,
    ShiftColumn(isize),
    NextPage,
    PrevPage,
    OpenSearch,
    ToggleRow,
    SelectAll,
    ClearSelection,
    ToggleHelp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Default)]
struct ViewData {
    title: String,
    cursor_row: usize,
    cursor_col: usize,
    search_entry: Option<String>,
    status_line: Option<String>,
    status_token: u64,
    help_visible: bool,
}

/// Runs the interactive table until the user quits. Rows are painted with
/// their raw values.
pub fn run_app<R>(table: &mut Table<R>, title: &str) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        title: title.to_owned(),
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(&mut view_data, &internal_rx);

        let rendered = table.render(&table.renderer());
        if let Err(error) = terminal.draw(|frame| render(frame, table, &rendered, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(table, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(view_data: &mut ViewData, internal_rx: &Receiver<InternalEvent>) {
    while let Ok(event) = internal_rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } => {
                if token == view_data.status_token {
                    view_data.status_line = None;
                }
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns true when the app should quit.
fn handle_key_event<R>(
    table: &mut Table<R>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.search_entry.is_some() {
        let events = handle_search_key(table, view_data, key);
        report_events(view_data, internal_tx, &events);
        return false;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if key.code == KeyCode::Char('q') && key.modifiers == KeyModifiers::NONE {
        return true;
    }

    let Some(command) = ui_command_for_key(key) else {
        return false;
    };
    let events = apply_ui_command(table, view_data, command);
    report_events(view_data, internal_tx, &events);
    false
}

fn report_events(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: &[TableEvent],
) {
    if let Some(message) = status_message_for_events(events) {
        emit_status(view_data, internal_tx, message);
    }
}

/// The status line shows the last explicit status, falling back to page
/// moves so paging never happens silently.
fn status_message_for_events(events: &[TableEvent]) -> Option<String> {
    let status = events.iter().rev().find_map(|event| match event {
        TableEvent::Status(status) => Some(status.message()),
        _ => None,
    });
    status.or_else(|| {
        events.iter().rev().find_map(|event| match event {
            TableEvent::PageChanged(page) => Some(format!("page {}", page + 1)),
            _ => None,
        })
    })
}

fn ui_command_for_key(key: KeyEvent) -> Option<UiCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(UiCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(UiCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(UiCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(UiCommand::MoveColumn(1)),
        (KeyCode::Char('g'), _) => Some(UiCommand::JumpFirstRow),
        (KeyCode::Char('G'), _) => Some(UiCommand::JumpLastRow),
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(UiCommand::SortCurrentColumn),
        (KeyCode::Char('S'), _) => Some(UiCommand::ClearSort),
        (KeyCode::Char('c'), KeyModifiers::NONE) => Some(UiCommand::HideCurrentColumn),
        (KeyCode::Char('C'), _) => Some(UiCommand::ShowAllColumns),
        (KeyCode::Char('<'), _) => Some(UiCommand::ShiftColumn(-1)),
        (KeyCode::Char('>'), _) => Some(UiCommand::ShiftColumn(1)),
        (KeyCode::Char('n'), KeyModifiers::NONE) | (KeyCode::PageDown, _) => {
            Some(UiCommand::NextPage)
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) | (KeyCode::PageUp, _) => {
            Some(UiCommand::PrevPage)
        }
        (KeyCode::Char('/'), _) => Some(UiCommand::OpenSearch),
        (KeyCode::Char(' '), _) => Some(UiCommand::ToggleRow),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(UiCommand::SelectAll),
        (KeyCode::Char('x'), KeyModifiers::NONE) => Some(UiCommand::ClearSelection),
        (KeyCode::Char('?'), _) => Some(UiCommand::ToggleHelp),
        _ => None,
    }
}

fn apply_ui_command<R>(
    table: &mut Table<R>,
    view_data: &mut ViewData,
    command: UiCommand,
) -> Vec<TableEvent> {
    let current_key = current_column_key(table, view_data);
    let events = match command {
        UiCommand::MoveRow(delta) => {
            view_data.cursor_row = offset_index(view_data.cursor_row, delta);
            Vec::new()
        }
        UiCommand::MoveColumn(delta) => {
            view_data.cursor_col = offset_index(view_data.cursor_col, delta);
            Vec::new()
        }
        UiCommand::JumpFirstRow => {
            view_data.cursor_row = 0;
            Vec::new()
        }
        UiCommand::JumpLastRow => {
            view_data.cursor_row = usize::MAX;
            Vec::new()
        }
        UiCommand::SortCurrentColumn => current_key
            .map(|key| table.dispatch(TableCommand::SortClick(key)))
            .unwrap_or_default(),
        UiCommand::ClearSort => table.dispatch(TableCommand::ClearSort),
        UiCommand::HideCurrentColumn => current_key
            .map(|key| table.dispatch(TableCommand::ToggleVisibility(key)))
            .unwrap_or_default(),
        UiCommand::ShowAllColumns => table.dispatch(TableCommand::ShowAllColumns),
        UiCommand::ShiftColumn(delta) => match current_key {
            Some(key) => {
                let events = table.dispatch(TableCommand::MoveColumn {
                    key: key.clone(),
                    delta,
                });
                if let Some(position) = table.state().visible_keys().iter().position(|k| *k == key)
                {
                    view_data.cursor_col = position;
                }
                events
            }
            None => Vec::new(),
        },
        UiCommand::NextPage => table.dispatch(TableCommand::NextPage),
        UiCommand::PrevPage => table.dispatch(TableCommand::PrevPage),
        UiCommand::OpenSearch => {
            if table.options().search {
                view_data.search_entry = Some(table.state().search.clone());
            }
            Vec::new()
        }
        UiCommand::ToggleRow => match current_row_id(table, view_data) {
            Some(id) => table.dispatch(TableCommand::ToggleRow(id)),
            None => Vec::new(),
        },
        UiCommand::SelectAll => table.dispatch(TableCommand::SelectAll),
        UiCommand::ClearSelection => table.dispatch(TableCommand::ClearSelection),
        UiCommand::ToggleHelp => {
            view_data.help_visible = !view_data.help_visible;
            Vec::new()
        }
    };

    if events
        .iter()
        .any(|event| matches!(event, TableEvent::PageChanged(_)))
    {
        view_data.cursor_row = 0;
    }
    clamp_cursor(table, view_data);
    events
}

/// Search entry filters live on every keystroke. Enter keeps the term, Esc
/// drops it.
fn handle_search_key<R>(
    table: &mut Table<R>,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> Vec<TableEvent> {
    let Some(buffer) = view_data.search_entry.as_mut() else {
        return Vec::new();
    };
    let events = match key.code {
        KeyCode::Enter => {
            view_data.search_entry = None;
            Vec::new()
        }
        KeyCode::Esc => {
            view_data.search_entry = None;
            table.dispatch(TableCommand::SetSearch(String::new()))
        }
        KeyCode::Backspace => {
            buffer.pop();
            let term = buffer.clone();
            table.dispatch(TableCommand::SetSearch(term))
        }
        KeyCode::Char(value) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.push(value);
            let term = buffer.clone();
            table.dispatch(TableCommand::SetSearch(term))
        }
        _ => Vec::new(),
    };
    clamp_cursor(table, view_data);
    events
}

fn offset_index(current: usize, delta: isize) -> usize {
    if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    }
}

fn clamp_cursor<R>(table: &Table<R>, view_data: &mut ViewData) {
    let row_count = table.page().rows.len();
    view_data.cursor_row = view_data.cursor_row.min(row_count.saturating_sub(1));
    let col_count = table.state().visible_keys().len();
    view_data.cursor_col = view_data.cursor_col.min(col_count.saturating_sub(1));
}

fn current_column_key<R>(table: &Table<R>, view_data: &ViewData) -> Option<String> {
    table
        .state()
        .visible_keys()
        .get(view_data.cursor_col)
        .map(|key| (*key).to_owned())
}

fn current_row_id<R>(table: &Table<R>, view_data: &ViewData) -> Option<RowId> {
    table
        .page()
        .rows
        .get(view_data.cursor_row)
        .map(|row| table.row_id(row))
}

fn render<R>(
    frame: &mut ratatui::Frame<'_>,
    table: &Table<R>,
    rendered: &RenderedTable,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(frame.area());

    render_table(frame, layout[0], table, rendered, view_data);

    let status_widget = Paragraph::new(status_text(view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[1]);

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table<R>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    table: &Table<R>,
    rendered: &RenderedTable,
    view_data: &ViewData,
) {
    let mut widths = vec![Constraint::Length(3)];
    widths.extend(std::iter::repeat_n(Constraint::Min(8), rendered.header.len()));

    let mut header_cells = vec![Cell::from(String::new())];
    header_cells.extend(rendered.header.iter().enumerate().map(|(index, cell)| {
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if index == view_data.cursor_col {
            style = style.fg(Color::Cyan);
        }
        Cell::from(cell.decorated()).style(style)
    }));
    let header = Row::new(header_cells);

    let rows = rendered.rows.iter().enumerate().map(|(row_index, row)| {
        let cursor_row = row_index == view_data.cursor_row;
        let mark = if row.selected {
            SELECTED_MARK
        } else {
            UNSELECTED_MARK
        };
        let mut cells = vec![Cell::from(mark)];
        cells.extend(row.cells.iter().enumerate().map(|(column_index, text)| {
            let mut style = Style::default();
            if row.selected {
                style = style.fg(Color::Green);
            }
            if cursor_row {
                style = style.bg(Color::DarkGray);
            }
            if cursor_row && column_index == view_data.cursor_col {
                style = Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
            }
            Cell::from(text.clone()).style(style)
        }));
        Row::new(cells)
    });

    let widget = TableWidget::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(table, &view_data.title))
                .borders(Borders::ALL),
        );
    frame.render_widget(widget, area);
}

fn table_title<R>(table: &Table<R>, title: &str) -> String {
    let state = table.state();
    let page = table.page();
    let visible_count = state.visible_keys().len();
    let column_count = table.columns().len();

    let mut parts = vec![format!(
        "{title} r:{}/{} c:{visible_count}/{column_count}",
        page.filtered_len, page.total_len,
    )];
    if page.page_count > 1 {
        parts.push(format!("page {}/{}", page.page + 1, page.page_count));
    }
    if let Some(sort) = &state.sort {
        let label = table
            .columns()
            .get(&sort.key)
            .map_or(sort.key.as_str(), |column| column.label());
        let direction = match sort.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        parts.push(format!("sort {label}:{direction}"));
    }
    if !state.search.is_empty() {
        parts.push(format!("search {:?}", state.search));
    }
    if !state.selected.is_empty() {
        parts.push(format!("sel {}", state.selected.len()));
    }
    let hidden_count = column_count.saturating_sub(visible_count);
    if hidden_count > 0 {
        parts.push(format!("hidden {hidden_count}"));
    }
    parts.join(" | ")
}

fn status_text(view_data: &ViewData) -> String {
    if let Some(buffer) = &view_data.search_entry {
        return format!("SEARCH | /{buffer}_ | enter keep | esc clear");
    }
    let default = "j/k/h/l g/G | s/S sort | c/C cols | </> move | n/p page | / search | space/a/x select | ? help | q";
    match &view_data.status_line {
        Some(status) => format!("NAV | {status} | {default}"),
        None => format!("NAV | {default}"),
    }
}

fn help_overlay_text() -> &'static str {
    "move: j/k rows | h/l columns | g/G first/last row\n\
sort: s cycle asc/desc/off on current column | S clear\n\
columns: c hide current | C show all | < > move current left/right\n\
pages: n/p or pgdn/pgup\n\
search: / type to filter visible columns | enter keep | esc clear\n\
select: space toggle row | a select all matches | x clear\n\
quit: q or ctrl+q | ? close help"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Status for a command the table refused, for callers that drive the table
/// without the TUI.
pub fn refusal_message(events: &[TableEvent]) -> Option<String> {
    events.iter().find_map(|event| match event {
        TableEvent::Status(
            status @ (TableStatus::SortUnavailable(_)
            | TableStatus::KeepOneColumnVisible
            | TableStatus::ColumnPinned(_)),
        ) => Some(status.message()),
        _ => None,
    })
}
