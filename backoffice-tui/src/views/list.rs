//! Table view shared by every resource screen.

use crate::screen::{Screen, ScreenRecord};
use crate::theme::{attendance_status_color, role_color, Theme};
use crate::widgets::{FilterBar, FilterOption, StatusLine};
use backoffice_core::PageWindow;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub fn render<R: ScreenRecord>(f: &mut Frame<'_>, screen: &Screen<R>, area: Rect, theme: &Theme) {
    let filtered = screen.store().filtered();
    let summary = R::summary(&filtered);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(if summary.is_empty() { 0 } else { 1 }),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_filters(f, screen, chunks[0], theme);
    if !summary.is_empty() {
        let items = summary
            .into_iter()
            .map(|(label, value)| {
                let color = match label {
                    "Present" | "Absent" => attendance_status_color(label, theme),
                    _ => theme.text,
                };
                (label, value, Style::default().fg(color))
            })
            .collect();
        StatusLine {
            items,
            label_style: Style::default().fg(theme.text_dim),
        }
        .render(f, chunks[1]);
    }
    render_table(f, screen, chunks[2], theme, filtered.len());
    render_pager(f, screen.store().page_window(), chunks[3], theme);
}

fn render_filters<R: ScreenRecord>(f: &mut Frame<'_>, screen: &Screen<R>, area: Rect, theme: &Theme) {
    let mut filters = Vec::new();
    match screen.search_input() {
        Some(typing) => filters.push(FilterOption::new(format!("/ {}▏", typing), true)),
        None => {
            let text = screen.store().search_text();
            let label = if text.is_empty() {
                "/ search".to_string()
            } else {
                format!("/ {}", text)
            };
            filters.push(FilterOption::new(label, !text.is_empty()));
        }
    }
    if let Some(field) = R::choice_field() {
        let label = match screen.choice() {
            Some(value) => format!("f {}: {}", field, value),
            None => format!("f {}: all", field),
        };
        filters.push(FilterOption::new(label, screen.choice().is_some()));
    }
    if screen.store().is_loading() {
        filters.push(FilterOption::new("loading…", false));
    }

    let border = if screen.search_input().is_some() {
        theme.border_focus
    } else {
        theme.border
    };
    FilterBar {
        title: "Filter",
        filters: &filters,
        active_style: Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        inactive_style: Style::default().fg(theme.text_dim),
        border_style: Style::default().fg(border),
    }
    .render(f, area);
}

fn render_table<R: ScreenRecord>(
    f: &mut Frame<'_>,
    screen: &Screen<R>,
    area: Rect,
    theme: &Theme,
    matching: usize,
) {
    let store = screen.store();
    let title = format!(
        "{} ({} of {})",
        R::KIND.title(),
        matching,
        store.records().len()
    );
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(theme.primary)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    let page = store.page();
    if page.is_empty() {
        let (message, color) = match (store.error(), store.has_loaded(), store.is_loading()) {
            (Some(err), _, _) => (err.to_string(), theme.error),
            (None, false, true) => ("Loading…".to_string(), theme.text_dim),
            (None, true, _) if !store.records().is_empty() => {
                ("No records match the current filter".to_string(), theme.text_dim)
            }
            _ => ("No records".to_string(), theme.text_dim),
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(color))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let columns = R::columns();
    let header = Row::new(columns.iter().map(|column| {
        Cell::from(column.label).style(Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD))
    }));
    let rows: Vec<Row> = page
        .iter()
        .map(|record| {
            Row::new(columns.iter().map(|column| {
                let value = record.cell(column.key);
                let style = match column.key {
                    "role" => Style::default().fg(role_color(&value, theme)),
                    _ => Style::default().fg(theme.text),
                };
                Cell::from(value).style(style)
            }))
        })
        .collect();
    let widths: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Ratio(1, columns.len().max(1) as u32))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(theme.bg_highlight)
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(screen.cursor()));
    f.render_stateful_widget(table, area, &mut state);

    if let Some(err) = store.error() {
        let stale = Line::from(Span::styled(
            format!(" showing last loaded data: {} ", err),
            Style::default().fg(theme.warning),
        ));
        let bottom = Rect {
            y: area.bottom().saturating_sub(1),
            height: 1,
            x: area.x + 1,
            width: area.width.saturating_sub(2),
        };
        f.render_widget(Paragraph::new(stale), bottom);
    }
}

/// `Showing a to b of n  [ prev 1 2 3 next ]`
pub(crate) fn render_pager(f: &mut Frame<'_>, window: PageWindow, area: Rect, theme: &Theme) {
    let numbers: Vec<Span> = window
        .page_numbers()
        .map(|number| {
            let style = if number == window.page_index {
                Style::default().fg(theme.primary).add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(theme.text_dim)
            };
            Span::styled(format!(" {} ", number), style)
        })
        .collect();

    let mut spans = vec![Span::styled(
        format!("{}  ", window.label()),
        Style::default().fg(theme.text_dim),
    )];
    spans.push(Span::styled(
        if window.has_previous() { "[ prev " } else { "       " },
        Style::default().fg(theme.text_dim),
    ));
    spans.extend(numbers);
    spans.push(Span::styled(
        if window.has_next() { " next ]" } else { "" },
        Style::default().fg(theme.text_dim),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
