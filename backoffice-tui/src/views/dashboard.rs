//! Dashboard figures and insight tables.

use crate::dashboard::{DashboardScreen, InsightTable};
use crate::theme::Theme;
use crate::views::list::render_pager;
use crate::widgets::StatusLine;
use backoffice_core::{DashboardSummary, MentorInsight, PageWindow, StudentInsight};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render(f: &mut Frame<'_>, screen: &DashboardScreen, area: Rect, theme: &Theme) {
    let Some(summary) = screen.summary() else {
        let (message, color) = match screen.error() {
            Some(err) => (err.to_string(), theme.error),
            None => ("Loading…".to_string(), theme.text_dim),
        };
        let block = Block::default()
            .title(Span::styled("Dashboard", Style::default().fg(theme.primary)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border));
        f.render_widget(Paragraph::new(message).style(Style::default().fg(color)).block(block), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(area);

    render_figures(f, summary, chunks[0], theme);

    let students = screen.student_window();
    let rows: Vec<Vec<String>> = students
        .slice(summary.students())
        .iter()
        .map(|s| s.cells().to_vec())
        .collect();
    InsightTableView {
        title: "Student Activity Insights",
        headers: &StudentInsight::HEADERS,
        rows,
        window: students,
        focused: screen.focus() == InsightTable::Students,
    }
    .render(f, chunks[1], theme);
    render_pager(f, students, chunks[2], theme);

    let mentors = screen.mentor_window();
    let rows: Vec<Vec<String>> = mentors
        .slice(summary.mentors())
        .iter()
        .map(|m| m.cells().to_vec())
        .collect();
    InsightTableView {
        title: "Mentor Insights",
        headers: &MentorInsight::HEADERS,
        rows,
        window: mentors,
        focused: screen.focus() == InsightTable::Mentors,
    }
    .render(f, chunks[3], theme);
    render_pager(f, mentors, chunks[4], theme);
}

fn render_figures(f: &mut Frame<'_>, summary: &DashboardSummary, area: Rect, theme: &Theme) {
    let block = Block::default()
        .title(Span::styled("Overview", Style::default().fg(theme.primary)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); 3])
        .split(inner);
    for (row, line) in summary.stat_rows().into_iter().zip(lines.iter()) {
        let items = row
            .into_iter()
            .map(|(label, value)| (label, value, Style::default().fg(theme.text).add_modifier(Modifier::BOLD)))
            .collect();
        StatusLine {
            items,
            label_style: Style::default().fg(theme.text_dim),
        }
        .render(f, *line);
    }
}

struct InsightTableView<'a> {
    title: &'a str,
    headers: &'a [&'static str],
    rows: Vec<Vec<String>>,
    window: PageWindow,
    focused: bool,
}

impl InsightTableView<'_> {
    fn render(self, f: &mut Frame<'_>, area: Rect, theme: &Theme) {
        let border = if self.focused { theme.border_focus } else { theme.border };
        let block = Block::default()
            .title(Span::styled(
                format!("{} ({})", self.title, self.window.total_items),
                Style::default().fg(theme.primary),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        if self.rows.is_empty() {
            let paragraph = Paragraph::new("No data available")
                .style(Style::default().fg(theme.text_dim))
                .block(block);
            f.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(self.headers.iter().map(|label| {
            Cell::from(*label).style(Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD))
        }));
        let widths: Vec<Constraint> = self
            .headers
            .iter()
            .map(|_| Constraint::Ratio(1, self.headers.len().max(1) as u32))
            .collect();
        let rows = self.rows.into_iter().map(|cells| {
            Row::new(
                cells
                    .into_iter()
                    .map(|value| Cell::from(value).style(Style::default().fg(theme.text))),
            )
        });
        f.render_widget(Table::new(rows, widths).header(header).block(block), area);
    }
}
