//! The view/edit/create/delete modal.

use crate::screen::{Screen, ScreenRecord};
use crate::theme::{attendance_status_color, Theme};
use crate::widgets::DetailPanel;
use backoffice_core::{EditingMode, EditingSession};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    Frame,
};

pub fn render<R: ScreenRecord>(f: &mut Frame<'_>, screen: &Screen<R>, area: Rect, theme: &Theme) {
    let Some(session) = screen.editing().session() else {
        return;
    };
    let area = centered(area, 70, 80);
    let label_style = Style::default().fg(theme.secondary);

    match session.mode() {
        EditingMode::Viewing { record } => {
            let mut panel =
                DetailPanel::new(R::KIND.title(), label_style).field("Id", record.id().to_string());
            for column in R::detail_columns() {
                panel = panel.field(column.label, record.cell(column.key));
            }
            for (entry, status) in record.detail_entries() {
                let color = attendance_status_color(&status, theme);
                panel = panel.footer_line(Line::from(vec![
                    Span::raw(format!("{}  ", entry)),
                    Span::styled(status, Style::default().fg(color)),
                ]));
            }
            panel
                .footer_line(hint("e edit • Esc close", theme))
                .render(f, area);
        }
        EditingMode::Editing { .. } | EditingMode::Creating => render_form(f, screen, session, area, theme),
        EditingMode::ConfirmingDelete { label, .. } => {
            let mut panel = DetailPanel::new("Confirm delete", label_style)
                .field("Record", label.clone())
                .footer_line(Line::from(Span::styled(
                    "This cannot be undone.",
                    Style::default().fg(theme.warning),
                )));
            panel = with_status(panel, session, theme);
            let actions = if session.is_target_missing() {
                "Esc close"
            } else {
                "Enter delete • Esc cancel"
            };
            panel.footer_line(hint(actions, theme)).render(f, area);
        }
    }
}

fn render_form<R: ScreenRecord>(
    f: &mut Frame<'_>,
    screen: &Screen<R>,
    session: &EditingSession<R>,
    area: Rect,
    theme: &Theme,
) {
    let title = match session.mode() {
        EditingMode::Creating => "New record",
        _ => "Edit record",
    };
    let form = screen.form();
    let mut lines = Vec::new();
    for (index, spec) in screen.form_fields().iter().enumerate() {
        let selected = index == form.field;
        let value = match (&form.input, selected) {
            (Some(typing), true) => format!("{}▏", typing),
            _ => session.draft().display(spec.name),
        };
        let marker = if selected { "▶ " } else { "  " };
        let label_style = if selected {
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.secondary)
        };
        let dim = Style::default().fg(theme.text_dim);
        let mut spans = vec![Span::styled(format!("{}{}: ", marker, spec.label), label_style)];
        match screen.field_options(spec.name) {
            Some(options) => {
                let label = screen
                    .option_label(spec.name, &value)
                    .filter(|label| *label != value)
                    .map(|label| format!(" · {}", label));
                spans.push(Span::raw(value));
                if let Some(label) = label {
                    spans.push(Span::styled(label, Style::default().fg(theme.text)));
                }
                spans.push(Span::styled(format!("  (←/→ {} choices)", options.len()), dim));
            }
            None => {
                spans.push(Span::raw(value));
                spans.push(Span::styled(format!("  ({})", spec.kind), dim));
            }
        }
        lines.push(Line::from(spans));
        if let Some(message) = session.field_error(spec.name) {
            lines.push(Line::from(Span::styled(
                format!("    {}", message),
                Style::default().fg(theme.error),
            )));
        }
        if selected {
            if let Some(message) = &form.error {
                lines.push(Line::from(Span::styled(
                    format!("    {}", message),
                    Style::default().fg(theme.error),
                )));
            }
        }
    }

    let mut panel = DetailPanel::new(title, Style::default().fg(theme.secondary));
    for line in lines {
        panel = panel.footer_line(line);
    }
    panel = with_status(panel, session, theme);
    let actions = if form.input.is_some() {
        "Enter accept field • Esc discard field"
    } else {
        "j/k field • e edit field • ←/→ choose • Enter submit • Esc cancel"
    };
    panel.footer_line(hint(actions, theme)).render(f, area);
}

fn with_status<'a, R: ScreenRecord>(
    panel: DetailPanel<'a>,
    session: &EditingSession<R>,
    theme: &Theme,
) -> DetailPanel<'a> {
    if session.is_in_flight() {
        return panel.footer_line(Line::from(Span::styled(
            "Saving…",
            Style::default().fg(theme.info),
        )));
    }
    match session.last_error() {
        Some(err) => panel.footer_line(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(theme.error),
        ))),
        None => panel,
    }
}

fn hint(text: &'static str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(theme.text_dim)))
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
