//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub fields: Vec<(&'a str, String)>,
    pub style: Style,
    /// Lines after the fields (hints, errors).
    pub footer: Vec<Line<'a>>,
}

impl<'a> DetailPanel<'a> {
    pub fn new(title: &'a str, style: Style) -> Self {
        Self {
            title,
            fields: Vec::new(),
            style,
            footer: Vec::new(),
        }
    }

    pub fn field(mut self, label: &'a str, value: impl Into<String>) -> Self {
        self.fields.push((label, value.into()));
        self
    }

    pub fn footer_line(mut self, line: Line<'a>) -> Self {
        self.footer.push(line);
        self
    }

    /// Render over whatever is underneath.
    pub fn render(self, f: &mut Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = self
            .fields
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{}: ", label), self.style),
                    Span::raw(value),
                ])
            })
            .collect();
        if !self.footer.is_empty() {
            lines.push(Line::default());
            lines.extend(self.footer);
        }

        let widget = Paragraph::new(Text::from(lines))
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(widget, area);
    }
}
