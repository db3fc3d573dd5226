//! Single-line `label: value` strip.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct StatusLine<'a> {
    pub items: Vec<(&'a str, String, Style)>,
    pub label_style: Style,
}

impl<'a> StatusLine<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut spans = Vec::new();
        for (index, (label, value, style)) in self.items.iter().enumerate() {
            if index > 0 {
                spans.push(Span::raw("  │  "));
            }
            spans.push(Span::styled(format!("{}: ", label), self.label_style));
            spans.push(Span::styled(value.clone(), *style));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
