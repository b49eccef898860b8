//! Suggested-questions sidebar

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Numbered list of questions; F1..F9 picks one
pub struct Suggestions<'a> {
    items: &'a [String],
    selected: Option<usize>,
}

impl<'a> Suggestions<'a> {
    pub fn new(items: &'a [String]) -> Self {
        Self {
            items,
            selected: None,
        }
    }

    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for Suggestions<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Try asking ");

        let mut lines = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            let style = if self.selected == Some(i) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("F{} ", i + 1), Style::default().fg(Color::Yellow)),
                Span::styled(item.clone(), style),
            ]));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
