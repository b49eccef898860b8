//! Chat panel: the conversation, bottom-aligned, plus the typing indicator

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::message::{sanitize, Message, Sender};
use crate::render::{Conversation, Entry};

const TYPING_FRAMES: &[&str] = &["·  ", "·· ", "···", " ··", "  ·", "   "];

/// Widget drawing a [`Conversation`]
pub struct ChatView<'a> {
    conversation: &'a Conversation,
    show_timestamps: bool,
    tick: usize,
}

impl<'a> ChatView<'a> {
    pub fn new(conversation: &'a Conversation) -> Self {
        Self {
            conversation,
            show_timestamps: true,
            tick: 0,
        }
    }

    pub fn show_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    /// Animation frame for the typing indicator
    pub fn tick(mut self, tick: usize) -> Self {
        self.tick = tick;
        self
    }

    /// All lines for the conversation at `width`, oldest first
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for entry in self.conversation.entries() {
            match entry {
                Entry::Message { message, .. } => {
                    lines.extend(self.message_lines(&message, width));
                }
                Entry::Typing { .. } => lines.push(self.typing_line()),
            }
        }
        lines
    }

    /// How far the view can scroll back at this size
    pub fn max_scroll(&self, width: u16, height: u16) -> usize {
        self.lines(width).len().saturating_sub(height as usize)
    }

    fn message_lines(&self, message: &Message, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let label_style = match message.sender() {
            Sender::User => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            Sender::Bot => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        };
        let mut header = vec![Span::styled(message.sender().label(), label_style)];
        if self.show_timestamps {
            header.push(Span::styled(
                format!(" ({})", message.timestamp()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(header));

        // Two columns of indent under the header
        let wrap_width = (width as usize).saturating_sub(2).max(1);
        let text = sanitize(message.text());
        for wrapped in textwrap::wrap(&text, wrap_width) {
            lines.push(Line::from(format!("  {}", wrapped)));
        }

        lines.push(Line::default());
        lines
    }

    fn typing_line(&self) -> Line<'static> {
        let frame = TYPING_FRAMES[self.tick % TYPING_FRAMES.len()];
        Line::from(vec![
            Span::styled(
                Sender::Bot.label(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" is typing {}", frame),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
    }
}

impl Widget for ChatView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let lines = self.lines(area.width);
        let visible = area.height as usize;
        let max_back = lines.len().saturating_sub(visible);
        let back = if self.conversation.is_following() {
            0
        } else {
            self.conversation.scroll_back().min(max_back)
        };

        // Bottom-aligned: skip everything above the window
        let skip = max_back - back;
        let shown: Vec<Line> = lines.into_iter().skip(skip).take(visible).collect();
        Paragraph::new(shown).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(conversation: &Conversation, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| {
                f.render_widget(
                    ChatView::new(conversation).show_timestamps(false),
                    f.area(),
                )
            })
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_renders_messages_in_order() {
        let mut conv = Conversation::new();
        conv.render(Message::user("2+2?"));
        conv.render(Message::bot("4"));

        let rows = draw(&conv, 30, 6);
        assert_eq!(rows, vec!["You", "  2+2?", "", "Tutor", "  4", ""]);
    }

    #[test]
    fn test_typing_indicator_is_last_row() {
        let mut conv = Conversation::new();
        conv.render(Message::user("hello"));
        conv.show_typing();

        let rows = draw(&conv, 30, 4);
        assert!(rows[3].starts_with("Tutor is typing"));
    }

    #[test]
    fn test_bottom_aligned_when_overflowing() {
        let mut conv = Conversation::new();
        for i in 0..5 {
            conv.render(Message::user(format!("question {}", i)));
        }

        let rows = draw(&conv, 30, 3);
        assert_eq!(rows, vec!["You", "  question 4", ""]);
    }

    #[test]
    fn test_scroll_back_shows_older_lines() {
        let mut conv = Conversation::new();
        for i in 0..5 {
            conv.render(Message::user(format!("question {}", i)));
        }
        conv.scroll_up(3);

        let rows = draw(&conv, 30, 3);
        assert_eq!(rows, vec!["You", "  question 3", ""]);
    }

    #[test]
    fn test_escape_sequences_are_not_drawn() {
        let mut conv = Conversation::new();
        conv.render(Message::bot("\x1b[31mred"));

        let rows = draw(&conv, 30, 3);
        assert!(!rows[1].contains('\x1b'));
        assert!(rows[1].contains("[31mred"));
    }

    #[test]
    fn test_long_text_wraps() {
        let mut conv = Conversation::new();
        conv.render(Message::bot("one two three four five six"));

        let view = ChatView::new(&conv);
        // header + wrapped body + blank line
        assert!(view.lines(12).len() > 3);
    }
}
