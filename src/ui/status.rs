//! Status bar component

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Backend reachability as last observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Checking,
    Offline,
}

impl ConnectionStatus {
    pub fn symbol(&self) -> &str {
        match self {
            ConnectionStatus::Connected => "●",
            ConnectionStatus::Checking => "◐",
            ConnectionStatus::Offline => "✗",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            ConnectionStatus::Connected => Color::Green,
            ConnectionStatus::Checking => Color::Yellow,
            ConnectionStatus::Offline => Color::Red,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Checking => "Checking...",
            ConnectionStatus::Offline => "Backend offline",
        }
    }
}

/// One-line status bar at the bottom of the chat screen
pub struct StatusBar<'a> {
    app_name: &'a str,
    version: &'a str,
    endpoint: &'a str,
    status: &'a ConnectionStatus,
    pending: usize,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        app_name: &'a str,
        version: &'a str,
        endpoint: &'a str,
        status: &'a ConnectionStatus,
    ) -> Self {
        Self {
            app_name,
            version,
            endpoint,
            status,
            pending: 0,
        }
    }

    /// Number of questions still waiting for an answer
    pub fn pending(mut self, pending: usize) -> Self {
        self.pending = pending;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().bg(Color::DarkGray).fg(Color::White);
        buf.set_style(area, style);

        let mut spans = vec![
            Span::styled(
                format!(" {} v{} ", self.app_name, self.version),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("│ "),
            Span::styled(
                format!("{} ", self.endpoint),
                Style::default().fg(Color::White),
            ),
            Span::raw("│ "),
            Span::styled(
                format!("{} ", self.status.symbol()),
                Style::default().fg(self.status.color()),
            ),
            Span::styled(self.status.text(), Style::default().fg(self.status.color())),
        ];

        if self.pending > 0 {
            spans.push(Span::raw(" │ "));
            spans.push(Span::styled(
                format!("{} pending", self.pending),
                Style::default().fg(Color::Gray),
            ));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_status() {
        assert_eq!(ConnectionStatus::Connected.symbol(), "●");
        assert_eq!(ConnectionStatus::Connected.color(), Color::Green);
        assert_eq!(ConnectionStatus::Offline.text(), "Backend offline");
    }

    #[test]
    fn test_status_bar_shows_pending() {
        let status = ConnectionStatus::Connected;
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new("tutor", "0.1.0", "http://localhost:5000", &status)
            .pending(2)
            .render(area, &mut buf);

        let line: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(line.contains("tutor v0.1.0"));
        assert!(line.contains("2 pending"));
    }
}
