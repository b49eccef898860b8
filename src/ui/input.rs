//! Input box component

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::controller::InputField;

/// Single-field text input with a byte-offset cursor and sent-question history
#[derive(Debug, Default)]
pub struct InputBox {
    content: String,
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
    focused: bool,
    masked: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            focused: true,
            ..Default::default()
        }
    }

    /// An input that draws every character as `*`
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::new()
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Replace the content and move the cursor to the end
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor = self.content.len();
    }

    /// Height needed to show the whole content at `width`, borders included
    pub fn required_height(&self, width: u16) -> u16 {
        let inner_width = width.saturating_sub(2) as usize;
        if inner_width == 0 {
            return 3;
        }
        let wrapped = wrap_text(&self.display_string(), inner_width);
        (wrapped.len() as u16 + 2).clamp(3, 8)
    }

    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor
    pub fn delete_char(&mut self) {
        if let Some((idx, _)) = self.content[..self.cursor].char_indices().next_back() {
            self.content.remove(idx);
            self.cursor = idx;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some((idx, _)) = self.content[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.content[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_cursor_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.content.len();
    }

    /// Record a sent entry in history
    pub fn remember(&mut self, entry: &str) {
        self.history_index = None;
        if !entry.trim().is_empty() {
            self.history.push(entry.to_string());
        }
    }

    /// Navigate to previous history item
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }

        let new_index = match self.history_index {
            Some(0) => 0,
            Some(i) => i - 1,
            None => self.history.len() - 1,
        };

        self.history_index = Some(new_index);
        self.set_content(&self.history[new_index].clone());
    }

    /// Navigate to next history item
    pub fn history_next(&mut self) {
        match self.history_index {
            Some(i) if i + 1 < self.history.len() => {
                self.history_index = Some(i + 1);
                self.set_content(&self.history[i + 1].clone());
            }
            Some(_) => {
                self.history_index = None;
                self.content.clear();
                self.cursor = 0;
            }
            None => {}
        }
    }

    fn display_string(&self) -> String {
        if self.masked {
            "*".repeat(self.content.chars().count())
        } else {
            self.content.clone()
        }
    }

    /// Cursor offset in the display string
    fn display_cursor(&self) -> usize {
        if self.masked {
            self.content[..self.cursor].chars().count()
        } else {
            self.cursor
        }
    }

    pub fn widget<'a>(&'a self, title: &'a str) -> InputBoxWidget<'a> {
        InputBoxWidget {
            state: self,
            title,
            placeholder: "Type your question here...",
        }
    }
}

impl InputField for InputBox {
    fn set_value(&mut self, value: &str) {
        self.set_content(value);
    }

    fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.history_index = None;
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

pub struct InputBoxWidget<'a> {
    state: &'a InputBox,
    title: &'a str,
    placeholder: &'a str,
}

impl<'a> InputBoxWidget<'a> {
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for InputBoxWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.state.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", self.title));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let display = self.state.display_string();
        let wrapped_lines = wrap_text(&display, inner.width as usize);

        let paragraph = if self.state.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                self.placeholder,
                Style::default().fg(Color::DarkGray),
            )))
        } else {
            let lines: Vec<Line> = wrapped_lines.iter().map(|s| Line::from(s.as_str())).collect();
            Paragraph::new(lines)
        };
        paragraph.render(inner, buf);

        if !self.state.focused {
            return;
        }

        let (cursor_x, cursor_y) =
            cursor_position_in_wrapped(&display, self.state.display_cursor(), &wrapped_lines);
        let x = inner.x.saturating_add(cursor_x as u16);
        let y = inner.y.saturating_add(cursor_y as u16);
        if x < inner.x + inner.width && y < inner.y + inner.height {
            buf[(x, y)].set_style(Style::default().bg(Color::White).fg(Color::Black));
        }
    }
}

/// Wrap text into lines, handling explicit newlines
fn wrap_text(content: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![content.to_string()];
    }

    let mut result = Vec::new();
    for paragraph in content.split('\n') {
        if paragraph.is_empty() {
            result.push(String::new());
        } else {
            for line in wrap(paragraph, width) {
                result.push(line.into_owned());
            }
        }
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

/// Cursor (x, y) within wrapped lines for a byte offset into `content`
fn cursor_position_in_wrapped(
    content: &str,
    byte_pos: usize,
    wrapped_lines: &[String],
) -> (usize, usize) {
    // textwrap drops the whitespace at soft breaks and the '\n' at hard ones,
    // so locate each line's start in `content` instead of summing lengths
    let mut starts = Vec::with_capacity(wrapped_lines.len());
    let mut pos = 0usize;
    for (line_idx, line) in wrapped_lines.iter().enumerate() {
        let start = if line.is_empty() {
            if line_idx > 0 && content[pos..].starts_with('\n') {
                pos + 1
            } else {
                pos
            }
        } else {
            content[pos..]
                .find(line.as_str())
                .map(|offset| pos + offset)
                .unwrap_or(pos)
        };
        starts.push(start);
        pos = start + line.len();
    }

    let line_idx = starts
        .iter()
        .rposition(|&start| start <= byte_pos)
        .unwrap_or(0);
    let start = starts.get(line_idx).copied().unwrap_or(0).min(byte_pos);
    (content[start..byte_pos].width(), line_idx)
}
