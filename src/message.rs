//! Core message types for the conversation panel
//!
//! A [`Message`] is immutable once it has been handed to a renderer. The
//! timestamp is captured as a display string when the message is created.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Display format for message timestamps (two-digit hour and minute)
pub const TIMESTAMP_FORMAT: &str = "%H:%M";

/// Who sent a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Tutor",
        }
    }
}

/// A single chat bubble
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    text: String,
    sender: Sender,
    timestamp: String,
}

impl Message {
    /// Create a message stamped with the current local time
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self::at(sender, text, Local::now())
    }

    /// Create a message stamped with the given time
    pub fn at(sender: Sender, text: impl Into<String>, time: DateTime<Local>) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// Replace control characters so text is always drawn as plain data.
///
/// Newlines and tabs survive; tabs become four spaces. Everything else in
/// the control range (including ESC, which would start a terminal escape
/// sequence) is replaced with U+FFFD.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push('\n'),
            '\r' => {}
            '\t' => out.push_str("    "),
            c if c.is_control() => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
    out
}
