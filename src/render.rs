//! Conversation container and the renderer seam
//!
//! The controller only talks to the [`Renderer`] trait. [`Conversation`] is
//! the in-memory implementation the terminal UI draws from; tests use it
//! directly to inspect what was rendered.

use crate::message::Message;

/// Opaque identifier for an entry in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub usize);

/// Something that can display messages and the typing indicator
pub trait Renderer {
    /// Append a message. Always succeeds.
    fn render(&mut self, message: Message) -> Handle;

    /// Show the typing indicator, or return the one already shown
    fn show_typing(&mut self) -> Handle;

    /// Remove the typing indicator. No-op if it is absent or `handle` is stale.
    fn hide_typing(&mut self, handle: Handle);
}

/// A rendered entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message { handle: Handle, message: Message },
    Typing { handle: Handle },
}

impl Entry {
    pub fn handle(&self) -> Handle {
        match self {
            Entry::Message { handle, .. } | Entry::Typing { handle } => *handle,
        }
    }

    pub fn message(&self) -> Option<&Message> {
        match self {
            Entry::Message { message, .. } => Some(message),
            Entry::Typing { .. } => None,
        }
    }
}

/// Append-only message list plus the single typing indicator slot.
///
/// The indicator is always drawn after the messages, so it is kept out of
/// the message list and tracked as an explicit optional field.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<(Handle, Message)>,
    typing: Option<Handle>,
    next_handle: usize,
    /// Scroll offset from the bottom, in lines
    scroll_back: usize,
    /// Whether the view sticks to the newest entry
    follow: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            follow: true,
            ..Default::default()
        }
    }

    fn next_handle(&mut self) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Every mutation jumps back to the newest entry
    fn touched(&mut self) {
        self.follow = true;
        self.scroll_back = 0;
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last().map(|(_, m)| m)
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    pub fn typing_handle(&self) -> Option<Handle> {
        self.typing
    }

    /// Entries in display order: messages, then the indicator if present
    pub fn entries(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .messages
            .iter()
            .map(|(handle, message)| Entry::Message {
                handle: *handle,
                message: message.clone(),
            })
            .collect();
        if let Some(handle) = self.typing {
            entries.push(Entry::Typing { handle });
        }
        entries
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
        if self.scroll_back == 0 {
            self.follow = true;
        }
    }

    /// Clamp the scroll offset to what the view can actually show
    pub fn clamp_scroll(&mut self, max_back: usize) {
        if self.scroll_back > max_back {
            self.scroll_back = max_back;
        }
    }
}

impl Renderer for Conversation {
    fn render(&mut self, message: Message) -> Handle {
        let handle = self.next_handle();
        tracing::trace!(?handle, sender = ?message.sender(), "render message");
        self.messages.push((handle, message));
        self.touched();
        handle
    }

    fn show_typing(&mut self) -> Handle {
        if let Some(handle) = self.typing {
            return handle;
        }
        let handle = self.next_handle();
        self.typing = Some(handle);
        self.touched();
        handle
    }

    fn hide_typing(&mut self, handle: Handle) {
        if self.typing == Some(handle) {
            self.typing = None;
            self.touched();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;

    #[test]
    fn test_render_preserves_order() {
        let mut conv = Conversation::new();
        let a = conv.render(Message::user("one"));
        let b = conv.render(Message::bot("two"));
        assert!(a < b);

        let texts: Vec<&str> = conv.messages().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(conv.last().unwrap().sender(), Sender::Bot);
    }

    #[test]
    fn test_typing_is_singleton() {
        let mut conv = Conversation::new();
        let first = conv.show_typing();
        let second = conv.show_typing();
        assert_eq!(first, second);
        assert_eq!(
            conv.entries().iter().filter(|e| matches!(e, Entry::Typing { .. })).count(),
            1
        );
    }

    #[test]
    fn test_typing_is_drawn_after_messages() {
        let mut conv = Conversation::new();
        conv.render(Message::user("q"));
        conv.show_typing();
        conv.render(Message::bot("late"));

        let entries = conv.entries();
        assert!(matches!(entries.last(), Some(Entry::Typing { .. })));
    }

    #[test]
    fn test_hide_typing_twice_is_noop() {
        let mut conv = Conversation::new();
        conv.render(Message::user("hello"));
        let before = conv.entries();

        conv.hide_typing(Handle(42));
        conv.hide_typing(Handle(42));

        assert_eq!(conv.entries(), before);
        assert!(!conv.is_typing());
    }

    #[test]
    fn test_hide_typing_ignores_stale_handle() {
        let mut conv = Conversation::new();
        let first = conv.show_typing();
        conv.hide_typing(first);
        let second = conv.show_typing();

        conv.hide_typing(first);
        assert_eq!(conv.typing_handle(), Some(second));
    }

    #[test]
    fn test_mutation_resumes_follow() {
        let mut conv = Conversation::new();
        conv.render(Message::user("a"));
        conv.scroll_up(3);
        assert!(!conv.is_following());
        assert_eq!(conv.scroll_back(), 3);

        conv.render(Message::bot("b"));
        assert!(conv.is_following());
        assert_eq!(conv.scroll_back(), 0);
    }
}
