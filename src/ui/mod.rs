//! UI components for the TUI

mod chat;
mod input;
mod login;
mod status;
mod suggestions;

pub use chat::ChatView;
pub use input::InputBox;
pub use login::{LoginField, LoginForm};
pub use status::{ConnectionStatus, StatusBar};
pub use suggestions::Suggestions;
