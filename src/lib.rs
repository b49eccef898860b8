//! Tutor - a terminal chat client for a question/answer tutoring service
//!
//! The core is usable without a terminal: an [`ExchangeController`] drives
//! one request/response cycle per question against any [`AnswerService`],
//! echoing into any [`Renderer`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tutor::{Conversation, ExchangeConfig, ExchangeController, HttpAnswerService, InputField};
//!
//! #[derive(Default)]
//! struct Line(String);
//!
//! impl InputField for Line {
//!     fn set_value(&mut self, value: &str) { self.0 = value.to_string(); }
//!     fn clear(&mut self) { self.0.clear(); }
//!     fn focus(&mut self) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = HttpAnswerService::new("http://localhost:5000", None)?;
//!     let mut controller = ExchangeController::new(
//!         Arc::new(service),
//!         Conversation::new(),
//!         Line::default(),
//!         ExchangeConfig::default(),
//!     );
//!
//!     controller.submit("What is photosynthesis?").await;
//!     for message in controller.renderer().messages() {
//!         println!("{}: {}", message.sender().label(), message.text());
//!     }
//!     Ok(())
//! }
//! ```

// Core modules (always available)
pub mod config;
pub mod controller;
pub mod error;
pub mod login;
pub mod message;
pub mod render;
pub mod server;
pub mod service;
pub mod tutor;

// CLI-only modules
#[cfg(feature = "cli")]
pub mod app;
#[cfg(feature = "cli")]
pub mod ui;

// Re-export the public API
pub use config::{Config, ExchangeConfig, OverlapPolicy};
pub use controller::{Cycle, ExchangeController, InputField, Settled};
pub use error::{ExchangeError, LoginError};
pub use message::{Message, Sender};
pub use render::{Conversation, Handle, Renderer};
pub use server::Server;
pub use service::{AnswerService, HttpAnswerService};
