//! Login screen

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::error::LoginError;
use crate::login;

use super::InputBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

/// State of the login form
#[derive(Debug)]
pub struct LoginForm {
    pub username: InputBox,
    pub password: InputBox,
    field: LoginField,
    error: Option<String>,
    authenticating: bool,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    pub fn new() -> Self {
        let mut password = InputBox::masked();
        password.set_focused(false);
        Self {
            username: InputBox::new(),
            password,
            field: LoginField::Username,
            error: None,
            authenticating: false,
        }
    }

    pub fn field(&self) -> LoginField {
        self.field
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticating(&self) -> bool {
        self.authenticating
    }

    pub fn active_mut(&mut self) -> &mut InputBox {
        match self.field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    /// Move focus to the other field
    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
        self.username
            .set_focused(self.field == LoginField::Username);
        self.password
            .set_focused(self.field == LoginField::Password);
    }

    /// Validate the fields. On success the form enters the authenticating
    /// state and returns the values to pass to [`login::authenticate`].
    pub fn submit(&mut self) -> Result<(String, String), LoginError> {
        self.error = None;
        match login::validate(self.username.content(), self.password.content()) {
            Ok(_) => {
                self.authenticating = true;
                Ok((
                    self.username.content().to_string(),
                    self.password.content().to_string(),
                ))
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn widget(&self) -> LoginView<'_> {
        LoginView { form: self }
    }
}

pub struct LoginView<'a> {
    form: &'a LoginForm,
}

impl Widget for LoginView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.min(50);
        let height = area.height.min(13);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height - height) / 2;
        let panel = Rect::new(x, y, width, height);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" AI Tutor Login ");
        let inner = block.inner(panel);
        block.render(panel, buf);

        let [username, password, error, button] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.form
            .username
            .widget("Username")
            .placeholder("Enter your username")
            .render(username, buf);
        self.form
            .password
            .widget("Password")
            .placeholder("Enter your password")
            .render(password, buf);

        if let Some(msg) = self.form.error() {
            Paragraph::new(msg)
                .style(Style::default().fg(Color::Red))
                .wrap(ratatui::widgets::Wrap { trim: true })
                .render(error, buf);
        }

        let label = if self.form.authenticating {
            "Authenticating..."
        } else {
            "[Enter] Start learning   [Tab] Switch field"
        };
        Paragraph::new(Line::from(label))
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .centered()
            .render(button, buf);
    }
}
