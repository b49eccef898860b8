use crate::config::{Config, ExchangeConfig};
use crate::controller::{Cycle, ExchangeController, Settled};
use crate::error::{ExchangeError, LoginError};
use crate::login::{self, Credentials};
use crate::render::Conversation;
use crate::render::Renderer;
use crate::message::Message;
use crate::service::HttpAnswerService;
use crate::ui::{ChatView, ConnectionStatus, InputBox, LoginForm, StatusBar, Suggestions};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute, queue,
    terminal::{
        disable_raw_mode, enable_raw_mode, BeginSynchronizedUpdate, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const APP_NAME: &str = "Tutor";
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Typing indicator animation rate
const TICK_RATE: Duration = Duration::from_millis(150);
const PAGE_LINES: usize = 10;
const SIDEBAR_WIDTH: u16 = 34;

const WELCOME: &str = "Hello! I'm your AI tutor. Ask me a question, or press F1-F6 to pick a suggestion.";

type Controller = ExchangeController<HttpAnswerService, Conversation, InputBox>;

/// Input modes determine which keybindings are active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Login,
    Authenticating,
    Chat,
}

/// Actions that can be triggered by key events
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    InsertChar(char),
    DeleteBack,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    Submit,
    ClearInput,
    HistoryPrev,
    HistoryNext,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Suggest(usize),
    SwitchField,
    Quit,
}

/// Map a key event to an action based on the current input mode
fn map_key(mode: InputMode, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Up if mode == InputMode::Chat => Some(Action::ScrollUp),
            KeyCode::Down if mode == InputMode::Chat => Some(Action::ScrollDown),
            _ => None,
        };
    }

    match mode {
        InputMode::Login => map_key_login(key),
        InputMode::Authenticating => None,
        InputMode::Chat => map_key_chat(key),
    }
}

fn map_key_editing(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char(c) => Some(Action::InsertChar(c)),
        KeyCode::Backspace => Some(Action::DeleteBack),
        KeyCode::Left => Some(Action::CursorLeft),
        KeyCode::Right => Some(Action::CursorRight),
        KeyCode::Home => Some(Action::CursorHome),
        KeyCode::End => Some(Action::CursorEnd),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Esc => Some(Action::ClearInput),
        _ => None,
    }
}

fn map_key_login(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => Some(Action::SwitchField),
        _ => map_key_editing(key),
    }
}

fn map_key_chat(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::F(n) if n >= 1 => Some(Action::Suggest(n as usize - 1)),
        KeyCode::Up => Some(Action::HistoryPrev),
        KeyCode::Down => Some(Action::HistoryNext),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown => Some(Action::PageDown),
        _ => map_key_editing(key),
    }
}

/// Results delivered back to the UI task
#[derive(Debug)]
enum AppEvent {
    Settled(Cycle, Result<String, ExchangeError>),
    Liveness(Result<String, ExchangeError>),
    Authenticated(Result<Credentials, LoginError>),
}

/// Application state
pub struct App {
    config: Config,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    controller: Controller,
    /// Present while the login screen is showing
    login: Option<LoginForm>,
    status: ConnectionStatus,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
    selected_suggestion: Option<usize>,
    /// Chat panel area from the last draw, for scroll clamping
    chat_area: Rect,
    tick: usize,
    should_quit: bool,
}

impl App {
    /// Create a new application
    pub fn new(config: Config) -> Result<Self> {
        let service = HttpAnswerService::from_config(&config.service)?;
        let controller = ExchangeController::new(
            Arc::new(service),
            Conversation::new(),
            InputBox::new(),
            ExchangeConfig::from_config(&config),
        );
        let login = config.ui.show_login.then(LoginForm::new);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            crossterm::terminal::SetTitle(format!("{} v{}", APP_NAME, APP_VERSION)),
        )
        .context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        Ok(Self {
            config,
            terminal,
            controller,
            login,
            status: ConnectionStatus::Checking,
            events_tx,
            events_rx: Some(events_rx),
            selected_suggestion: None,
            chat_area: Rect::default(),
            tick: 0,
            should_quit: false,
        })
    }

    fn mode(&self) -> InputMode {
        match self.login {
            Some(ref form) if form.is_authenticating() => InputMode::Authenticating,
            Some(_) => InputMode::Login,
            None => InputMode::Chat,
        }
    }

    /// Run the main event loop
    pub async fn run(&mut self) -> Result<()> {
        let mut events_rx = self
            .events_rx
            .take()
            .context("App event loop already running")?;
        let mut terminal_events = EventStream::new();
        let mut ticker = tokio::time::interval(TICK_RATE);

        if self.login.is_none() {
            self.start_chat();
        }

        loop {
            self.draw()?;

            tokio::select! {
                maybe_event = terminal_events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = map_key(self.mode(), key) {
                            self.handle_action(action);
                        }
                    }
                    Some(Ok(Event::Mouse(mouse))) => self.handle_mouse_event(mouse),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                    None => break,
                },
                Some(event) = events_rx.recv() => self.handle_app_event(event),
                _ = ticker.tick() => self.tick = self.tick.wrapping_add(1),
            }

            if self.should_quit {
                break;
            }
        }

        self.cleanup()
    }

    /// Leave the login screen and open the chat
    fn start_chat(&mut self) {
        self.login = None;
        self.controller
            .renderer_mut()
            .render(Message::bot(WELCOME));

        // Liveness probe runs in the background; sending is never blocked on it
        self.status = ConnectionStatus::Checking;
        let probe = self.controller.liveness_probe();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Liveness(probe.await));
        });
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Settled(cycle, outcome) => match self.controller.settle(cycle, outcome) {
                Settled::Answered => self.status = ConnectionStatus::Connected,
                Settled::Failed => self.status = ConnectionStatus::Offline,
                Settled::Discarded | Settled::Unknown => {}
            },
            AppEvent::Liveness(outcome) => {
                self.status = if self.controller.on_liveness(outcome) {
                    ConnectionStatus::Connected
                } else {
                    ConnectionStatus::Offline
                };
            }
            AppEvent::Authenticated(Ok(credentials)) => {
                tracing::info!(username = %credentials.username, "logged in");
                self.start_chat();
            }
            AppEvent::Authenticated(Err(e)) => {
                tracing::warn!("login failed: {}", e);
                self.login = Some(LoginForm::new());
            }
        }
    }

    /// Handle an action
    fn handle_action(&mut self, action: Action) {
        if action == Action::Quit {
            self.should_quit = true;
            return;
        }

        if let Some(ref mut form) = self.login {
            match action {
                Action::InsertChar(c) => form.active_mut().insert_char(c),
                Action::DeleteBack => form.active_mut().delete_char(),
                Action::CursorLeft => form.active_mut().move_cursor_left(),
                Action::CursorRight => form.active_mut().move_cursor_right(),
                Action::CursorHome => form.active_mut().move_cursor_start(),
                Action::CursorEnd => form.active_mut().move_cursor_end(),
                Action::ClearInput => form.active_mut().set_content(""),
                Action::SwitchField => form.toggle_field(),
                Action::Submit => {
                    if let Ok((username, password)) = form.submit() {
                        let tx = self.events_tx.clone();
                        tokio::spawn(async move {
                            let result = login::authenticate(&username, &password).await;
                            let _ = tx.send(AppEvent::Authenticated(result));
                        });
                    }
                }
                _ => {}
            }
            return;
        }

        let input = self.controller.input_mut();
        match action {
            Action::InsertChar(c) => input.insert_char(c),
            Action::DeleteBack => input.delete_char(),
            Action::CursorLeft => input.move_cursor_left(),
            Action::CursorRight => input.move_cursor_right(),
            Action::CursorHome => input.move_cursor_start(),
            Action::CursorEnd => input.move_cursor_end(),
            Action::ClearInput => input.set_content(""),
            Action::HistoryPrev => input.history_prev(),
            Action::HistoryNext => input.history_next(),
            Action::Submit => self.submit(),
            Action::Suggest(index) => {
                if let Some(question) = self.config.chat.suggestions.get(index).cloned() {
                    self.controller.suggest(&question);
                    self.selected_suggestion = Some(index);
                }
            }
            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollDown => self.controller.renderer_mut().scroll_down(1),
            Action::PageUp => self.scroll_up(PAGE_LINES),
            Action::PageDown => self.controller.renderer_mut().scroll_down(PAGE_LINES),
            Action::SwitchField | Action::Quit => {}
        }
    }

    /// Begin a cycle for the current input and run its request in the background
    fn submit(&mut self) {
        let raw = self.controller.input().content().to_string();
        let Some(cycle) = self.controller.begin(&raw) else {
            return;
        };
        self.controller.input_mut().remember(cycle.question());
        self.selected_suggestion = None;

        let request = self.controller.request(&cycle);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = request.await;
            let _ = tx.send(AppEvent::Settled(cycle, outcome));
        });
    }

    fn scroll_up(&mut self, lines: usize) {
        let max = ChatView::new(self.controller.renderer())
            .show_timestamps(self.config.ui.show_timestamps)
            .max_scroll(self.chat_area.width, self.chat_area.height);
        let conversation = self.controller.renderer_mut();
        conversation.scroll_up(lines);
        conversation.clamp_scroll(max);
    }

    /// Handle mouse events
    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.login.is_some() {
            return;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_up(3),
            MouseEventKind::ScrollDown => self.controller.renderer_mut().scroll_down(3),
            _ => {}
        }
    }

    /// Draw the UI with synchronized updates to prevent tearing
    fn draw(&mut self) -> Result<()> {
        queue!(self.terminal.backend_mut(), BeginSynchronizedUpdate)?;

        if let Some(ref form) = self.login {
            self.terminal.draw(|frame| {
                frame.render_widget(form.widget(), frame.area());
            })?;
        } else {
            let size = self.terminal.size()?;
            let input = self.controller.input();
            let input_height = input
                .required_height(size.width.saturating_sub(SIDEBAR_WIDTH))
                .min(size.height / 2);

            let chat_widget = ChatView::new(self.controller.renderer())
                .show_timestamps(self.config.ui.show_timestamps)
                .tick(self.tick);
            let input_widget = input.widget("Ask a question");
            let suggestions =
                Suggestions::new(&self.config.chat.suggestions).selected(self.selected_suggestion);
            let status_bar = StatusBar::new(
                APP_NAME,
                APP_VERSION,
                &self.config.service.base_url,
                &self.status,
            )
            .pending(self.controller.in_flight());

            let mut chat_area = Rect::default();
            self.terminal.draw(|frame| {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(3), Constraint::Length(1)])
                    .split(frame.area());
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
                    .split(rows[0]);
                let main = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(1), Constraint::Length(input_height)])
                    .split(columns[0]);

                chat_area = main[0];
                frame.render_widget(chat_widget, main[0]);
                frame.render_widget(input_widget, main[1]);
                frame.render_widget(suggestions, columns[1]);
                frame.render_widget(status_bar, rows[1]);
            })?;
            self.chat_area = chat_area;
        }

        queue!(self.terminal.backend_mut(), EndSynchronizedUpdate)?;
        self.terminal.backend_mut().flush()?;

        Ok(())
    }

    /// Cleanup terminal
    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
        )
        .context("Failed to cleanup terminal")?;
        self.terminal
            .show_cursor()
            .context("Failed to show cursor")?;

        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
