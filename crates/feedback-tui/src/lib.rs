//! Terminal User Interface for the feedback desk.
//!
//! Admin dashboard (analytics and the review list, refreshed by polling),
//! admin login and the public feedback form.

mod app;
mod theme;
mod ui;
mod views;

pub use app::{dispatch, update, App, Message, Services, ViewMode};
pub use views::{DashboardView, FeedbackView, FormField, LoginView};

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Handle;

use feedback_core::{AdminToken, ApiClient, Config, FeedbackApi, Session};

/// Run the TUI application
pub fn run(config: &Config, runtime: Handle) -> Result<()> {
    let session = Arc::new(Session::new(
        config.admin_token.as_deref().and_then(AdminToken::parse),
    ));
    let api: Arc<dyn FeedbackApi> = Arc::new(
        ApiClient::new(config, Arc::clone(&session)).context("Failed to build HTTP client")?,
    );

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(Services {
        api,
        session,
        runtime,
        poll_interval: config.poll_interval,
    });
    tracing::info!(api_url = %config.api_url, "TUI started");

    // Run main loop
    let result = run_loop(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        app.tick(Instant::now());

        // Draw
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Handle events with timeout
        if event::poll(Duration::from_millis(100))? {
            if let Some(message) = handle_event(event::read()?, terminal, app)? {
                dispatch(app, message);
            }
        }
    }

    Ok(())
}

/// Handle an event and return a message (if any)
fn handle_event(
    event: Event,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &App,
) -> Result<Option<Message>> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            handle_key(key.code, key.modifiers, terminal, app)
        }
        _ => Ok(None),
    }
}

/// Handle keyboard input
fn handle_key(
    code: KeyCode,
    modifiers: KeyModifiers,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &App,
) -> Result<Option<Message>> {
    // Help overlay takes priority - any key dismisses it
    if app.show_help {
        return Ok(Some(Message::ToggleHelp));
    }

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    // Keys that work everywhere, even while typing
    match code {
        KeyCode::Char('z') if ctrl => {
            suspend(terminal)?;
            return Ok(None);
        }
        KeyCode::Char('c') if ctrl => return Ok(Some(Message::Quit)),
        _ => {}
    }

    // Global shortcuts, unless a text field has focus
    if !app.text_input_focused() {
        match code {
            KeyCode::Char('?') => return Ok(Some(Message::ToggleHelp)),
            KeyCode::Char('q') if app.view_mode == ViewMode::Dashboard => {
                return Ok(Some(Message::Quit))
            }
            _ => {}
        }
    }

    // View-specific keys
    Ok(match app.view_mode {
        ViewMode::Login => handle_login_key(code),
        ViewMode::Dashboard => handle_dashboard_key(code, app),
        ViewMode::Feedback => handle_feedback_key(code, ctrl, app),
    })
}

fn handle_login_key(code: KeyCode) -> Option<Message> {
    match code {
        KeyCode::Esc => Some(Message::Quit),
        KeyCode::Enter => Some(Message::LoginSubmit),
        KeyCode::Tab => Some(Message::OpenFeedback),
        KeyCode::Backspace => Some(Message::LoginBackspace),
        KeyCode::Char(c) => Some(Message::LoginInput(c)),
        _ => None,
    }
}

fn handle_dashboard_key(code: KeyCode, app: &App) -> Option<Message> {
    let searching = app
        .dashboard
        .as_ref()
        .is_some_and(|dashboard| dashboard.search_focused);

    if searching {
        return match code {
            KeyCode::Esc | KeyCode::Enter => Some(Message::BlurSearch),
            KeyCode::Backspace => Some(Message::SearchBackspace),
            KeyCode::Char(c) => Some(Message::SearchInput(c)),
            _ => None,
        };
    }

    match code {
        // Navigation
        KeyCode::Char('j') | KeyCode::Down => Some(Message::MoveSelection(1)),
        KeyCode::Char('k') | KeyCode::Up => Some(Message::MoveSelection(-1)),
        KeyCode::Char('g') => Some(Message::JumpToTop),
        KeyCode::Char('G') => Some(Message::JumpToBottom),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Message::ToggleExpand),

        // Filters
        KeyCode::Char('/') => Some(Message::FocusSearch),
        KeyCode::Char('r') => Some(Message::CycleRating),
        KeyCode::Char('p') => Some(Message::CyclePageSize),
        KeyCode::Char('n' | ']') | KeyCode::Right => Some(Message::NextPage),
        KeyCode::Char('b' | '[') | KeyCode::Left => Some(Message::PrevPage),
        KeyCode::Char('c') => Some(Message::ClearFilters),

        KeyCode::Char('R') => Some(Message::Refresh),
        KeyCode::Char('f') => Some(Message::OpenFeedback),
        KeyCode::Char('L') => Some(Message::Logout),
        KeyCode::Esc => Some(Message::Quit),
        _ => None,
    }
}

fn handle_feedback_key(code: KeyCode, ctrl: bool, app: &App) -> Option<Message> {
    let feedback = &app.feedback;

    if feedback.receipt.is_some() {
        return match code {
            KeyCode::Enter | KeyCode::Char('a') => Some(Message::SubmitAnother),
            KeyCode::Esc | KeyCode::Char('q') => Some(Message::CloseFeedback),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('s') if ctrl => return Some(Message::SubmitFeedback),
        KeyCode::Esc => return Some(Message::CloseFeedback),
        KeyCode::Tab | KeyCode::BackTab => return Some(Message::SwitchField),
        _ => {}
    }

    match feedback.focus {
        FormField::Rating => match code {
            KeyCode::Char(c @ '1'..='5') => c
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .map(Message::SetRating),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::NudgeRating(false)),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::NudgeRating(true)),
            KeyCode::Enter => Some(Message::SubmitFeedback),
            _ => None,
        },
        FormField::Text => match code {
            KeyCode::Backspace => Some(Message::FeedbackBackspace),
            KeyCode::Enter => Some(Message::FeedbackInput('\n')),
            KeyCode::Char(c) => Some(Message::FeedbackInput(c)),
            _ => None,
        },
    }
}

/// Suspend the TUI (Ctrl+Z support)
fn suspend(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    // Restore terminal before suspending
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Send SIGTSTP to suspend
    signal::kill(Pid::this(), Signal::SIGTSTP)?;

    // Re-setup terminal when resumed
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;

    Ok(())
}
