//! Application state and logic for the TUI.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use feedback_core::errors::{ApiResult, LoginError};
use feedback_core::model::SubmitReceipt;
use feedback_core::{AdminToken, FeedbackApi, Session};

use crate::views::{DashboardView, FeedbackView, FormField, LoginView};

/// Which view is currently active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Admin token prompt (entry point without a session)
    Login,
    /// Admin dashboard: analytics and the review list
    Dashboard,
    /// Public feedback form
    Feedback,
}

/// Messages for the Elm architecture update loop
#[derive(Debug, Clone)]
pub enum Message {
    /// Toggle help overlay
    ToggleHelp,
    /// Quit the application
    Quit,

    // Login
    LoginInput(char),
    LoginBackspace,
    LoginSubmit,
    LoginFinished(Result<(), LoginError>),
    /// Forget the credential and return to login
    Logout,
    /// The server rejected the credential
    SessionExpired,

    // Dashboard
    /// Move selection by delta (negative = up, positive = down)
    MoveSelection(i32),
    JumpToTop,
    JumpToBottom,
    /// Expand or collapse the selected review
    ToggleExpand,
    FocusSearch,
    BlurSearch,
    SearchInput(char),
    SearchBackspace,
    CycleRating,
    CyclePageSize,
    NextPage,
    PrevPage,
    ClearFilters,
    /// Refetch both admin queries now
    Refresh,

    // Feedback form
    OpenFeedback,
    CloseFeedback,
    SwitchField,
    SetRating(u8),
    NudgeRating(bool),
    FeedbackInput(char),
    FeedbackBackspace,
    SubmitFeedback,
    SubmitFinished(ApiResult<SubmitReceipt>),
    SubmitAnother,
}

/// Shared handles the views need to talk to the backend.
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn FeedbackApi>,
    pub session: Arc<Session>,
    pub runtime: Handle,
    pub poll_interval: Duration,
}

/// Application state
pub struct App {
    services: Services,

    /// Async results re-enter the loop through this channel
    outbox: mpsc::UnboundedSender<Message>,
    inbox: mpsc::UnboundedReceiver<Message>,
    invalidations: watch::Receiver<u64>,

    /// Current view mode
    pub view_mode: ViewMode,

    pub login: LoginView,

    /// Only Some while an admin session is active
    pub dashboard: Option<DashboardView>,

    pub feedback: FeedbackView,

    /// Show help overlay
    pub show_help: bool,

    /// Should quit
    pub should_quit: bool,

    /// Status message (shown in status bar)
    pub status_message: Option<String>,
}

impl App {
    /// Create a new App instance. Opens the dashboard when the session
    /// already holds a token, the login prompt otherwise.
    pub fn new(services: Services) -> Self {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let mut invalidations = services.session.subscribe_invalidations();
        invalidations.borrow_and_update();

        let mut app = Self {
            services,
            outbox,
            inbox,
            invalidations,
            view_mode: ViewMode::Login,
            login: LoginView::default(),
            dashboard: None,
            feedback: FeedbackView::default(),
            show_help: false,
            should_quit: false,
            status_message: None,
        };

        if app.services.session.is_authenticated() {
            app.enter_dashboard();
        }
        app.status_message = Some("Ready".to_string());
        app
    }

    /// Apply background work: async results, the session watch, the search
    /// debouncer and polled query completions.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(message) = self.inbox.try_recv() {
            dispatch(self, message);
        }

        if self.invalidations.has_changed().unwrap_or(false) {
            self.invalidations.borrow_and_update();
            dispatch(self, Message::SessionExpired);
        }

        let unauthorized = self
            .dashboard
            .as_mut()
            .is_some_and(|dashboard| dashboard.tick(now));
        if unauthorized {
            dispatch(self, Message::SessionExpired);
        }
    }

    /// Whether keystrokes go to a text field rather than to shortcuts.
    #[must_use]
    pub fn text_input_focused(&self) -> bool {
        match self.view_mode {
            ViewMode::Login => true,
            ViewMode::Dashboard => self
                .dashboard
                .as_ref()
                .is_some_and(|dashboard| dashboard.search_focused),
            ViewMode::Feedback => {
                self.feedback.receipt.is_none() && self.feedback.focus == FormField::Text
            }
        }
    }

    /// Drop the dashboard and stop its polling.
    pub fn shutdown(&mut self) {
        if let Some(mut dashboard) = self.dashboard.take() {
            dashboard.shutdown();
        }
    }

    fn enter_dashboard(&mut self) {
        if self.dashboard.is_none() {
            self.dashboard = Some(DashboardView::new(&self.services));
        }
        self.view_mode = ViewMode::Dashboard;
    }

    fn leave_dashboard(&mut self) {
        self.shutdown();
        self.view_mode = ViewMode::Login;
    }

    fn start_login(&mut self) {
        if self.login.pending {
            return;
        }
        if AdminToken::parse(&self.login.input).is_none() {
            self.login.error = Some(LoginError::MissingToken.to_string());
            return;
        }

        self.login.pending = true;
        self.login.error = None;

        let api = Arc::clone(&self.services.api);
        let outbox = self.outbox.clone();
        let token = self.login.input.clone();
        self.services.runtime.spawn(async move {
            let result = api.verify_token(&token).await;
            let _ = outbox.send(Message::LoginFinished(result));
        });
    }

    fn start_submit(&mut self) {
        if self.feedback.submitting {
            return;
        }
        let Ok(submission) = self.feedback.form.submit() else {
            return;
        };

        self.feedback.submitting = true;
        self.feedback.error = None;

        let api = Arc::clone(&self.services.api);
        let outbox = self.outbox.clone();
        self.services.runtime.spawn(async move {
            let result = api.submit_review(&submission).await;
            let _ = outbox.send(Message::SubmitFinished(result));
        });
    }
}

/// Run `message` and every follow-up message it produces.
pub fn dispatch(app: &mut App, message: Message) {
    let mut next = Some(message);
    while let Some(msg) = next {
        next = update(app, msg);
    }
}

/// Update the model based on a message (Elm architecture)
pub fn update(app: &mut App, message: Message) -> Option<Message> {
    // Help overlay takes priority
    if app.show_help {
        if let Message::ToggleHelp = message {
            app.show_help = false;
            return None;
        }
        // Background results still need to land
        if !matches!(
            message,
            Message::LoginFinished(_) | Message::SubmitFinished(_) | Message::SessionExpired
        ) {
            return None;
        }
    }

    match message {
        Message::ToggleHelp => {
            app.show_help = true;
            None
        }
        Message::Quit => {
            app.should_quit = true;
            None
        }

        Message::LoginInput(c) => {
            app.login.push(c);
            None
        }
        Message::LoginBackspace => {
            app.login.pop();
            None
        }
        Message::LoginSubmit => {
            app.start_login();
            None
        }
        Message::LoginFinished(result) => {
            app.login.pending = false;
            match result {
                Ok(()) => {
                    app.login.clear();
                    app.status_message = Some("Welcome to the admin dashboard".to_string());
                    match app.view_mode {
                        ViewMode::Login => app.enter_dashboard(),
                        // Polling starts once the form is closed
                        ViewMode::Feedback => app.feedback.return_to = ViewMode::Dashboard,
                        ViewMode::Dashboard => {}
                    }
                }
                Err(err) => app.login.error = Some(err.to_string()),
            }
            None
        }
        Message::Logout => {
            app.services.session.clear();
            app.leave_dashboard();
            app.status_message = Some("Logged out".to_string());
            None
        }
        Message::SessionExpired => {
            // No-op when the client already dropped the token
            app.services.session.invalidate();
            if app.dashboard.is_some() {
                app.leave_dashboard();
                app.login.error = Some("Session expired. Please log in again.".to_string());
            }
            if app.feedback.return_to == ViewMode::Dashboard {
                app.feedback.return_to = ViewMode::Login;
            }
            None
        }

        Message::MoveSelection(delta) => {
            with_dashboard(app, |d| {
                if delta > 0 {
                    d.move_down();
                } else {
                    d.move_up();
                }
            });
            None
        }
        Message::JumpToTop => {
            with_dashboard(app, DashboardView::jump_to_top);
            None
        }
        Message::JumpToBottom => {
            with_dashboard(app, DashboardView::jump_to_bottom);
            None
        }
        Message::ToggleExpand => {
            with_dashboard(app, DashboardView::toggle_expand);
            None
        }
        Message::FocusSearch => {
            with_dashboard(app, |d| d.search_focused = true);
            None
        }
        Message::BlurSearch => {
            with_dashboard(app, |d| d.search_focused = false);
            None
        }
        Message::SearchInput(c) => {
            with_dashboard(app, |d| d.push_search(c, Instant::now()));
            None
        }
        Message::SearchBackspace => {
            with_dashboard(app, |d| d.pop_search(Instant::now()));
            None
        }
        Message::CycleRating => {
            with_dashboard(app, DashboardView::cycle_rating);
            None
        }
        Message::CyclePageSize => {
            with_dashboard(app, DashboardView::cycle_page_size);
            None
        }
        Message::NextPage => {
            with_dashboard(app, DashboardView::next_page);
            None
        }
        Message::PrevPage => {
            with_dashboard(app, DashboardView::previous_page);
            None
        }
        Message::ClearFilters => {
            with_dashboard(app, DashboardView::clear_filters);
            None
        }
        Message::Refresh => {
            with_dashboard(app, DashboardView::refetch);
            app.status_message = Some("Refreshing".to_string());
            None
        }

        Message::OpenFeedback => {
            if app.view_mode != ViewMode::Feedback {
                app.feedback.return_to = app.view_mode;
                // The dashboard is torn down along with its poll timers
                app.shutdown();
                app.view_mode = ViewMode::Feedback;
            }
            None
        }
        Message::CloseFeedback => {
            if app.feedback.return_to == ViewMode::Dashboard
                && app.services.session.is_authenticated()
            {
                app.enter_dashboard();
            } else {
                app.view_mode = ViewMode::Login;
            }
            None
        }
        Message::SwitchField => {
            app.feedback.switch_field();
            None
        }
        Message::SetRating(rating) => {
            app.feedback.form.set_rating(rating);
            None
        }
        Message::NudgeRating(up) => {
            app.feedback.form.nudge_rating(up);
            None
        }
        Message::FeedbackInput(c) => {
            app.feedback.form.push_char(c);
            None
        }
        Message::FeedbackBackspace => {
            app.feedback.form.pop_char();
            None
        }
        Message::SubmitFeedback => {
            app.start_submit();
            None
        }
        Message::SubmitFinished(result) => {
            app.feedback.submitting = false;
            match result {
                Ok(receipt) => {
                    tracing::info!(id = ?receipt.id, "Feedback submitted");
                    app.feedback.receipt = Some(receipt);
                    app.status_message = Some("Feedback submitted".to_string());
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Feedback submission failed");
                    app.feedback.error = Some(err.friendly_message());
                }
            }
            None
        }
        Message::SubmitAnother => {
            app.feedback.reset();
            None
        }
    }
}

fn with_dashboard(app: &mut App, f: impl FnOnce(&mut DashboardView)) {
    if app.view_mode == ViewMode::Dashboard {
        if let Some(dashboard) = app.dashboard.as_mut() {
            f(dashboard);
        }
    }
}
