//! UI rendering for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, ViewMode};
use crate::theme;

/// Draw the entire UI
pub fn draw(frame: &mut Frame, app: &mut App) {
    let status = app.status_message.as_deref();
    match app.view_mode {
        ViewMode::Login => app.login.render(frame, frame.area(), status),
        ViewMode::Dashboard => {
            if let Some(dashboard) = app.dashboard.as_mut() {
                dashboard.render(frame, frame.area(), status);
            }
        }
        ViewMode::Feedback => app.feedback.render(frame, frame.area()),
    }

    // Draw help overlay if active
    if app.show_help {
        draw_help_popup(frame, app);
    }
}

/// Draw help popup
fn draw_help_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 70, frame.area());

    frame.render_widget(Clear, area);

    let help_text = match app.view_mode {
        ViewMode::Login => help_text_login(),
        ViewMode::Dashboard => help_text_dashboard(),
        ViewMode::Feedback => help_text_feedback(),
    };

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(theme::BORDER_TYPE)
        .border_style(Style::default().fg(theme::FOCUSED));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}

fn heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn help_text_login() -> Vec<Line<'static>> {
    vec![
        heading("Login"),
        Line::from("  Enter      Verify token"),
        Line::from("  Tab        Open feedback form"),
        Line::from(""),
        heading("General"),
        Line::from("  Esc        Quit"),
        Line::from("  Ctrl+C     Quit"),
        Line::from("  Ctrl+Z     Suspend"),
    ]
}

fn help_text_dashboard() -> Vec<Line<'static>> {
    vec![
        heading("Navigation"),
        Line::from("  j/Down     Move down"),
        Line::from("  k/Up       Move up"),
        Line::from("  g          Jump to top"),
        Line::from("  G          Jump to bottom"),
        Line::from("  Enter      Expand/collapse review"),
        Line::from(""),
        heading("Filters"),
        Line::from("  /          Search"),
        Line::from("  r          Cycle rating filter"),
        Line::from("  p          Cycle page size"),
        Line::from("  n/]/Right  Next page"),
        Line::from("  b/[/Left   Previous page"),
        Line::from("  c          Clear filters"),
        Line::from(""),
        heading("General"),
        Line::from("  R          Refresh now"),
        Line::from("  f          Feedback form"),
        Line::from("  L          Log out"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from("  Ctrl+Z     Suspend"),
    ]
}

fn help_text_feedback() -> Vec<Line<'static>> {
    vec![
        heading("Form"),
        Line::from("  Tab        Switch field"),
        Line::from("  1-5        Select rating"),
        Line::from("  Left/Right Adjust rating"),
        Line::from("  Ctrl+S     Submit"),
        Line::from(""),
        heading("General"),
        Line::from("  Esc        Back"),
        Line::from("  ?          Toggle help"),
        Line::from("  Ctrl+Z     Suspend"),
    ]
}

/// Create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
