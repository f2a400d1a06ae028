//! Admin login prompt.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme;
use crate::views::{centered_box, hint_bar};

/// State for the login view
#[derive(Debug, Default)]
pub struct LoginView {
    /// Token as typed; rendered masked
    pub input: String,
    pub error: Option<String>,
    /// Verification in flight
    pub pending: bool,
}

impl LoginView {
    pub fn push(&mut self, c: char) {
        if !self.pending {
            self.input.push(c);
            self.error = None;
        }
    }

    pub fn pop(&mut self) {
        if !self.pending {
            self.input.pop();
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.error = None;
    }

    fn masked(&self) -> String {
        "•".repeat(self.input.chars().count())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, status: Option<&str>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(9), Constraint::Length(1)])
            .split(area);

        let form_area = centered_box(56, 9, chunks[0]);

        let input_style = if self.pending {
            Style::default().fg(theme::DIM)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let mut lines = vec![
            Line::from(Span::styled(
                "Enter your admin token to access the dashboard",
                Style::default().fg(theme::DIM),
            )),
            Line::from(""),
            Line::from(vec![
                Span::raw("Token: "),
                Span::styled(self.masked(), input_style),
                Span::styled("▏", Style::default().fg(theme::FOCUSED)),
            ]),
            Line::from(""),
        ];

        if self.pending {
            lines.push(Line::from(Span::styled(
                "Verifying...",
                Style::default().fg(theme::WARNING),
            )));
        } else if let Some(err) = &self.error {
            lines.push(Line::from(Span::styled(
                err.as_str(),
                Style::default().fg(theme::ERROR),
            )));
        } else if let Some(status) = status {
            lines.push(Line::from(Span::styled(status, Style::default().fg(theme::DIM))));
        }

        let block = Block::default()
            .title(" Admin Login ")
            .borders(Borders::ALL)
            .border_type(theme::BORDER_TYPE)
            .border_style(Style::default().fg(theme::FOCUSED));
        frame.render_widget(Paragraph::new(lines).block(block), form_area);

        frame.render_widget(
            hint_bar(&[("Login", "Enter"), ("Feedback", "Tab"), ("Quit", "Esc")]),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_locked_while_pending() {
        let mut view = LoginView::default();
        view.push('a');
        view.pending = true;
        view.push('b');
        view.pop();
        assert_eq!(view.input, "a");
        assert_eq!(view.masked(), "•");
    }
}
