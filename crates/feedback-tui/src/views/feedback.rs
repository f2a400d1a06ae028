//! Public feedback form and its success screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use feedback_core::form::{rating_label, FeedbackForm, MAX_REVIEW_CHARS};
use feedback_core::model::{SubmitReceipt, MAX_RATING};
use feedback_core::present::format_timestamp;

use crate::app::ViewMode;
use crate::theme;
use crate::views::{centered_box, hint_bar};

/// Which form field receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Rating,
    Text,
}

/// State for the feedback view
#[derive(Debug)]
pub struct FeedbackView {
    pub form: FeedbackForm,
    pub focus: FormField,
    pub submitting: bool,
    /// Last submission failure
    pub error: Option<String>,
    /// Set once the backend accepted the review
    pub receipt: Option<SubmitReceipt>,
    /// View to go back to on Esc
    pub return_to: ViewMode,
}

impl Default for FeedbackView {
    fn default() -> Self {
        Self {
            form: FeedbackForm::new(),
            focus: FormField::Rating,
            submitting: false,
            error: None,
            receipt: None,
            return_to: ViewMode::Login,
        }
    }
}

impl FeedbackView {
    pub fn switch_field(&mut self) {
        self.focus = match self.focus {
            FormField::Rating => FormField::Text,
            FormField::Text => FormField::Rating,
        };
    }

    /// Back to an empty form, keeping where Esc leads.
    pub fn reset(&mut self) {
        let return_to = self.return_to;
        *self = Self {
            return_to,
            ..Self::default()
        };
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(1)])
            .split(area);

        match &self.receipt {
            Some(receipt) => {
                Self::render_success(frame, chunks[0], receipt);
                frame.render_widget(
                    hint_bar(&[("Submit another", "Enter"), ("Back", "Esc")]),
                    chunks[1],
                );
            }
            None => {
                self.render_form(frame, chunks[0]);
                frame.render_widget(
                    hint_bar(&[
                        ("Field", "Tab"),
                        ("Rating", "1-5/←→"),
                        ("Submit", "Ctrl+S"),
                        ("Back", "Esc"),
                    ]),
                    chunks[1],
                );
            }
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let outer = centered_box(72, 20, area);
        let block = Block::default()
            .title(" Share Your Feedback ")
            .borders(Borders::ALL)
            .border_type(theme::BORDER_TYPE)
            .border_style(Style::default().fg(theme::FOCUSED));
        let inner = block.inner(outer);
        frame.render_widget(block, outer);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Rating
                Constraint::Length(1), // Rating error
                Constraint::Min(4),    // Text
                Constraint::Length(1), // Counter
                Constraint::Length(1), // Text error / submit state
            ])
            .split(inner);

        frame.render_widget(self.rating_line(), rows[0]);
        if let Some(err) = &self.form.errors().rating {
            frame.render_widget(error_line(err), rows[1]);
        }

        let text_style = if self.focus == FormField::Text {
            Style::default().fg(theme::FOCUSED)
        } else {
            Style::default().fg(theme::DIM)
        };
        let text = if self.form.text().is_empty() {
            Paragraph::new(Span::styled(
                "Share your thoughts with us...",
                Style::default().fg(theme::DIM),
            ))
        } else {
            Paragraph::new(self.form.text()).wrap(Wrap { trim: false })
        };
        frame.render_widget(
            text.block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(theme::BORDER_TYPE)
                    .border_style(text_style),
            ),
            rows[2],
        );

        let hint = self.form.chars_needed_hint().unwrap_or_default();
        let counter = format!("{}/{MAX_REVIEW_CHARS}", self.form.char_count());
        let counter_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(rows[3]);
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(theme::DIM))),
            counter_row[0],
        );
        frame.render_widget(
            Paragraph::new(Span::styled(counter, Style::default().fg(theme::DIM)))
                .alignment(ratatui::layout::Alignment::Right),
            counter_row[1],
        );

        if self.submitting {
            frame.render_widget(
                Paragraph::new(Span::styled("Submitting...", Style::default().fg(theme::WARNING))),
                rows[4],
            );
        } else if let Some(err) = self.form.errors().review.as_ref().or(self.error.as_ref()) {
            frame.render_widget(error_line(err), rows[4]);
        }
    }

    fn rating_line(&self) -> Paragraph<'static> {
        let rating = self.form.rating();
        let star_style = if self.focus == FormField::Rating {
            Style::default().fg(theme::WARNING).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme::WARNING)
        };

        let mut spans = vec![Span::raw("How was your experience?  ")];
        for value in 1..=MAX_RATING {
            let star = if value <= rating { "★ " } else { "☆ " };
            spans.push(Span::styled(star, star_style));
        }
        spans.push(Span::styled(
            rating_label(rating),
            Style::default().fg(theme::DIM),
        ));
        Paragraph::new(Line::from(spans))
    }

    fn render_success(frame: &mut Frame, area: Rect, receipt: &SubmitReceipt) {
        let outer = centered_box(72, 14, area);
        let mut lines = vec![
            Line::from(Span::styled(
                "Thank you!",
                Style::default()
                    .fg(theme::SUCCESS)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Your feedback has been submitted",
                Style::default().fg(theme::DIM),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Our response",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(receipt.ai_response.clone()),
        ];
        if let Some(at) = &receipt.created_at {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Submitted {}", format_timestamp(at)),
                Style::default().fg(theme::DIM),
            )));
        }

        let block = Block::default()
            .title(" Feedback Submitted ")
            .borders(Borders::ALL)
            .border_type(theme::BORDER_TYPE)
            .border_style(Style::default().fg(theme::SUCCESS));
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
            outer,
        );
    }
}

fn error_line(message: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(message, Style::default().fg(theme::ERROR)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_return_target() {
        let mut view = FeedbackView {
            return_to: ViewMode::Dashboard,
            ..FeedbackView::default()
        };
        view.form.set_rating(3);
        view.focus = FormField::Text;
        view.error = Some("Unable to reach the server".into());

        view.reset();
        assert_eq!(view.form.rating(), 0);
        assert_eq!(view.focus, FormField::Rating);
        assert!(view.error.is_none());
        assert_eq!(view.return_to, ViewMode::Dashboard);
    }
}
