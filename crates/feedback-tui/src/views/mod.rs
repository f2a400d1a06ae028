//! Views for the TUI.

pub mod dashboard;
pub mod feedback;
pub mod login;

pub use dashboard::DashboardView;
pub use feedback::{FeedbackView, FormField};
pub use login::LoginView;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::theme;

/// Key hints for the bottom row, e.g. `Navigate: j/k │ Quit: q`.
pub fn hint_bar(hints: &[(&'static str, &'static str)]) -> Paragraph<'static> {
    let mut spans = Vec::new();
    for (i, (action, key)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(theme::DIM)));
        }
        spans.push(Span::styled(
            format!("{action}: "),
            Style::default().fg(theme::STATUS_BAR),
        ));
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(theme::STATUS_BAR)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Paragraph::new(Line::from(spans))
}

/// Fixed-size box centered in `area`, shrunk to fit.
pub fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Break `text` into lines of at most `width` characters, preferring spaces.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split(' ') {
            let word_len = word.chars().count();
            if len > 0 && len + 1 + word_len > width {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            // Hard-split words longer than a line
            for c in word.chars() {
                if len == width {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                line.push(c);
                len += 1;
            }
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_prefers_spaces() {
        assert_eq!(wrap("quick brown fox", 11), vec!["quick brown", "fox"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn test_centered_box_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_box(20, 4, area), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_box(80, 20, area), area);
    }
}
