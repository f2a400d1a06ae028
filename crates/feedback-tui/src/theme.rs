//! Theme constants for the TUI.

use ratatui::style::Color;
use ratatui::widgets::BorderType;

use feedback_core::ReviewStatus;

/// Border type for all panels
pub const BORDER_TYPE: BorderType = BorderType::Rounded;

/// Focused panel border color
pub const FOCUSED: Color = Color::Green;

/// Selected item background
pub const SELECTED_BG: Color = Color::DarkGray;

/// Success / completed items
pub const SUCCESS: Color = Color::Green;

/// Secondary / in-progress items
pub const INFO: Color = Color::Blue;

/// Warnings and pending work
pub const WARNING: Color = Color::Yellow;

/// Errors and failed items
pub const ERROR: Color = Color::Red;

/// Secondary/dim text
pub const DIM: Color = Color::DarkGray;

/// Status bar color
pub const STATUS_BAR: Color = Color::Blue;

/// Action tag badges
pub const BADGE: Color = Color::Magenta;

pub const fn status_color(status: ReviewStatus) -> Color {
    match status {
        ReviewStatus::Pending => WARNING,
        ReviewStatus::Processing => INFO,
        ReviewStatus::Completed => SUCCESS,
        ReviewStatus::Failed => ERROR,
    }
}

/// Red for 1 star through green for 5.
pub const fn rating_color(rating: u8) -> Color {
    match rating {
        1 => Color::Red,
        2 => Color::LightRed,
        3 => Color::Yellow,
        4 => Color::LightGreen,
        _ => Color::Green,
    }
}
