//! Display rules for the review list.
//!
//! Everything here is pure so the terminal renderer only decides layout.

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::model::{Review, ReviewId};

/// Terminals narrower than this get the card layout.
pub const CARD_BREAKPOINT: u16 = 100;

pub const TABLE_TEXT_LIMIT: usize = 100;
pub const TABLE_SUMMARY_LIMIT: usize = 80;
pub const CARD_TEXT_LIMIT: usize = 150;

/// Action badges shown on a collapsed table row.
pub const VISIBLE_BADGES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Table,
    Card,
}

impl Density {
    #[must_use]
    pub const fn for_width(width: u16) -> Self {
        if width < CARD_BREAKPOINT {
            Self::Card
        } else {
            Self::Table
        }
    }
}

/// Cut `text` to `limit` characters, appending `...` when anything was cut.
#[must_use]
pub fn truncate(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((byte, _)) => Cow::Owned(format!("{}...", &text[..byte])),
        None => Cow::Borrowed(text),
    }
}

/// Whether a row or card has hidden content worth expanding.
#[must_use]
pub fn is_expandable(review: &Review, density: Density) -> bool {
    let chars = review.review.chars().count();
    match density {
        Density::Table => {
            chars > TABLE_TEXT_LIMIT || review.actions().len() > VISIBLE_BADGES || review.is_failed()
        }
        Density::Card => chars > CARD_TEXT_LIMIT || review.is_failed(),
    }
}

/// Review text as shown for the given expansion state.
#[must_use]
pub fn review_text(review: &Review, density: Density, expanded: bool) -> Cow<'_, str> {
    if expanded {
        return Cow::Borrowed(&review.review);
    }
    match density {
        Density::Table => truncate(&review.review, TABLE_TEXT_LIMIT),
        Density::Card => truncate(&review.review, CARD_TEXT_LIMIT),
    }
}

/// Summary column text; `-` when the AI produced none.
#[must_use]
pub fn summary_text(review: &Review, density: Density, expanded: bool) -> Cow<'_, str> {
    match review.ai_summary.as_deref() {
        None | Some("") => Cow::Borrowed("-"),
        Some(summary) if expanded || density == Density::Card => Cow::Borrowed(summary),
        Some(summary) => truncate(summary, TABLE_SUMMARY_LIMIT),
    }
}

/// Badges for the action tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badges<'a> {
    pub shown: &'a [String],
    /// Count behind the `+N` badge; 0 for none.
    pub overflow: usize,
}

#[must_use]
pub fn action_badges(review: &Review, density: Density, expanded: bool) -> Badges<'_> {
    let actions = review.actions();
    if expanded || density == Density::Card || actions.len() <= VISIBLE_BADGES {
        return Badges {
            shown: actions,
            overflow: 0,
        };
    }
    Badges {
        shown: &actions[..VISIBLE_BADGES],
        overflow: actions.len() - VISIBLE_BADGES,
    }
}

/// `Jan 5, 2025 14:03`
#[must_use]
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format("%b %-d, %Y %H:%M").to_string()
}

/// Filled and empty stars for a 1-5 rating.
#[must_use]
pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Ids of the rows the user expanded.
///
/// Tied to the set of displayed ids: when that set changes (new page, new
/// filter) everything collapses.
#[derive(Debug, Default)]
pub struct ExpandedRows {
    displayed: Vec<ReviewId>,
    expanded: HashSet<ReviewId>,
}

impl ExpandedRows {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the ids now on screen. Returns `true` if the expansion reset.
    pub fn sync<'a, I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = &'a ReviewId>,
    {
        let ids: Vec<ReviewId> = ids.into_iter().cloned().collect();
        if ids == self.displayed {
            return false;
        }
        self.displayed = ids;
        self.expanded.clear();
        true
    }

    /// Flip one row. Returns the new state.
    pub fn toggle(&mut self, id: &ReviewId) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    #[must_use]
    pub fn is_expanded(&self, id: &ReviewId) -> bool {
        self.expanded.contains(id)
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}
