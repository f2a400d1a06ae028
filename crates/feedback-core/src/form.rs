//! Feedback form state and client-side validation.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::model::{ReviewSubmission, MAX_RATING, MIN_RATING};

pub const MIN_REVIEW_CHARS: usize = 10;
pub const MAX_REVIEW_CHARS: usize = 2000;

/// Label shown next to a selected star rating.
#[must_use]
pub const fn rating_label(rating: u8) -> &'static str {
    match rating {
        1 => "Very Poor",
        2 => "Poor",
        3 => "Average",
        4 => "Good",
        5 => "Excellent",
        _ => "",
    }
}

/// Raw form values as entered. A rating of 0 means none selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ReviewDraft {
    #[validate(range(min = 1, max = 5, message = "Please select a rating"))]
    pub rating: u8,
    #[validate(custom(function = "validate_review_text"))]
    pub review: String,
}

fn validate_review_text(review: &str) -> Result<(), ValidationError> {
    let trimmed = review.trim().chars().count();
    let message = if trimmed == 0 {
        "Please enter your feedback"
    } else if trimmed < MIN_REVIEW_CHARS {
        "Please enter at least 10 characters"
    } else if review.chars().count() > MAX_REVIEW_CHARS {
        "Review must be 2000 characters or less"
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new("review_length");
    err.message = Some(Cow::Borrowed(message));
    Err(err)
}

/// Per-field messages from a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub rating: Option<String>,
    pub review: Option<String>,
}

impl FormErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rating.is_none() && self.review.is_none()
    }

    fn from_validation(errors: &ValidationErrors) -> Self {
        let first_message = |field: &str| {
            errors
                .field_errors()
                .get(field)
                .and_then(|errs| errs.first())
                .and_then(|err| err.message.as_ref())
                .map(ToString::to_string)
        };
        Self {
            rating: first_message("rating"),
            review: first_message("review"),
        }
    }
}

impl ReviewDraft {
    /// Validate and build the submission body (review text trimmed).
    pub fn to_submission(&self) -> Result<ReviewSubmission, FormErrors> {
        self.validate()
            .map_err(|errors| FormErrors::from_validation(&errors))?;
        Ok(ReviewSubmission {
            rating: self.rating,
            review: self.review.trim().to_string(),
        })
    }
}

/// Editable form: rating selection, capped text input, field errors.
#[derive(Debug, Clone, Default)]
pub struct FeedbackForm {
    draft: ReviewDraft,
    errors: FormErrors,
}

impl FeedbackForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn rating(&self) -> u8 {
        self.draft.rating
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.draft.review
    }

    #[must_use]
    pub const fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Select a rating (0 clears). Out-of-range values are ignored.
    pub fn set_rating(&mut self, rating: u8) {
        if rating <= MAX_RATING {
            self.draft.rating = rating;
            self.errors.rating = None;
        }
    }

    /// Step the rating up or down within 1..=5.
    pub fn nudge_rating(&mut self, up: bool) {
        let next = match (self.draft.rating, up) {
            (r, true) => (r + 1).min(MAX_RATING),
            (0 | 1, false) => MIN_RATING,
            (r, false) => r - 1,
        };
        self.set_rating(next);
    }

    /// Append a character; ignored once the text is at the length cap.
    pub fn push_char(&mut self, c: char) -> bool {
        if self.draft.review.chars().count() >= MAX_REVIEW_CHARS {
            return false;
        }
        self.draft.review.push(c);
        self.errors.review = None;
        true
    }

    pub fn pop_char(&mut self) {
        if self.draft.review.pop().is_some() {
            self.errors.review = None;
        }
    }

    /// Replace the text. Input longer than the cap is rejected whole.
    pub fn set_text(&mut self, text: &str) -> bool {
        if text.chars().count() > MAX_REVIEW_CHARS {
            return false;
        }
        self.draft.review = text.to_string();
        self.errors.review = None;
        true
    }

    /// Trimmed character count, as shown in the counter.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.draft.review.trim().chars().count()
    }

    /// "N more characters" while below the minimum.
    #[must_use]
    pub fn chars_needed_hint(&self) -> Option<String> {
        let needed = MIN_REVIEW_CHARS.saturating_sub(self.char_count());
        (needed > 0).then(|| format!("{needed} more characters"))
    }

    /// Validate. On failure the errors are kept on the form.
    pub fn submit(&mut self) -> Result<ReviewSubmission, FormErrors> {
        match self.draft.to_submission() {
            Ok(submission) => {
                self.errors = FormErrors::default();
                Ok(submission)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(rating: u8, review: &str) -> ReviewDraft {
        ReviewDraft {
            rating,
            review: review.to_string(),
        }
    }

    #[test]
    fn test_valid_submission_is_trimmed() {
        let submission = draft(4, "  Great service, quick delivery \n")
            .to_submission()
            .unwrap();
        assert_eq!(submission.rating, 4);
        assert_eq!(submission.review, "Great service, quick delivery");
    }

    #[test]
    fn test_missing_rating_and_text() {
        let errors = draft(0, "   ").to_submission().unwrap_err();
        assert_eq!(errors.rating.as_deref(), Some("Please select a rating"));
        assert_eq!(errors.review.as_deref(), Some("Please enter your feedback"));
    }

    #[test]
    fn test_length_bounds() {
        let short = draft(3, "too short").to_submission().unwrap_err();
        assert_eq!(
            short.review.as_deref(),
            Some("Please enter at least 10 characters")
        );
        assert!(short.rating.is_none());

        assert!(draft(3, "ten chars!").to_submission().is_ok());
        assert!(draft(3, &"x".repeat(2000)).to_submission().is_ok());

        let long = draft(3, &"x".repeat(2001)).to_submission().unwrap_err();
        assert_eq!(
            long.review.as_deref(),
            Some("Review must be 2000 characters or less")
        );
    }

    #[test]
    fn test_input_capped_at_max() {
        let mut form = FeedbackForm::new();
        assert!(form.set_text(&"a".repeat(MAX_REVIEW_CHARS)));
        assert!(!form.push_char('b'));
        assert_eq!(form.text().len(), MAX_REVIEW_CHARS);
        assert!(!form.set_text(&"a".repeat(MAX_REVIEW_CHARS + 1)));
    }

    #[test]
    fn test_editing_clears_field_error() {
        let mut form = FeedbackForm::new();
        assert!(form.submit().is_err());
        assert!(form.errors().rating.is_some());
        assert!(form.errors().review.is_some());

        form.set_rating(5);
        assert!(form.errors().rating.is_none());
        assert!(form.errors().review.is_some());

        form.push_char('h');
        assert!(form.errors().review.is_none());
    }

    #[test]
    fn test_counter_hint() {
        let mut form = FeedbackForm::new();
        form.set_text("  hello ");
        assert_eq!(form.char_count(), 5);
        assert_eq!(form.chars_needed_hint().as_deref(), Some("5 more characters"));
        form.set_text("hello world");
        assert!(form.chars_needed_hint().is_none());
    }

    #[test]
    fn test_nudge_rating_stays_in_range() {
        let mut form = FeedbackForm::new();
        form.nudge_rating(false);
        assert_eq!(form.rating(), 1);
        for _ in 0..10 {
            form.nudge_rating(true);
        }
        assert_eq!(form.rating(), 5);
        assert_eq!(rating_label(form.rating()), "Excellent");
    }
}
