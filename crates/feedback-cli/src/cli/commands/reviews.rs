//! Implementation of `feedback reviews`.

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::json;

use feedback_core::filter::{Pagination, PAGE_SIZES};
use feedback_core::present::{self, Density};
use feedback_core::{FeedbackApi, FilterState, Review};

use crate::output::{Formatter, OutputFormat};

/// Flattened review for text output.
#[derive(Debug, Serialize)]
struct ReviewRow<'a> {
    id: &'a str,
    rating: u8,
    status: &'static str,
    created: String,
    review: String,
    summary: String,
    actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a Review> for ReviewRow<'a> {
    fn from(review: &'a Review) -> Self {
        let badges = present::action_badges(review, Density::Table, false);
        let mut actions = badges.shown.to_vec();
        if badges.overflow > 0 {
            actions.push(format!("+{}", badges.overflow));
        }
        Self {
            id: review.id.as_str(),
            rating: review.rating,
            status: review.status.as_str(),
            created: present::format_timestamp(&review.created_at),
            review: present::review_text(review, Density::Table, false).into_owned(),
            summary: present::summary_text(review, Density::Table, false).into_owned(),
            actions,
            error: review.error_message.as_deref(),
        }
    }
}

/// Build the list filter from command-line values.
fn build_filter(
    rating: Option<u8>,
    search: Option<String>,
    limit: u32,
    page: u32,
) -> Result<FilterState> {
    let mut filter = FilterState::new();
    if !filter.set_rating(rating) {
        bail!("Rating must be between 1 and 5");
    }
    if let Some(search) = search {
        filter.set_search(search.trim());
    }
    if !filter.set_limit(limit) {
        let sizes: Vec<String> = PAGE_SIZES.iter().map(ToString::to_string).collect();
        bail!("Page size must be one of {}", sizes.join(", "));
    }
    if !filter.set_page(page) {
        bail!("Page must be 1 or greater");
    }
    Ok(filter)
}

/// Fetch and print one page of the admin review list.
#[tracing::instrument(skip(api, formatter))]
pub async fn run_reviews(
    api: &dyn FeedbackApi,
    rating: Option<u8>,
    search: Option<String>,
    limit: u32,
    page: u32,
    formatter: &Formatter,
) -> Result<()> {
    let filter = build_filter(rating, search, limit, page)?;
    let result = api.list_reviews(filter.query()).await?;
    let pagination = Pagination::new(filter.query(), result.total);
    tracing::debug!(
        items = result.items.len(),
        total = result.total,
        "review page fetched"
    );

    if formatter.output_format() == OutputFormat::Json {
        return formatter.print_list(
            &result.items,
            "",
            "reviews",
            &[
                ("total", json!(result.total)),
                ("page", json!(pagination.current_page())),
                ("pages", json!(pagination.page_count())),
            ],
            None,
        );
    }

    let rows: Vec<ReviewRow<'_>> = result.items.iter().map(ReviewRow::from).collect();
    let empty = if filter.query().is_filtered() {
        "No reviews found. Try adjusting your filters."
    } else {
        "No reviews have been submitted yet."
    };
    let footer = format!("{}  {}", pagination.showing_label(), pagination.page_label());
    formatter.print_list(&rows, empty, "reviews", &[], Some(&footer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use feedback_core::{ReviewId, ReviewStatus};

    fn review(actions: &[&str]) -> Review {
        Review {
            id: ReviewId::new("7"),
            rating: 2,
            review: "x".repeat(120),
            ai_summary: None,
            ai_actions: Some(actions.iter().map(ToString::to_string).collect()),
            status: ReviewStatus::Failed,
            error_message: Some("model timeout".into()),
            created_at: NaiveDate::from_ymd_opt(2025, 3, 9)
                .and_then(|d| d.and_hms_opt(8, 5, 0))
                .unwrap(),
        }
    }

    #[test]
    fn test_row_applies_table_presentation() {
        let review = review(&["refund", "apologize", "follow up"]);
        let row = ReviewRow::from(&review);

        assert_eq!(row.created, "Mar 9, 2025 08:05");
        assert_eq!(row.review.chars().count(), 103);
        assert!(row.review.ends_with("..."));
        assert_eq!(row.summary, "-");
        assert_eq!(row.actions, vec!["refund", "apologize", "+1"]);
        assert_eq!(row.error, Some("model timeout"));
    }

    #[test]
    fn test_build_filter_translates_page_to_offset() {
        let filter = build_filter(Some(3), Some("  late ".into()), 50, 3).unwrap();
        let query = filter.query();
        assert_eq!(query.rating, Some(3));
        assert_eq!(query.search, "late");
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 100);
    }

    #[test]
    fn test_build_filter_rejects_bad_values() {
        assert!(build_filter(Some(6), None, 25, 1).is_err());
        assert!(build_filter(None, None, 30, 1).is_err());
        assert!(build_filter(None, None, 25, 0).is_err());
    }
}
