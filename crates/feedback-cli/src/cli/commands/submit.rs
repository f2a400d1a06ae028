//! Implementation of `feedback submit`.

use anyhow::{bail, Result};

use feedback_core::form::{FormErrors, ReviewDraft};
use feedback_core::FeedbackApi;

use crate::output::Formatter;

/// Validate a review locally, submit it, and print the backend's reply.
#[tracing::instrument(skip(api, review, formatter))]
pub async fn run_submit(
    api: &dyn FeedbackApi,
    rating: u8,
    review: String,
    formatter: &Formatter,
) -> Result<()> {
    let draft = ReviewDraft { rating, review };
    let submission = match draft.to_submission() {
        Ok(submission) => submission,
        Err(errors) => bail!(describe_errors(&errors)),
    };

    let receipt = api.submit_review(&submission).await?;
    tracing::info!(id = ?receipt.id, "review submitted");

    formatter.print(&receipt)
}

fn describe_errors(errors: &FormErrors) -> String {
    [errors.rating.as_deref(), errors.review.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::tests::PanickingApi;
    use crate::output::OutputFormat;

    #[tokio::test]
    async fn test_invalid_review_never_reaches_the_backend() {
        let err = run_submit(
            &PanickingApi,
            0,
            "short".to_string(),
            &Formatter::new(OutputFormat::Text),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Please select a rating; Please enter at least 10 characters"
        );
    }

    #[tokio::test]
    async fn test_blank_review_is_rejected() {
        let err = run_submit(
            &PanickingApi,
            5,
            "   ".to_string(),
            &Formatter::new(OutputFormat::Text),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Please enter your feedback");
    }
}
