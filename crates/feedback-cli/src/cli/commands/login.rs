//! Implementation of `feedback login`.

use anyhow::Result;
use serde_json::json;

use feedback_core::{AdminToken, FeedbackApi, LoginError};

use crate::output::Formatter;

/// Verify an admin token against the analytics endpoint.
#[tracing::instrument(skip_all)]
pub async fn run_login(api: &dyn FeedbackApi, token: &str, formatter: &Formatter) -> Result<()> {
    if AdminToken::parse(token).is_none() {
        return Err(LoginError::MissingToken.into());
    }
    api.verify_token(token).await?;
    tracing::info!("admin token accepted");

    formatter.print(&json!({
        "authenticated": true,
        "hint": "export FEEDBACK_ADMIN_TOKEN to use it with other commands",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::tests::PanickingApi;
    use crate::output::OutputFormat;

    #[tokio::test]
    async fn test_missing_token_is_reported_without_a_request() {
        let err = run_login(&PanickingApi, "  ", &Formatter::new(OutputFormat::Text))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter the admin token");
    }
}
