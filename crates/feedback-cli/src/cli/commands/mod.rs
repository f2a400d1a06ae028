//! Command implementations.

pub mod analytics;
pub mod login;
pub mod reviews;
pub mod submit;

pub use analytics::run_analytics;
pub use login::run_login;
pub use reviews::run_reviews;
pub use submit::run_submit;

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;

    use feedback_core::{
        AnalyticsSnapshot, ApiResult, FeedbackApi, FilterQuery, LoginError, ReviewPage,
        ReviewSubmission, SubmitReceipt,
    };

    /// Backend for tests that must fail before any request is made.
    pub struct PanickingApi;

    #[async_trait]
    impl FeedbackApi for PanickingApi {
        async fn list_reviews(&self, _query: &FilterQuery) -> ApiResult<ReviewPage> {
            unreachable!("list_reviews called")
        }

        async fn analytics(&self) -> ApiResult<AnalyticsSnapshot> {
            unreachable!("analytics called")
        }

        async fn submit_review(&self, _submission: &ReviewSubmission) -> ApiResult<SubmitReceipt> {
            unreachable!("submit_review called")
        }

        async fn verify_token(&self, _token: &str) -> Result<(), LoginError> {
            unreachable!("verify_token called")
        }
    }
}
