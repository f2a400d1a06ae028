//! [`QuerySource`] adapters over a [`FeedbackApi`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::FeedbackApi;
use crate::errors::ApiResult;
use crate::filter::FilterQuery;
use crate::model::{AnalyticsSnapshot, ReviewPage};
use crate::poller::{PolledQuery, QuerySource};

/// Admin review list, keyed by the full filter.
pub struct ReviewListSource {
    api: Arc<dyn FeedbackApi>,
}

impl ReviewListSource {
    pub fn new(api: Arc<dyn FeedbackApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl QuerySource for ReviewListSource {
    type Key = FilterQuery;
    type Output = ReviewPage;

    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn fetch(&self, key: &FilterQuery) -> ApiResult<ReviewPage> {
        self.api.list_reviews(key).await
    }
}

/// Aggregate counts; there is only one key.
pub struct AnalyticsSource {
    api: Arc<dyn FeedbackApi>,
}

impl AnalyticsSource {
    pub fn new(api: Arc<dyn FeedbackApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl QuerySource for AnalyticsSource {
    type Key = ();
    type Output = AnalyticsSnapshot;

    fn name(&self) -> &'static str {
        "analytics"
    }

    async fn fetch(&self, _key: &()) -> ApiResult<AnalyticsSnapshot> {
        self.api.analytics().await
    }
}

pub type ReviewListQuery = PolledQuery<ReviewListSource>;
pub type AnalyticsQuery = PolledQuery<AnalyticsSource>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ApiError, LoginError};
    use crate::model::{ReviewSubmission, SubmitReceipt};
    use crate::session::{AdminToken, Session};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::runtime::Handle;

    /// Rejects every admin call the way the HTTP client does on a 401.
    struct RejectingApi {
        session: Arc<Session>,
        calls: AtomicUsize,
    }

    impl RejectingApi {
        fn reject(&self) -> ApiError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.session.invalidate();
            ApiError::Unauthorized {
                message: "Invalid admin token".into(),
            }
        }
    }

    #[async_trait]
    impl FeedbackApi for RejectingApi {
        async fn list_reviews(&self, _query: &FilterQuery) -> ApiResult<ReviewPage> {
            Err(self.reject())
        }

        async fn analytics(&self) -> ApiResult<AnalyticsSnapshot> {
            Err(self.reject())
        }

        async fn submit_review(&self, _s: &ReviewSubmission) -> ApiResult<SubmitReceipt> {
            unreachable!("not used by admin queries")
        }

        async fn verify_token(&self, _raw: &str) -> Result<(), LoginError> {
            unreachable!("not used by admin queries")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_not_retried_and_cleared_once() {
        let session = Arc::new(Session::new(AdminToken::parse("expired")));
        let api = Arc::new(RejectingApi {
            session: Arc::clone(&session),
            calls: AtomicUsize::new(0),
        });
        let period = Duration::from_millis(5000);

        let mut reviews = PolledQuery::start(
            Arc::new(ReviewListSource::new(api.clone())),
            FilterQuery::default(),
            period,
            Handle::current(),
        );
        let mut analytics = PolledQuery::start(
            Arc::new(AnalyticsSource::new(api.clone())),
            (),
            period,
            Handle::current(),
        );

        let r = reviews.process_next().await;
        let a = analytics.process_next().await;
        assert!(r.unauthorized);
        assert!(a.unauthorized);
        assert_eq!(r.retried + a.retried, 0);

        assert!(!reviews.view().is_error);
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.invalidation_count(), 1);
        assert!(session.get().is_none());
    }
}
