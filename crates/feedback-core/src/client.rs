//! HTTP client for the feedback backend.
//!
//! [`FeedbackApi`] is the seam the rest of the crate depends on; [`ApiClient`]
//! implements it with [`reqwest`]. Admin-scoped calls carry the session token
//! and escalate a 401 to [`Session::invalidate`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;
use crate::errors::{ApiError, ApiResult, LoginError};
use crate::filter::FilterQuery;
use crate::model::{AnalyticsSnapshot, ReviewPage, ReviewSubmission, SubmitReceipt};
use crate::session::{AdminToken, Session};

/// Header carrying the admin credential.
pub const ADMIN_TOKEN_HEADER: &str = "X-ADMIN-TOKEN";

pub const REVIEWS_PATH: &str = "/api/v1/admin/reviews";
pub const ANALYTICS_PATH: &str = "/api/v1/admin/analytics";
pub const SUBMIT_PATH: &str = "/api/v1/reviews";

/// Operations offered by the feedback backend.
#[async_trait]
pub trait FeedbackApi: Send + Sync {
    /// One page of reviews matching `query`. Admin-scoped.
    async fn list_reviews(&self, query: &FilterQuery) -> ApiResult<ReviewPage>;

    /// Aggregate counts. Admin-scoped.
    async fn analytics(&self) -> ApiResult<AnalyticsSnapshot>;

    /// Submit a validated review. Public.
    async fn submit_review(&self, submission: &ReviewSubmission) -> ApiResult<SubmitReceipt>;

    /// Store `raw` as the admin credential if the backend accepts it.
    async fn verify_token(&self, raw: &str) -> Result<(), LoginError>;
}

/// Query string for a list request. Unset filters and a zero offset are left out.
#[must_use]
pub fn list_params(query: &FilterQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(4);
    if let Some(rating) = query.rating {
        params.push(("rating", rating.to_string()));
    }
    params.push(("limit", query.limit.to_string()));
    if query.offset > 0 {
        params.push(("offset", query.offset.to_string()));
    }
    if !query.search.is_empty() {
        params.push(("search", query.search.clone()));
    }
    params
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"error": {"code", "message"}}` and a top-level `{"message"}`.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .and_then(|detail| detail.message)
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
}

/// Map a non-success response to an [`ApiError`].
#[must_use]
pub fn classify(status: u16, body: &str, admin_scoped: bool) -> ApiError {
    let message = error_message(body);
    if status == 401 && admin_scoped {
        return ApiError::Unauthorized {
            message: message.unwrap_or_else(|| "Invalid admin token".to_string()),
        };
    }
    ApiError::Server {
        status,
        message: message.unwrap_or_else(|| format!("Request failed with status code {status}")),
    }
}

/// reqwest-backed [`FeedbackApi`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<Session>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    async fn get_admin<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
        escalate: bool,
    ) -> ApiResult<T> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.get(&url).query(params);
        if let Some(token) = self.session.get() {
            request = request.header(ADMIN_TOKEN_HEADER, token.expose());
        }

        tracing::debug!(%url, "GET");
        let response = request.send().await?;
        let result = Self::parse_response(response, true).await;

        if escalate {
            if let Err(ApiError::Unauthorized { .. }) = &result {
                self.session.invalidate();
            }
        }
        result
    }

    async fn ensure_success(
        response: reqwest::Response,
        admin_scoped: bool,
    ) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "Request failed");
        Err(classify(status.as_u16(), &body, admin_scoped))
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
        admin_scoped: bool,
    ) -> ApiResult<T> {
        let response = Self::ensure_success(response, admin_scoped).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl FeedbackApi for ApiClient {
    async fn list_reviews(&self, query: &FilterQuery) -> ApiResult<ReviewPage> {
        self.get_admin(REVIEWS_PATH, &list_params(query), true).await
    }

    async fn analytics(&self) -> ApiResult<AnalyticsSnapshot> {
        self.get_admin(ANALYTICS_PATH, &[], true).await
    }

    async fn submit_review(&self, submission: &ReviewSubmission) -> ApiResult<SubmitReceipt> {
        let url = format!("{}{SUBMIT_PATH}", self.base_url);
        tracing::debug!(%url, rating = submission.rating, "POST");
        let response = self.http.post(&url).json(submission).send().await?;
        Self::parse_response(response, false).await
    }

    /// The token is tried against the analytics endpoint. On any failure it
    /// is removed again; a rejection here does not count as an invalidation.
    #[tracing::instrument(skip_all)]
    async fn verify_token(&self, raw: &str) -> Result<(), LoginError> {
        let token = AdminToken::parse(raw).ok_or(LoginError::MissingToken)?;
        self.session.set(token);

        match self
            .get_admin::<AnalyticsSnapshot>(ANALYTICS_PATH, &[], false)
            .await
        {
            Ok(_) => {
                tracing::info!("Admin token accepted");
                Ok(())
            }
            Err(err) => {
                self.session.clear();
                tracing::warn!(error = %err, "Admin token verification failed");
                if err.is_unauthorized() {
                    Err(LoginError::InvalidToken)
                } else {
                    Err(LoginError::Request(err))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    type Recorded = Arc<Mutex<Vec<String>>>;

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Serve `status`/`body` to every connection and record the raw requests.
    async fn serve(status: &'static str, body: &'static str) -> (String, Recorded) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded: Recorded = Arc::default();
        let seen = Arc::clone(&recorded);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                seen.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}"), recorded)
    }

    fn client(base_url: &str, token: Option<&str>) -> ApiClient {
        let session = Arc::new(Session::new(token.and_then(AdminToken::parse)));
        let config = Config::default().with_api_url(base_url);
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_list_params_omit_defaults() {
        let params = list_params(&FilterQuery::default());
        assert_eq!(params, vec![("limit", "25".to_string())]);

        let query = FilterQuery {
            rating: Some(2),
            search: "late".into(),
            limit: 10,
            offset: 20,
        };
        let params = list_params(&query);
        assert_eq!(
            params,
            vec![
                ("rating", "2".to_string()),
                ("limit", "10".to_string()),
                ("offset", "20".to_string()),
                ("search", "late".to_string()),
            ]
        );
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error": {"code": "VALIDATION", "message": "Rating is required"}}"#)
                .as_deref(),
            Some("Rating is required")
        );
        assert_eq!(
            error_message(r#"{"message": "Not found"}"#).as_deref(),
            Some("Not found")
        );
        assert!(error_message("<html>").is_none());
    }

    #[test]
    fn test_classify_401_only_escalates_admin_calls() {
        assert!(classify(401, "", true).is_unauthorized());
        assert_eq!(
            classify(401, "", false),
            ApiError::Server {
                status: 401,
                message: "Request failed with status code 401".into()
            }
        );
    }

    #[tokio::test]
    async fn test_list_reviews_sends_token_and_params() {
        let (url, recorded) = serve("200 OK", r#"{"items": [], "total": 0}"#).await;
        let api = client(&url, Some("abc"));

        let query = FilterQuery {
            rating: Some(4),
            search: "late".into(),
            ..FilterQuery::default()
        };
        let page = api.list_reviews(&query).await.unwrap();
        assert_eq!(page.total, 0);

        let request = recorded.lock().unwrap()[0].to_lowercase();
        assert!(request.starts_with("get /api/v1/admin/reviews?rating=4&limit=25&search=late "));
        assert!(request.contains("x-admin-token: abc"));
    }

    #[tokio::test]
    async fn test_admin_401_invalidates_session_once() {
        let (url, recorded) = serve(
            "401 Unauthorized",
            r#"{"error": {"code": "UNAUTHORIZED", "message": "Invalid admin token"}}"#,
        )
        .await;
        let api = client(&url, Some("stale"));

        let first = api.analytics().await.unwrap_err();
        assert!(first.is_unauthorized());
        let second = api.list_reviews(&FilterQuery::default()).await.unwrap_err();
        assert!(second.is_unauthorized());

        assert!(api.session().get().is_none());
        assert_eq!(api.session().invalidation_count(), 1);
        assert_eq!(recorded.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_carries_message() {
        let (url, _) = serve(
            "500 Internal Server Error",
            r#"{"error": {"code": "INTERNAL", "message": "Database unavailable"}}"#,
        )
        .await;
        let api = client(&url, Some("abc"));

        let err = api.analytics().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 500,
                message: "Database unavailable".into()
            }
        );
        assert!(api.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_submit_review_posts_json() {
        let (url, recorded) = serve(
            "201 Created",
            r#"{"id": 1, "aiResponse": "Thanks!", "createdAt": "2025-01-15T10:30:00"}"#,
        )
        .await;
        let api = client(&url, None);

        let receipt = api
            .submit_review(&ReviewSubmission {
                rating: 4,
                review: "Great service, quick delivery".into(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.ai_response, "Thanks!");

        let request = recorded.lock().unwrap()[0].clone();
        assert!(request.starts_with("POST /api/v1/reviews "));
        assert!(request.contains(r#"{"rating":4,"review":"Great service, quick delivery"}"#));
        assert!(!request.to_lowercase().contains("x-admin-token"));
    }

    #[tokio::test]
    async fn test_verify_token_rejected_clears_without_invalidating() {
        let (url, _) = serve("401 Unauthorized", r#"{"message": "Invalid admin token"}"#).await;
        let api = client(&url, None);

        assert_eq!(api.verify_token("wrong").await, Err(LoginError::InvalidToken));
        assert!(!api.session().is_authenticated());
        assert_eq!(api.session().invalidation_count(), 0);

        assert_eq!(api.verify_token("  ").await, Err(LoginError::MissingToken));
    }

    #[tokio::test]
    async fn test_verify_token_accepted() {
        let (url, _) = serve("200 OK", r#"{"total": 3, "countByRating": {"5": 3}}"#).await;
        let api = client(&url, None);

        api.verify_token(" good ").await.unwrap();
        assert_eq!(api.session().get().map(|t| t.expose().to_string()).as_deref(), Some("good"));
    }
}
