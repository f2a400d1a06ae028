//! Typed error types for the feedback client.

use thiserror::Error;

/// Result type alias for remote calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// A normalized failure from the remote API.
///
/// Errors are plain data (cloneable, comparable) so a query cache can hold
/// on to the last one while it keeps showing stale results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received (DNS, connect, reset, ...).
    #[error("Network error: {0}")]
    Transport(String),

    /// The request did not complete within the client timeout.
    #[error("Request timed out")]
    Timeout,

    /// An admin-scoped request was rejected; the session is no longer valid.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The backend answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether a single automatic retry may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Server { status, .. } => *status >= 500,
            Self::Unauthorized { .. } | Self::Decode(_) => false,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Message suitable for showing next to a retry control.
    #[must_use]
    pub fn friendly_message(&self) -> String {
        match self {
            Self::Transport(_) => "Unable to reach the server".to_string(),
            Self::Timeout => "The server took too long to respond".to_string(),
            Self::Unauthorized { message } | Self::Server { message, .. } => message.clone(),
            Self::Decode(_) => "An unexpected error occurred".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Why an admin login attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Please enter the admin token")]
    MissingToken,

    #[error("Invalid admin token. Please try again.")]
    InvalidToken,

    /// Verification could not complete for a reason other than the token.
    #[error("{}", .0.friendly_message())]
    Request(ApiError),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Timeout.is_transient());
        assert!(ApiError::Transport("reset".into()).is_transient());
        assert!(ApiError::Server {
            status: 503,
            message: "down".into()
        }
        .is_transient());
        assert!(!ApiError::Server {
            status: 400,
            message: "bad".into()
        }
        .is_transient());
        assert!(!ApiError::Unauthorized {
            message: "Invalid admin token".into()
        }
        .is_transient());
    }

    #[test]
    fn test_friendly_message_prefers_server_text() {
        let err = ApiError::Server {
            status: 500,
            message: "Database unavailable".into(),
        };
        assert_eq!(err.friendly_message(), "Database unavailable");
        assert_eq!(
            ApiError::Transport("connection refused".into()).friendly_message(),
            "Unable to reach the server"
        );
    }
}
