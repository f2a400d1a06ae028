//! Client configuration loaded from the environment.
//!
//! | Variable                    | Default                 |
//! |-----------------------------|-------------------------|
//! | `FEEDBACK_API_URL`          | `http://localhost:8000` |
//! | `FEEDBACK_ADMIN_TOKEN`      | unset                   |
//! | `FEEDBACK_POLL_INTERVAL_MS` | `5000`                  |
//! | `FEEDBACK_TIMEOUT_SECS`     | `30`                    |

use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Admin views re-fetch on this cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved client settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without trailing slash.
    pub api_url: String,
    /// Initial admin credential, if one was provided.
    pub admin_token: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            admin_token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("FEEDBACK_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = normalize_base_url(&url);
        }

        config.admin_token = lookup("FEEDBACK_ADMIN_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        if let Some(raw) = lookup("FEEDBACK_POLL_INTERVAL_MS") {
            let ms = parse_positive("FEEDBACK_POLL_INTERVAL_MS", &raw)?;
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("FEEDBACK_TIMEOUT_SECS") {
            let secs = parse_positive("FEEDBACK_TIMEOUT_SECS", &raw)?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Override the base URL (e.g. from a CLI flag).
    #[must_use]
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = normalize_base_url(url);
        self
    }

    #[must_use]
    pub fn with_admin_token(mut self, token: &str) -> Self {
        let token = token.trim();
        self.admin_token = (!token.is_empty()).then(|| token.to_string());
        self
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_interval, Duration::from_millis(5000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("FEEDBACK_API_URL", "https://feedback.example.com/"),
            ("FEEDBACK_ADMIN_TOKEN", "  secret  "),
            ("FEEDBACK_POLL_INTERVAL_MS", "1500"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://feedback.example.com");
        assert_eq!(config.admin_token.as_deref(), Some("secret"));
        assert_eq!(config.poll_interval, Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let err = Config::from_lookup(lookup_from(&[("FEEDBACK_POLL_INTERVAL_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("FEEDBACK_POLL_INTERVAL_MS"));

        assert!(Config::from_lookup(lookup_from(&[("FEEDBACK_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn test_blank_token_ignored() {
        let config = Config::default().with_admin_token("   ");
        assert!(config.admin_token.is_none());
    }
}
