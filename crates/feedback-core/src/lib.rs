//! Client logic for the feedback desk.
//!
//! This crate owns the wire model, the admin list filter, search debouncing,
//! the polled query cache, the admin session, the HTTP client, form
//! validation and the presentation rules shared by every front end.

pub mod cache;
pub mod client;
pub mod config;
pub mod debounce;
pub mod errors;
pub mod filter;
pub mod form;
pub mod model;
pub mod poller;
pub mod present;
pub mod session;
pub mod sources;

pub use client::{ApiClient, FeedbackApi};
pub use config::Config;
pub use errors::{ApiError, ApiResult, ConfigError, LoginError};
pub use filter::{FilterQuery, FilterState};
pub use model::{AnalyticsSnapshot, Review, ReviewId, ReviewPage, ReviewStatus, ReviewSubmission, SubmitReceipt};
pub use session::{AdminToken, Session};
