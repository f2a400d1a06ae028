//! Wire types shared by the admin views and the submission flow.
//!
//! Field names follow the backend's camelCase JSON. Reviews are read-only
//! here: the client never mutates a review it received.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lowest selectable star rating.
pub const MIN_RATING: u8 = 1;

/// Highest selectable star rating.
pub const MAX_RATING: u8 = 5;

/// Opaque review identifier.
///
/// The backend sends numeric ids; they are kept as text so nothing in the
/// client depends on their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReviewId(String);

impl ReviewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ReviewId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ReviewId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Processing state of the AI analysis for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ReviewStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted review as seen by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub rating: u8,
    pub review: String,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub ai_actions: Option<Vec<String>>,
    pub status: ReviewStatus,
    /// Only present when `status` is `FAILED`.
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Review {
    /// Action tags, or an empty slice when the AI produced none.
    #[must_use]
    pub fn actions(&self) -> &[String] {
        self.ai_actions.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == ReviewStatus::Failed
    }
}

/// One page of the admin review list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewPage {
    pub items: Vec<Review>,
    /// Count of reviews matching the filter, independent of paging.
    pub total: u64,
}

/// Aggregate submission counts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total: u64,
    /// Keyed by the rating as text ("1".."5"); order is not guaranteed.
    #[serde(default)]
    pub count_by_rating: BTreeMap<String, u64>,
}

impl AnalyticsSnapshot {
    /// Count for a single rating; ratings the backend left out count as zero.
    #[must_use]
    pub fn count_for(&self, rating: u8) -> u64 {
        self.count_by_rating
            .get(&rating.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Counts for ratings 1 through 5, in order.
    #[must_use]
    pub fn distribution(&self) -> [(u8, u64); 5] {
        [1, 2, 3, 4, 5].map(|rating| (rating, self.count_for(rating)))
    }
}

/// Body of a review submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub rating: u8,
    pub review: String,
}

/// Backend reply to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    #[serde(default)]
    pub id: Option<ReviewId>,
    pub ai_response: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_from_backend_json() {
        let json = r#"{
            "id": 42,
            "rating": 2,
            "review": "Delivery was late and the box was damaged",
            "aiSummary": "Late, damaged delivery",
            "aiActions": ["Refund shipping", "Check courier"],
            "status": "FAILED",
            "errorMessage": "LLM timeout",
            "createdAt": "2025-01-15T10:30:00"
        }"#;

        let review: Review = serde_json::from_str(json).unwrap();
        assert_eq!(review.id.as_str(), "42");
        assert_eq!(review.status, ReviewStatus::Failed);
        assert!(review.is_failed());
        assert_eq!(review.actions().len(), 2);
        assert_eq!(review.error_message.as_deref(), Some("LLM timeout"));
    }

    #[test]
    fn test_review_optional_fields_missing() {
        let json = r#"{
            "id": "abc",
            "rating": 5,
            "review": "Lovely",
            "status": "PENDING",
            "createdAt": "2025-01-15T10:30:00.123"
        }"#;

        let review: Review = serde_json::from_str(json).unwrap();
        assert!(review.ai_summary.is_none());
        assert!(review.actions().is_empty());
    }

    #[test]
    fn test_analytics_distribution_fills_gaps() {
        let json = r#"{"total": 7, "countByRating": {"5": 4, "1": 3}}"#;
        let snapshot: AnalyticsSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(
            snapshot.distribution(),
            [(1, 3), (2, 0), (3, 0), (4, 0), (5, 4)]
        );
    }

    #[test]
    fn test_submit_receipt() {
        let receipt: SubmitReceipt =
            serde_json::from_str(r#"{"id": 9, "aiResponse": "Thanks!", "createdAt": "2025-01-15T10:30:00"}"#)
                .unwrap();
        assert_eq!(receipt.ai_response, "Thanks!");
        assert_eq!(receipt.id, Some(ReviewId::new("9")));
    }
}
