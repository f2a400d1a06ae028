//! Implementation of `feedback analytics`.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use feedback_core::form::rating_label;
use feedback_core::{AnalyticsSnapshot, FeedbackApi};

use crate::output::{write_line, Formatter, OutputFormat};

#[derive(Debug, Serialize)]
struct AnalyticsReport {
    total: u64,
    ratings: BTreeMap<u8, u64>,
}

impl From<&AnalyticsSnapshot> for AnalyticsReport {
    fn from(snapshot: &AnalyticsSnapshot) -> Self {
        Self {
            total: snapshot.total,
            ratings: snapshot.distribution().into_iter().collect(),
        }
    }
}

/// Print total submissions and the per-rating breakdown.
#[tracing::instrument(skip_all)]
pub async fn run_analytics(api: &dyn FeedbackApi, formatter: &Formatter) -> Result<()> {
    let snapshot = api.analytics().await?;
    let report = AnalyticsReport::from(&snapshot);

    if formatter.output_format() == OutputFormat::Json {
        return formatter.print(&report);
    }

    let mut lines = vec![format!("Total submissions: {}", report.total)];
    lines.extend(report.ratings.iter().rev().map(|(rating, count)| {
        format!(
            "{rating} {:<10} {count:>6}{}",
            rating_label(*rating),
            bar(*count, report.total)
        )
    }));
    write_line(&lines.join("\n"))
}

const BAR_WIDTH: u64 = 30;

fn bar(count: u64, total: u64) -> String {
    if total == 0 || count == 0 {
        return String::new();
    }
    let filled = (count * BAR_WIDTH).div_ceil(total);
    let filled = usize::try_from(filled).unwrap_or(0);
    format!("  {}", "#".repeat(filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_fills_missing_ratings() {
        let snapshot = AnalyticsSnapshot {
            total: 3,
            count_by_rating: BTreeMap::from([("5".to_string(), 2), ("1".to_string(), 1)]),
        };
        let report = AnalyticsReport::from(&snapshot);
        assert_eq!(
            report.ratings.into_iter().collect::<Vec<_>>(),
            vec![(1, 1), (2, 0), (3, 0), (4, 0), (5, 2)]
        );
    }

    #[test]
    fn test_bar_scales_to_total() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(5, 0), "");
        assert_eq!(bar(10, 10).trim().len(), 30);
        assert_eq!(bar(1, 100).trim().len(), 1);
    }
}
