use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a review file, numbered from 1 in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: usize,
    pub reviewer_name: String,
    pub rating: Option<f32>,
    pub date: String,
    pub text: String,
}

/// Reviews that mention one topic with one polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub label: String,
    /// Number of reviews in the bucket; equals `review_ids.len()`.
    pub count: usize,
    pub review_ids: Vec<usize>,
}

/// Output of a [`crate::ReviewClassifier`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewSummary {
    /// Sorted by count, largest first.
    pub positive_categories: Vec<CategoryBucket>,
    pub negative_categories: Vec<CategoryBucket>,
    pub total_positive_mentions: usize,
    pub total_negative_mentions: usize,
    pub reviews_by_id: BTreeMap<usize, ReviewRecord>,
}

/// File written next to an analyzed review file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source: String,
    pub analyzed_at: DateTime<Utc>,
    pub review_count: usize,
    pub summary: ReviewSummary,
}
