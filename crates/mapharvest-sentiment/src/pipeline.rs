//! Review file analysis.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::SentimentError;
use crate::reader::read_review_file;
use crate::scorer::ReviewClassifier;
use crate::types::{AnalysisReport, ReviewSummary};

/// Result of analyzing one review file.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub json_path: PathBuf,
    pub summary: ReviewSummary,
}

/// `<dir>/<stem>_analysis.json` for a review file at `<dir>/<stem>.csv`.
#[must_use]
pub fn analysis_path_for(review_file: &Path) -> PathBuf {
    let stem = review_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    review_file.with_file_name(format!("{stem}_analysis.json"))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Classify every review in `review_file` and write the summary next to it.
///
/// # Errors
///
/// Returns [`SentimentError::NotFound`] or [`SentimentError::NotCsv`] before
/// reading anything, and propagates read, classifier and write failures.
/// The review file itself is never modified.
pub fn analyze_review_file(
    review_file: &Path,
    classifier: &dyn ReviewClassifier,
) -> Result<AnalysisOutcome, SentimentError> {
    if !review_file.is_file() {
        return Err(SentimentError::NotFound(review_file.display().to_string()));
    }
    if !is_csv(review_file) {
        return Err(SentimentError::NotCsv(review_file.display().to_string()));
    }

    let reviews = read_review_file(review_file)?;
    let summary = classifier.classify(&reviews)?;

    let report = AnalysisReport {
        source: review_file.display().to_string(),
        analyzed_at: Utc::now(),
        review_count: reviews.len(),
        summary,
    };
    let json_path = analysis_path_for(review_file);
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&json_path, json).map_err(|source| SentimentError::Io {
        path: json_path.display().to_string(),
        source,
    })?;

    tracing::info!(
        source = %review_file.display(),
        reviews = report.review_count,
        positive = report.summary.total_positive_mentions,
        negative = report.summary.total_negative_mentions,
        "review analysis written"
    );
    Ok(AnalysisOutcome {
        json_path,
        summary: report.summary,
    })
}
