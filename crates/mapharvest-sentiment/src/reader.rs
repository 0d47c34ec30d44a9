//! Review file parsing.

use std::path::Path;

use serde::Deserialize;

use crate::error::SentimentError;
use crate::types::ReviewRecord;

#[derive(Debug, Deserialize)]
struct ReviewRow {
    #[serde(default)]
    reviewer_name: String,
    #[serde(default)]
    rating: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    review_text: String,
}

fn parse_rating(raw: &str) -> Option<f32> {
    raw.trim().replace(',', ".").parse::<f32>().ok()
}

/// Read a `reviewer_name,rating,date,review_text` file.
///
/// # Errors
///
/// Returns [`SentimentError::NotFound`] if the file does not exist and
/// [`SentimentError::Csv`] if a row cannot be parsed.
pub fn read_review_file(path: &Path) -> Result<Vec<ReviewRecord>, SentimentError> {
    if !path.is_file() {
        return Err(SentimentError::NotFound(path.display().to_string()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<ReviewRow>().enumerate() {
        let row = row?;
        records.push(ReviewRecord {
            id: index + 1,
            reviewer_name: row.reviewer_name,
            rating: parse_rating(&row.rating),
            date: row.date,
            text: row.review_text,
        });
    }
    tracing::debug!(path = %path.display(), count = records.len(), "read review file");
    Ok(records)
}
