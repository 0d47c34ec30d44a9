//! CSV files written by a scrape.

use std::path::{Path, PathBuf};

use mapharvest_core::{Place, Review};

use crate::error::ScrapeError;
use crate::sanitize::sanitize_keyword;

/// File name of the aggregate place export inside the output directory.
pub const PLACES_FILE_NAME: &str = "00_output.csv";

pub const REVIEW_HEADERS: [&str; 4] = ["reviewer_name", "rating", "date", "review_text"];

pub const PLACE_HEADERS: [&str; 10] = [
    "KEYWORD",
    "NAME",
    "CATEGORY",
    "ADDRESS",
    "PHONE",
    "WEB",
    "PLUS CODE",
    "OPEN HOURS",
    "STARS",
    "REVIEWS",
];

/// `<dir>/<sanitized-keyword>_reviews.csv`
#[must_use]
pub fn review_file_path(dir: &Path, keyword: &str) -> PathBuf {
    dir.join(format!("{}_reviews.csv", sanitize_keyword(keyword)))
}

fn format_rating(rating: Option<f32>) -> String {
    rating.map(|r| r.to_string()).unwrap_or_default()
}

/// Write one review file, header first.
///
/// # Errors
///
/// Returns [`csv::Error`] if the file cannot be created or written.
pub fn write_reviews_csv(path: &Path, reviews: &[Review]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(REVIEW_HEADERS)?;
    for review in reviews {
        writer.write_record([
            review.reviewer_name.as_str(),
            format_rating(review.rating).as_str(),
            review.date.as_str(),
            review.text.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the aggregate export in the order given and return its path.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the directory or file cannot be written.
pub fn write_places_csv(dir: &Path, places: &[Place]) -> Result<PathBuf, ScrapeError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(PLACES_FILE_NAME);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(PLACE_HEADERS)?;
    for place in places {
        writer.write_record([
            &place.keyword,
            &place.name,
            &place.category,
            &place.address,
            &place.phone,
            &place.web,
            &place.pluscode,
            &place.hours,
            &place.stars,
            &place.reviews,
        ])?;
    }
    writer.flush()?;
    Ok(path)
}
