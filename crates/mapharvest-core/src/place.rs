//! Records produced by a scrape.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One row per search keyword that produced a listing.
///
/// Only `keyword` is guaranteed. Every other field independently stays empty
/// when its lookup fails; a partial record is still a valid result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub keyword: String,
    pub name: String,
    pub category: String,
    pub address: String,
    pub phone: String,
    pub web: String,
    pub pluscode: String,
    /// Weekly opening hours, one day per line.
    pub hours: String,
    pub stars: String,
    pub reviews: String,
    /// Review file written for this place, if any review was captured.
    #[serde(default)]
    pub review_source_path: Option<PathBuf>,
}

impl Place {
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }
}

/// A single customer review captured during one harvesting pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer_name: String,
    /// `None` when the star label could not be read as a number.
    pub rating: Option<f32>,
    /// Site-rendered relative date (e.g. "2 weeks ago"); not normalized.
    pub date: String,
    pub text: String,
}

impl Review {
    /// Identity used to drop repeated captures of the same review.
    ///
    /// Two distinct reviews by the same reviewer with the same date text
    /// collapse into one.
    #[must_use]
    pub fn dedup_key(&self) -> (String, String) {
        (self.reviewer_name.clone(), self.date.clone())
    }

    /// Parse the leading whitespace-delimited token of a star label such as
    /// `"4 stars"` or `"4,5 estrellas"`.
    #[must_use]
    pub fn parse_rating(label: &str) -> Option<f32> {
        let token = label.split_whitespace().next()?;
        token.replace(',', ".").parse::<f32>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_place_only_sets_keyword() {
        let place = Place::new("bakery madrid");
        assert_eq!(place.keyword, "bakery madrid");
        assert!(place.name.is_empty());
        assert!(place.review_source_path.is_none());
    }

    #[test]
    fn parse_rating_reads_leading_token() {
        assert_eq!(Review::parse_rating("5 stars"), Some(5.0));
        assert_eq!(Review::parse_rating("  4 stars "), Some(4.0));
    }

    #[test]
    fn parse_rating_accepts_decimal_comma() {
        assert_eq!(Review::parse_rating("4,5 estrellas"), Some(4.5));
    }

    #[test]
    fn parse_rating_rejects_non_numeric() {
        assert_eq!(Review::parse_rating("Five stars"), None);
        assert_eq!(Review::parse_rating(""), None);
    }

    #[test]
    fn dedup_key_ignores_text_and_rating() {
        let a = Review {
            reviewer_name: "Ana".into(),
            rating: Some(5.0),
            date: "a week ago".into(),
            text: "Great".into(),
        };
        let b = Review {
            rating: Some(1.0),
            text: "Awful".into(),
            ..a.clone()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn place_serializes_with_optional_review_path() {
        let json = serde_json::to_value(Place::new("k")).unwrap();
        assert_eq!(json["keyword"], "k");
        assert!(json["review_source_path"].is_null());
    }
}
