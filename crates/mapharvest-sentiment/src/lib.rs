//! Review summarization for scraped review files.
//!
//! Reads a `<keyword>_reviews.csv` file, assigns each review to positive and
//! negative topic buckets through a [`ReviewClassifier`], and writes the
//! summary next to the input as `<stem>_analysis.json`. The bundled
//! [`LexiconClassifier`] works offline from a fixed bilingual word list.

pub mod error;
pub mod pipeline;
pub mod reader;
pub mod scorer;
pub mod types;

pub use error::SentimentError;
pub use pipeline::{analysis_path_for, analyze_review_file, AnalysisOutcome};
pub use reader::read_review_file;
pub use scorer::{lexicon_score, LexiconClassifier, ReviewClassifier};
pub use types::{AnalysisReport, CategoryBucket, ReviewRecord, ReviewSummary};
