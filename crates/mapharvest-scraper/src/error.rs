use std::fmt;

use thiserror::Error;

/// Failures reported by a [`crate::browser::PageDriver`].
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element lookup failed for {query}: {reason}")]
    Query { query: String, reason: String },

    #[error("stale element handle {0}")]
    StaleElement(u64),

    #[error("element interaction failed: {0}")]
    Interaction(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The only two conditions that abort extraction of a keyword.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("search box not found for \"{keyword}\"")]
    SearchBoxNotFound { keyword: String },

    #[error("no results found for \"{keyword}\"")]
    NoResultsFound { keyword: String },
}

/// Fields of a [`mapharvest_core::Place`] that are looked up independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceField {
    Name,
    Category,
    Address,
    Phone,
    Web,
    PlusCode,
    Hours,
    Stars,
    Reviews,
}

impl fmt::Display for PlaceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaceField::Name => "name",
            PlaceField::Category => "category",
            PlaceField::Address => "address",
            PlaceField::Phone => "phone",
            PlaceField::Web => "web",
            PlaceField::PlusCode => "pluscode",
            PlaceField::Hours => "hours",
            PlaceField::Stars => "stars",
            PlaceField::Reviews => "reviews",
        };
        f.write_str(name)
    }
}

/// A single optional field could not be read. Never fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field} not found: {reason}")]
pub struct FieldNotFound {
    pub field: PlaceField,
    pub reason: String,
}

impl FieldNotFound {
    pub(crate) fn new(field: PlaceField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that stop a whole scrape before any keyword is processed, or that
/// come from writing its output.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Locale(#[from] mapharvest_core::LocaleError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
