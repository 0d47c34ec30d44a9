use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("review file not found: {0}")]
    NotFound(String),

    #[error("not a CSV review file: {0}")]
    NotCsv(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("classifier error: {0}")]
    Classifier(String),
}
