pub mod browser;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod photo;
pub mod place;
mod rate_limit;
pub mod reviews;
pub mod sanitize;
pub mod selectors;
pub mod session;
pub mod settings;

pub use browser::chromium::{find_chromium, ChromiumLauncher};
pub use browser::{ElementHandle, ElementQuery, Key, PageDriver, ScrollProbe};
pub use dispatch::{
    split_into_shards, Dispatcher, DriverFactory, KeywordOutcome, KeywordStatus, StatusCallback,
};
pub use error::{
    BrowserError, DownloadError, ExtractionFailure, FieldNotFound, PlaceField, ScrapeError,
};
pub use output::{review_file_path, write_places_csv, write_reviews_csv, PLACES_FILE_NAME};
pub use photo::{is_placeholder, PhotoDownloader};
pub use place::{extract_place, ScrapeContext};
pub use reviews::{harvest_reviews, run_harvest, HarvestReport, HarvestStage, ScrollMethod};
pub use sanitize::sanitize_keyword;
pub use session::SessionController;
pub use settings::ScraperSettings;
