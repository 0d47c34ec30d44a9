//! Shared configuration and domain types for mapharvest.
//!
//! Everything here is free of browser and network concerns so that the
//! scraper, the review summarizer and the CLI can agree on one vocabulary.

mod app_config;
mod config;
pub mod locale;
pub mod place;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use locale::{Language, LocaleConfig, LocaleError};
pub use place::{Place, Review};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
