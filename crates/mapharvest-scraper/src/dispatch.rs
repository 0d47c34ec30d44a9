//! Parallel keyword dispatch.
//!
//! Keywords are split into contiguous shards. Each shard runs on its own
//! task with its own browser session, processing its keywords in input
//! order. Results are concatenated in shard order, so the output follows the
//! input order no matter which shard finishes first.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use mapharvest_core::{LocaleConfig, Place};

use crate::browser::PageDriver;
use crate::error::{BrowserError, ScrapeError};
use crate::place::{extract_place, ScrapeContext};
use crate::session::SessionController;
use crate::settings::{settle, ScraperSettings};

/// Creates one browsing context per shard.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn launch(
        &self,
        locale: &'static LocaleConfig,
    ) -> Result<Box<dyn PageDriver>, BrowserError>;
}

/// Split `items` into `shard_count` contiguous, near-equal shards. The
/// first `len % shard_count` shards get one extra item. A count of zero is
/// treated as one.
#[must_use]
pub fn split_into_shards<T: Clone>(items: &[T], shard_count: usize) -> Vec<Vec<T>> {
    let shard_count = shard_count.max(1);
    let base = items.len() / shard_count;
    let remainder = items.len() % shard_count;

    let mut shards = Vec::with_capacity(shard_count);
    let mut start = 0;
    for index in 0..shard_count {
        let len = base + usize::from(index < remainder);
        shards.push(items[start..start + len].to_vec());
        start += len;
    }
    shards
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordOutcome {
    Ok,
    Error,
}

impl fmt::Display for KeywordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordOutcome::Ok => f.write_str("OK"),
            KeywordOutcome::Error => f.write_str("ERROR"),
        }
    }
}

/// Progress for one keyword, reported as soon as it finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordStatus {
    /// Zero-based shard index.
    pub shard: usize,
    /// One-based position within the shard.
    pub position: usize,
    pub total: usize,
    pub keyword: String,
    pub outcome: KeywordOutcome,
}

impl fmt::Display for KeywordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shard #{}  {}/{} - {} - {}",
            self.shard, self.position, self.total, self.outcome, self.keyword
        )
    }
}

pub type StatusCallback = Arc<dyn Fn(&KeywordStatus) + Send + Sync>;

/// Runs one session per shard and merges the places they produce.
pub struct Dispatcher {
    factory: Arc<dyn DriverFactory>,
    locale: &'static LocaleConfig,
    settings: Arc<ScraperSettings>,
    context: Arc<ScrapeContext>,
    on_status: Option<StatusCallback>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("language", &self.locale.language)
            .field("output_dir", &self.context.output_dir)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Resolve the locale before anything else, so an unsupported language
    /// fails without launching a browser.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Locale`] for a language other than ES or EN.
    pub fn new(
        language_code: &str,
        factory: Arc<dyn DriverFactory>,
        settings: Arc<ScraperSettings>,
        context: ScrapeContext,
    ) -> Result<Self, ScrapeError> {
        let locale = LocaleConfig::resolve(language_code)?;
        Ok(Self {
            factory,
            locale,
            settings,
            context: Arc::new(context),
            on_status: None,
        })
    }

    #[must_use]
    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.on_status = Some(callback);
        self
    }

    #[must_use]
    pub fn locale(&self) -> &'static LocaleConfig {
        self.locale
    }

    /// Process every keyword and return the places found, in input order.
    /// Keywords that fail extraction produce no place.
    pub async fn dispatch(&self, keywords: &[String], shard_count: usize) -> Vec<Place> {
        let shards = split_into_shards(keywords, shard_count);
        tracing::info!(
            keywords = keywords.len(),
            shards = shards.len(),
            language = %self.locale.language,
            "dispatching keywords"
        );

        let handles: Vec<_> = shards
            .into_iter()
            .enumerate()
            .map(|(index, shard)| {
                let worker = ShardWorker {
                    index,
                    factory: Arc::clone(&self.factory),
                    locale: self.locale,
                    settings: Arc::clone(&self.settings),
                    context: Arc::clone(&self.context),
                    on_status: self.on_status.clone(),
                };
                tokio::spawn(worker.run(shard))
            })
            .collect();

        let mut places = Vec::new();
        for (index, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok(shard_places) => places.extend(shard_places),
                Err(e) => tracing::error!(shard = index, error = %e, "shard task failed"),
            }
        }
        tracing::info!(places = places.len(), "dispatch complete");
        places
    }
}

struct ShardWorker {
    index: usize,
    factory: Arc<dyn DriverFactory>,
    locale: &'static LocaleConfig,
    settings: Arc<ScraperSettings>,
    context: Arc<ScrapeContext>,
    on_status: Option<StatusCallback>,
}

impl ShardWorker {
    fn report(&self, position: usize, total: usize, keyword: &str, outcome: KeywordOutcome) {
        if let Some(callback) = &self.on_status {
            callback(&KeywordStatus {
                shard: self.index,
                position,
                total,
                keyword: keyword.to_string(),
                outcome,
            });
        }
    }

    async fn run(self, keywords: Vec<String>) -> Vec<Place> {
        if keywords.is_empty() {
            return Vec::new();
        }
        let total = keywords.len();

        let mut session = match SessionController::start(
            self.factory.as_ref(),
            self.locale,
            Arc::clone(&self.settings),
        )
        .await
        {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(shard = self.index, error = %e, "failed to start browser session");
                for (i, keyword) in keywords.iter().enumerate() {
                    self.report(i + 1, total, keyword, KeywordOutcome::Error);
                }
                return Vec::new();
            }
        };
        tracing::info!(shard = self.index, keywords = total, "shard started");

        let mut places = Vec::with_capacity(total);
        for (i, keyword) in keywords.iter().enumerate() {
            session.recover_if_degraded().await;
            settle(keyword_pause(&self.settings)).await;
            session.dismiss_dialogs().await;

            match extract_place(&session, keyword, &self.context).await {
                Ok(place) => {
                    session.record_success();
                    places.push(place);
                    self.report(i + 1, total, keyword, KeywordOutcome::Ok);
                }
                Err(e) => {
                    tracing::error!(shard = self.index, keyword = %keyword, error = %e, "keyword failed");
                    session.record_failure();
                    self.report(i + 1, total, keyword, KeywordOutcome::Error);
                }
            }
        }

        session.stop().await;
        tracing::info!(shard = self.index, places = places.len(), "shard finished");
        places
    }
}

/// Random pause in the configured range, drawn fresh per keyword.
fn keyword_pause(settings: &ScraperSettings) -> Duration {
    let min = settings.keyword_pause_min;
    let max = settings.keyword_pause_max;
    if max <= min {
        return min;
    }
    min + (max - min).mul_f64(rand::random::<f64>())
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
