//! Timeouts, pauses and bounds used by the session, extractor and harvester.

use std::time::Duration;

use mapharvest_core::AppConfig;

/// Runtime knobs for one scrape. Built from [`AppConfig`]; the fixed settle
/// pauses mirror how long the target UI needs to react to each interaction.
#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub origin_url: String,
    pub max_reviews: usize,
    pub failure_streak_threshold: u32,
    pub scroll_passes: u32,
    pub page_down_passes: u32,
    pub fallback_scroll_passes: u32,
    pub search_timeout: Duration,
    pub rating_timeout: Duration,
    pub reviews_tab_timeout: Duration,
    pub sort_timeout: Duration,
    pub reviews_wait_timeout: Duration,
    /// Interval between checks while waiting for an element.
    pub poll_interval: Duration,
    pub initial_render: Duration,
    pub recovery_render: Duration,
    pub dialog_settle: Duration,
    pub search_settle: Duration,
    pub result_settle: Duration,
    pub field_settle: Duration,
    pub typing_pause: Duration,
    pub tab_settle: Duration,
    pub sort_settle: Duration,
    pub scroll_settle: Duration,
    pub page_down_settle: Duration,
    pub expand_settle: Duration,
    pub keyword_pause_min: Duration,
    pub keyword_pause_max: Duration,
    pub diagnostics: bool,
}

impl From<&AppConfig> for ScraperSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            origin_url: config.origin_url.clone(),
            max_reviews: config.max_reviews,
            failure_streak_threshold: config.failure_streak_threshold,
            scroll_passes: config.scroll_passes,
            page_down_passes: config.page_down_passes,
            fallback_scroll_passes: config.fallback_scroll_passes,
            search_timeout: Duration::from_secs(config.search_timeout_secs),
            rating_timeout: Duration::from_secs(5),
            reviews_tab_timeout: Duration::from_secs(config.reviews_tab_timeout_secs),
            sort_timeout: Duration::from_secs(5),
            reviews_wait_timeout: Duration::from_secs(config.reviews_wait_timeout_secs),
            poll_interval: Duration::from_millis(250),
            initial_render: Duration::from_secs(5),
            recovery_render: Duration::from_secs(3),
            dialog_settle: Duration::from_millis(500),
            search_settle: Duration::from_secs(5),
            result_settle: Duration::from_secs(3),
            field_settle: Duration::from_secs(1),
            typing_pause: Duration::from_millis(300),
            tab_settle: Duration::from_secs(2),
            sort_settle: Duration::from_secs(1),
            scroll_settle: Duration::from_millis(config.scroll_settle_ms),
            page_down_settle: Duration::from_millis(300),
            expand_settle: Duration::from_millis(300),
            keyword_pause_min: Duration::from_millis(config.keyword_pause_min_ms),
            keyword_pause_max: Duration::from_millis(config.keyword_pause_max_ms),
            diagnostics: config.diagnostics,
        }
    }
}

impl ScraperSettings {
    /// Settings with every wait and pause at zero, for driving scripted pages.
    #[must_use]
    pub fn immediate(origin_url: &str) -> Self {
        Self {
            origin_url: origin_url.to_string(),
            max_reviews: 200,
            failure_streak_threshold: 5,
            scroll_passes: 40,
            page_down_passes: 20,
            fallback_scroll_passes: 10,
            search_timeout: Duration::ZERO,
            rating_timeout: Duration::ZERO,
            reviews_tab_timeout: Duration::ZERO,
            sort_timeout: Duration::ZERO,
            reviews_wait_timeout: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            initial_render: Duration::ZERO,
            recovery_render: Duration::ZERO,
            dialog_settle: Duration::ZERO,
            search_settle: Duration::ZERO,
            result_settle: Duration::ZERO,
            field_settle: Duration::ZERO,
            typing_pause: Duration::ZERO,
            tab_settle: Duration::ZERO,
            sort_settle: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            page_down_settle: Duration::ZERO,
            expand_settle: Duration::ZERO,
            keyword_pause_min: Duration::ZERO,
            keyword_pause_max: Duration::ZERO,
            diagnostics: false,
        }
    }
}

/// Sleep unless the duration is zero.
pub(crate) async fn settle(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
