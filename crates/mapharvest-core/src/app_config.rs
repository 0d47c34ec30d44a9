use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Page every session starts from and returns to when recovering.
    pub origin_url: String,
    /// Explicit browser binary; auto-detected when `None`.
    pub chromium_path: Option<PathBuf>,
    pub headless: bool,
    pub shard_count: usize,
    pub max_reviews: usize,
    /// Consecutive keyword failures that trigger a session reset.
    pub failure_streak_threshold: u32,
    pub scroll_passes: u32,
    pub page_down_passes: u32,
    pub fallback_scroll_passes: u32,
    pub search_timeout_secs: u64,
    pub reviews_tab_timeout_secs: u64,
    pub reviews_wait_timeout_secs: u64,
    pub scroll_settle_ms: u64,
    pub keyword_pause_min_ms: u64,
    pub keyword_pause_max_ms: u64,
    pub download_timeout_secs: u64,
    pub download_max_retries: u32,
    /// Write screenshots and page snapshots while harvesting.
    pub diagnostics: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("origin_url", &self.origin_url)
            .field("chromium_path", &self.chromium_path)
            .field("headless", &self.headless)
            .field("shard_count", &self.shard_count)
            .field("max_reviews", &self.max_reviews)
            .field("failure_streak_threshold", &self.failure_streak_threshold)
            .field("scroll_passes", &self.scroll_passes)
            .field("page_down_passes", &self.page_down_passes)
            .field("fallback_scroll_passes", &self.fallback_scroll_passes)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("reviews_tab_timeout_secs", &self.reviews_tab_timeout_secs)
            .field("reviews_wait_timeout_secs", &self.reviews_wait_timeout_secs)
            .field("scroll_settle_ms", &self.scroll_settle_ms)
            .field(
                "keyword_pause_ms",
                &(self.keyword_pause_min_ms..=self.keyword_pause_max_ms),
            )
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("download_max_retries", &self.download_max_retries)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
