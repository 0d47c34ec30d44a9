//! Review harvesting for the currently open place.
//!
//! One harvesting pass walks a fixed sequence of stages:
//!
//! ```text
//! TabNotOpened -> TabOpened -> Sorted (optional) -> Scrolled -> Extracted -> Saved
//! ```
//!
//! Failing to open the reviews tab or finding no review elements ends the
//! pass without a file; neither is an error for the place itself.

mod scroll;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use mapharvest_core::{LocaleConfig, Review};

pub use scroll::ScrollMethod;

use crate::browser::{
    child_attribute, child_text, wait_for_any, ElementHandle, ElementQuery, PageDriver,
};
use crate::diagnostics::{save_page_source, Diagnostics};
use crate::output::{review_file_path, write_reviews_csv};
use crate::sanitize::sanitize_keyword;
use crate::selectors;
use crate::session::SessionController;
use crate::settings::settle;

/// Furthest stage a harvesting pass reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HarvestStage {
    TabNotOpened,
    TabOpened,
    Sorted,
    Scrolled,
    Extracted,
    Saved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarvestReport {
    pub stage: HarvestStage,
    pub sorted: bool,
    pub scroll: Option<ScrollMethod>,
    /// Strategy that located the review elements, if any did.
    pub strategy: Option<ElementQuery>,
    pub reviews_written: usize,
    pub path: Option<PathBuf>,
}

impl HarvestReport {
    fn new() -> Self {
        Self {
            stage: HarvestStage::TabNotOpened,
            sorted: false,
            scroll: None,
            strategy: None,
            reviews_written: 0,
            path: None,
        }
    }
}

/// Harvest reviews for the open place into
/// `<output_dir>/<sanitized-keyword>_reviews.csv`.
///
/// Returns the file path, or `None` when no review was captured.
pub async fn harvest_reviews(
    session: &SessionController,
    keyword: &str,
    output_dir: &Path,
) -> Option<PathBuf> {
    run_harvest(session, keyword, output_dir).await.path
}

/// Same as [`harvest_reviews`] but reports how far the pass got.
pub async fn run_harvest(
    session: &SessionController,
    keyword: &str,
    output_dir: &Path,
) -> HarvestReport {
    let driver = session.driver();
    let locale = session.locale();
    let settings = session.settings();
    let stem = sanitize_keyword(keyword);
    let diagnostics = Diagnostics::new(output_dir, &stem, settings.diagnostics);
    let mut report = HarvestReport::new();

    let Some(tab) = wait_for_any(
        driver,
        &[selectors::reviews_tab(locale)],
        settings.reviews_tab_timeout,
        settings.poll_interval,
    )
    .await
    else {
        tracing::warn!(keyword, "reviews tab not found");
        return report;
    };
    if let Err(e) = driver.click(tab).await {
        tracing::warn!(keyword, error = %e, "could not open reviews tab");
        return report;
    }
    tracing::debug!(keyword, "opened reviews tab");
    settle(settings.tab_settle).await;
    report.stage = HarvestStage::TabOpened;

    if sort_by_newest(session).await {
        report.sorted = true;
        report.stage = HarvestStage::Sorted;
    } else {
        tracing::warn!(keyword, "could not sort reviews by newest");
    }

    if wait_for_any(
        driver,
        &[selectors::review_loaded()],
        settings.reviews_wait_timeout,
        settings.poll_interval,
    )
    .await
    .is_none()
    {
        tracing::debug!(keyword, "reviews slow to load, continuing");
    }
    settle(settings.tab_settle).await;

    diagnostics.snapshot(driver, "page_source_reviews.html").await;
    diagnostics.screenshot(driver, "reviews_tab.png").await;

    let method = scroll::scroll_reviews(session).await;
    report.scroll = Some(method);
    report.stage = HarvestStage::Scrolled;
    diagnostics.screenshot(driver, "after_scrolling.png").await;

    let Some((strategy, elements)) = discover_review_elements(driver).await else {
        tracing::warn!(keyword, "no review elements found with any strategy");
        let path = output_dir.join(format!("{stem}_debug_no_reviews.html"));
        save_page_source(driver, &path).await;
        return report;
    };
    tracing::debug!(keyword, %strategy, count = elements.len(), "found review elements");
    report.strategy = Some(strategy);

    let reviews = collect_reviews(
        driver,
        locale,
        &elements,
        settings.max_reviews,
        settings.expand_settle,
    )
    .await;
    report.stage = HarvestStage::Extracted;
    if reviews.is_empty() {
        tracing::warn!(keyword, "no reviews captured");
        return report;
    }

    let path = review_file_path(output_dir, keyword);
    if let Err(e) = write_reviews_csv(&path, &reviews) {
        tracing::warn!(keyword, path = %path.display(), error = %e, "failed to write reviews");
        return report;
    }
    tracing::info!(keyword, count = reviews.len(), path = %path.display(), "saved reviews");
    report.reviews_written = reviews.len();
    report.path = Some(path);
    report.stage = HarvestStage::Saved;
    report
}

/// Open the sort menu and pick "newest". Returns `false` on any miss.
async fn sort_by_newest(session: &SessionController) -> bool {
    let driver = session.driver();
    let locale = session.locale();
    let settings = session.settings();

    let Some(button) = wait_for_any(
        driver,
        &[selectors::sort_button(locale)],
        settings.sort_timeout,
        settings.poll_interval,
    )
    .await
    else {
        return false;
    };
    if driver.click(button).await.is_err() {
        return false;
    }
    settle(settings.sort_settle).await;

    let Some(option) = wait_for_any(
        driver,
        &[selectors::newest_option(locale)],
        settings.sort_timeout,
        settings.poll_interval,
    )
    .await
    else {
        return false;
    };
    if driver.click(option).await.is_err() {
        return false;
    }
    tracing::debug!(order = locale.newest_text, "sorted reviews");
    settle(settings.tab_settle).await;
    true
}

/// First strategy that yields at least one element, with its elements.
async fn discover_review_elements(
    driver: &dyn PageDriver,
) -> Option<(ElementQuery, Vec<ElementHandle>)> {
    for strategy in selectors::review_elements() {
        match driver.find_all(&strategy).await {
            Ok(found) if !found.is_empty() => return Some((strategy, found)),
            Ok(_) => tracing::debug!(%strategy, "no review elements"),
            Err(e) => tracing::debug!(%strategy, error = %e, "review lookup failed"),
        }
    }
    None
}

/// Read reviews out of `elements` in order.
///
/// Looks at no more than `2 * max_reviews` candidates, stops once
/// `max_reviews` are accepted, and drops any element whose
/// (reviewer, date) pair was already seen in this pass.
pub(crate) async fn collect_reviews(
    driver: &dyn PageDriver,
    locale: &LocaleConfig,
    elements: &[ElementHandle],
    max_reviews: usize,
    expand_settle: std::time::Duration,
) -> Vec<Review> {
    let mut reviews = Vec::new();
    let mut seen = HashSet::new();

    for element in elements.iter().take(max_reviews.saturating_mul(2)) {
        if reviews.len() >= max_reviews {
            break;
        }

        if let Ok(buttons) = driver
            .find_within(*element, &selectors::see_more_button(locale))
            .await
        {
            if let Some(button) = buttons.first() {
                if driver.click(*button).await.is_ok() {
                    settle(expand_settle).await;
                }
            }
        }

        let review = read_review(driver, *element).await;
        if !seen.insert(review.dedup_key()) {
            tracing::debug!(reviewer = %review.reviewer_name, "skipping duplicate review");
            continue;
        }
        reviews.push(review);
    }

    reviews
}

async fn read_review(driver: &dyn PageDriver, element: ElementHandle) -> Review {
    let rating_label =
        child_attribute(driver, element, &selectors::review_rating(), "aria-label").await;
    Review {
        reviewer_name: child_text(driver, element, &selectors::reviewer_name()).await,
        rating: rating_label.as_deref().and_then(Review::parse_rating),
        date: child_text(driver, element, &selectors::review_date()).await,
        text: child_text(driver, element, &selectors::review_text()).await,
    }
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
