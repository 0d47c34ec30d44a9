//! Page automation abstraction.
//!
//! Defines the [`PageDriver`] trait the session, extractor and harvester are
//! written against, plus the small lookup helpers they share. The production
//! implementation drives Chromium over CDP (see [`chromium`]); tests drive a
//! scripted in-memory page.

pub mod chromium;
#[cfg(test)]
pub(crate) mod fake;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserError;

/// One structural lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementQuery {
    Css(String),
    XPath(String),
}

impl ElementQuery {
    pub fn css(selector: impl Into<String>) -> Self {
        ElementQuery::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        ElementQuery::XPath(expression.into())
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementQuery::Css(s) => write!(f, "css:{s}"),
            ElementQuery::XPath(s) => write!(f, "xpath:{s}"),
        }
    }
}

/// Opaque reference to an element found by a [`PageDriver`]. Only meaningful
/// to the driver that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    PageDown,
}

impl Key {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Key::Enter => "Enter",
            Key::Escape => "Escape",
            Key::PageDown => "PageDown",
        }
    }
}

/// Criteria for the scrollable-container probe.
///
/// A candidate must scroll (content taller than its box), be taller than
/// `min_visible_height`, and contain either an element matching one of
/// `content_selectors` or the `text_marker` substring. The tallest match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollProbe {
    pub min_visible_height: u32,
    pub content_selectors: Vec<String>,
    pub text_marker: Option<String>,
}

/// A single browsing context.
///
/// Methods take `&self`; implementations keep whatever interior state they
/// need so a session can be shared by reference across one keyword's steps.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    async fn title(&self) -> Result<String, BrowserError>;

    async fn find_all(&self, query: &ElementQuery) -> Result<Vec<ElementHandle>, BrowserError>;

    async fn find_within(
        &self,
        parent: ElementHandle,
        query: &ElementQuery,
    ) -> Result<Vec<ElementHandle>, BrowserError>;

    /// Rendered text of the element; empty string when it has none.
    async fn text(&self, element: ElementHandle) -> Result<String, BrowserError>;

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    async fn click(&self, element: ElementHandle) -> Result<(), BrowserError>;

    async fn clear(&self, element: ElementHandle) -> Result<(), BrowserError>;

    async fn type_text(&self, element: ElementHandle, text: &str) -> Result<(), BrowserError>;

    async fn press_key(&self, element: ElementHandle, key: Key) -> Result<(), BrowserError>;

    /// DOM probe: locate the element that actually scrolls a lazily loaded
    /// list. `Ok(None)` when nothing qualifies.
    async fn find_scrollable_container(
        &self,
        probe: &ScrollProbe,
    ) -> Result<Option<ElementHandle>, BrowserError>;

    /// Drive the element's scroll position to its current maximum.
    async fn scroll_to_end(&self, element: ElementHandle) -> Result<(), BrowserError>;

    async fn page_source(&self) -> Result<String, BrowserError>;

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError>;

    /// Forget every handle handed out so far. Handles obtained before the
    /// call resolve to [`BrowserError::StaleElement`] afterwards.
    async fn release_elements(&self);

    /// Release the context and the browser behind it.
    async fn close(&self) -> Result<(), BrowserError>;
}

/// First element matched by the first strategy that yields anything.
/// Lookup errors count as "no match" for that strategy.
pub async fn find_first(
    driver: &dyn PageDriver,
    strategies: &[ElementQuery],
) -> Option<ElementHandle> {
    for query in strategies {
        match driver.find_all(query).await {
            Ok(found) => {
                if let Some(first) = found.first() {
                    return Some(*first);
                }
            }
            Err(e) => tracing::debug!(%query, error = %e, "lookup failed"),
        }
    }
    None
}

/// Poll until one of `strategies` matches or `timeout` elapses. Always
/// checks at least once, so a zero timeout is a single lookup.
pub async fn wait_for_any(
    driver: &dyn PageDriver,
    strategies: &[ElementQuery],
    timeout: Duration,
    poll_interval: Duration,
) -> Option<ElementHandle> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(found) = find_first(driver, strategies).await {
            return Some(found);
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(poll_interval.max(Duration::from_millis(1))).await;
    }
}

/// Text of the first child matching `query`, trimmed. Empty on any failure.
pub async fn child_text(
    driver: &dyn PageDriver,
    parent: ElementHandle,
    query: &ElementQuery,
) -> String {
    let Ok(children) = driver.find_within(parent, query).await else {
        return String::new();
    };
    let Some(child) = children.first() else {
        return String::new();
    };
    driver
        .text(*child)
        .await
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

/// Attribute of the first child matching `query`. `None` on any failure.
pub async fn child_attribute(
    driver: &dyn PageDriver,
    parent: ElementHandle,
    query: &ElementQuery,
    name: &str,
) -> Option<String> {
    let children = driver.find_within(parent, query).await.ok()?;
    let child = children.first()?;
    driver.attribute(*child, name).await.ok().flatten()
}
