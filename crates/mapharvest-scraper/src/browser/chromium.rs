//! Chromium-backed [`PageDriver`] using chromiumoxide.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use mapharvest_core::LocaleConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{ElementHandle, ElementQuery, Key, PageDriver, ScrollProbe};
use crate::dispatch::DriverFactory;
use crate::error::BrowserError;

const SCROLL_MARKER_ATTR: &str = "data-mapharvest-scroll";

/// Find a Chromium or Chrome binary on this machine.
#[must_use]
pub fn find_chromium() -> Option<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        let candidates = [
            home.join(".cache/mapharvest/chromium/chrome-linux64/chrome"),
            home.join(".cache/mapharvest/chromium/chrome"),
        ];
        if let Some(found) = candidates.into_iter().find(|c| c.exists()) {
            return Some(found);
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches one Chromium process per call to [`DriverFactory::launch`].
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    chromium_path: Option<PathBuf>,
    headless: bool,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(chromium_path: Option<PathBuf>, headless: bool) -> Self {
        Self {
            chromium_path,
            headless,
        }
    }
}

#[async_trait]
impl DriverFactory for ChromiumLauncher {
    async fn launch(
        &self,
        locale: &'static LocaleConfig,
    ) -> Result<Box<dyn PageDriver>, BrowserError> {
        let executable = self
            .chromium_path
            .clone()
            .or_else(find_chromium)
            .ok_or_else(|| {
                BrowserError::Launch(
                    "Chromium not found; set MAPHARVEST_CHROMIUM_PATH".to_string(),
                )
            })?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .window_size(1280, 1024)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--log-level=3")
            .arg(locale.browser_lang_arg);
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "chromium handler event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(BrowserError::Launch(format!("failed to open page: {e}")));
            }
        };

        tracing::info!(language = %locale.language, headless = self.headless, "browser launched");

        Ok(Box::new(ChromiumDriver {
            page,
            browser: Mutex::new(Some(browser)),
            elements: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            handler_task,
        }))
    }
}

/// One Chromium tab. Element handles are registry keys; the registry is
/// cleared on every navigation and whenever the caller releases elements.
pub struct ChromiumDriver {
    page: Page,
    browser: Mutex<Option<Browser>>,
    elements: Mutex<HashMap<u64, Arc<Element>>>,
    next_id: AtomicU64,
    handler_task: JoinHandle<()>,
}

impl ChromiumDriver {
    async fn register(&self, found: Vec<Element>) -> Vec<ElementHandle> {
        let mut elements = self.elements.lock().await;
        found
            .into_iter()
            .map(|element| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                elements.insert(id, Arc::new(element));
                ElementHandle::new(id)
            })
            .collect()
    }

    async fn resolve(&self, handle: ElementHandle) -> Result<Arc<Element>, BrowserError> {
        self.elements
            .lock()
            .await
            .get(&handle.id())
            .cloned()
            .ok_or(BrowserError::StaleElement(handle.id()))
    }

    async fn call_on(
        &self,
        handle: ElementHandle,
        function_declaration: &str,
    ) -> Result<(), BrowserError> {
        let element = self.resolve(handle).await?;
        element
            .call_js_fn(function_declaration, false)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(())
    }
}

fn query_error(query: &ElementQuery, e: &impl std::fmt::Display) -> BrowserError {
    BrowserError::Query {
        query: query.to_string(),
        reason: e.to_string(),
    }
}

/// Build the DOM probe that tags the best scroll container with
/// [`SCROLL_MARKER_ATTR`]. Evaluates to `true` when one was tagged.
fn scroll_probe_script(probe: &ScrollProbe) -> String {
    let selectors =
        serde_json::to_string(&probe.content_selectors).unwrap_or_else(|_| "[]".to_string());
    let marker = serde_json::to_string(&probe.text_marker).unwrap_or_else(|_| "null".to_string());
    format!(
        r"(() => {{
  const selectors = {selectors};
  const marker = {marker};
  const minHeight = {min_height};
  document.querySelectorAll('[{attr}]').forEach(e => e.removeAttribute('{attr}'));
  let best = null;
  for (const div of document.querySelectorAll('div')) {{
    if (div.scrollHeight <= div.clientHeight || div.clientHeight <= minHeight) continue;
    const hasContent = selectors.some(s => div.querySelector(s) !== null)
      || (marker !== null && div.innerText.includes(marker));
    if (!hasContent) continue;
    if (best === null || div.scrollHeight > best.scrollHeight) best = div;
  }}
  if (best === null) return false;
  best.setAttribute('{attr}', '1');
  return true;
}})()",
        min_height = probe.min_visible_height,
        attr = SCROLL_MARKER_ATTR,
    )
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        self.elements.lock().await.clear();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    async fn find_all(&self, query: &ElementQuery) -> Result<Vec<ElementHandle>, BrowserError> {
        let found = match query {
            ElementQuery::Css(selector) => self.page.find_elements(selector.as_str()).await,
            ElementQuery::XPath(expression) => self.page.find_xpaths(expression.as_str()).await,
        };
        match found {
            Ok(elements) => Ok(self.register(elements).await),
            Err(e) => Err(query_error(query, &e)),
        }
    }

    async fn find_within(
        &self,
        parent: ElementHandle,
        query: &ElementQuery,
    ) -> Result<Vec<ElementHandle>, BrowserError> {
        let ElementQuery::Css(selector) = query else {
            return Err(BrowserError::Unsupported("XPath lookup scoped to an element"));
        };
        let element = self.resolve(parent).await?;
        let found = element
            .find_elements(selector.as_str())
            .await
            .map_err(|e| query_error(query, &e))?;
        Ok(self.register(found).await)
    }

    async fn text(&self, element: ElementHandle) -> Result<String, BrowserError> {
        let element = self.resolve(element).await?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let element = self.resolve(element).await?;
        element
            .attribute(name)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn click(&self, element: ElementHandle) -> Result<(), BrowserError> {
        let element = self.resolve(element).await?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        Ok(())
    }

    async fn clear(&self, element: ElementHandle) -> Result<(), BrowserError> {
        self.call_on(
            element,
            "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
        )
        .await
    }

    async fn type_text(&self, element: ElementHandle, text: &str) -> Result<(), BrowserError> {
        let element = self.resolve(element).await?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        Ok(())
    }

    async fn press_key(&self, element: ElementHandle, key: Key) -> Result<(), BrowserError> {
        let element = self.resolve(element).await?;
        element
            .press_key(key.name())
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        Ok(())
    }

    async fn find_scrollable_container(
        &self,
        probe: &ScrollProbe,
    ) -> Result<Option<ElementHandle>, BrowserError> {
        let tagged: bool = self
            .page
            .evaluate(scroll_probe_script(probe))
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Script(format!("{e:?}")))?;
        if !tagged {
            return Ok(None);
        }
        let query = ElementQuery::css(format!("[{SCROLL_MARKER_ATTR}]"));
        Ok(self.find_all(&query).await?.into_iter().next())
    }

    async fn scroll_to_end(&self, element: ElementHandle) -> Result<(), BrowserError> {
        self.call_on(element, "function() { this.scrollTop = this.scrollHeight; }")
            .await
    }

    async fn page_source(&self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let png = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| BrowserError::Script(format!("screenshot failed: {e}")))?;
        tokio::fs::write(path, png).await?;
        Ok(())
    }

    async fn release_elements(&self) {
        let mut elements = self.elements.lock().await;
        tracing::debug!(count = elements.len(), "releasing element handles");
        elements.clear();
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.elements.lock().await.clear();
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };
        let closed = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Interaction(format!("failed to close browser: {e}")));
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "browser process did not exit cleanly");
        }
        self.handler_task.abort();
        closed
    }
}
