//! Scripted in-memory page used by unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use mapharvest_core::LocaleConfig;

use super::{ElementHandle, ElementQuery, Key, PageDriver, ScrollProbe};
use crate::dispatch::DriverFactory;
use crate::error::BrowserError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Navigate(String),
    Click(ElementHandle),
    Clear(ElementHandle),
    Type(ElementHandle, String),
    Key(ElementHandle, Key),
    Probe,
    Scroll(ElementHandle),
    PageSource,
    Screenshot(PathBuf),
    Release,
    Close,
}

#[derive(Default)]
struct FakeState {
    next_id: u64,
    url: String,
    title: String,
    source: String,
    texts: HashMap<u64, String>,
    attrs: HashMap<(u64, String), String>,
    page: HashMap<ElementQuery, Vec<ElementHandle>>,
    within: HashMap<(u64, ElementQuery), Vec<ElementHandle>>,
    failing_queries: HashSet<ElementQuery>,
    failing_texts: HashSet<u64>,
    failing_keys: HashSet<u64>,
    reveal_on_click: HashMap<u64, Vec<(ElementQuery, Vec<ElementHandle>)>>,
    echo: Option<(ElementHandle, ElementHandle)>,
    scrollable: Option<ElementHandle>,
    probe_fails: bool,
    typing_delay: Option<TypingDelay>,
    actions: Vec<Action>,
}

type TypingDelay = Arc<dyn Fn(&str) -> Duration + Send + Sync>;

/// Cheap to clone; clones share one page.
#[derive(Clone, Default)]
pub(crate) struct FakePage {
    state: Arc<Mutex<FakeState>>,
}

impl FakePage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake page lock poisoned")
    }

    /// Create a detached element carrying `text`.
    pub(crate) fn element(&self, text: &str) -> ElementHandle {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.texts.insert(id, text.to_string());
        ElementHandle::new(id)
    }

    pub(crate) fn set_attr(&self, element: ElementHandle, name: &str, value: &str) {
        self.state()
            .attrs
            .insert((element.id(), name.to_string()), value.to_string());
    }

    pub(crate) fn set_text(&self, element: ElementHandle, text: &str) {
        self.state().texts.insert(element.id(), text.to_string());
    }

    /// Make `query` resolve to `elements` at page level.
    pub(crate) fn on_page(&self, query: ElementQuery, elements: Vec<ElementHandle>) {
        self.state().page.insert(query, elements);
    }

    /// Make `query` resolve to `elements` when scoped to `parent`.
    pub(crate) fn within(
        &self,
        parent: ElementHandle,
        query: ElementQuery,
        elements: Vec<ElementHandle>,
    ) {
        self.state().within.insert((parent.id(), query), elements);
    }

    pub(crate) fn fail_query(&self, query: ElementQuery) {
        self.state().failing_queries.insert(query);
    }

    pub(crate) fn fail_text(&self, element: ElementHandle) {
        self.state().failing_texts.insert(element.id());
    }

    /// Key presses on `element` are recorded and then fail.
    pub(crate) fn fail_keys(&self, element: ElementHandle) {
        self.state().failing_keys.insert(element.id());
    }

    /// Clicking `element` makes `query` resolve to `elements` afterwards.
    pub(crate) fn on_click(
        &self,
        element: ElementHandle,
        query: ElementQuery,
        elements: Vec<ElementHandle>,
    ) {
        self.state()
            .reveal_on_click
            .entry(element.id())
            .or_default()
            .push((query, elements));
    }

    /// Text typed into `input` becomes the text of `target`.
    pub(crate) fn echo_typing(&self, input: ElementHandle, target: ElementHandle) {
        self.state().echo = Some((input, target));
    }

    /// Typing `text` takes `delay(text)` before returning.
    pub(crate) fn delay_typing(&self, delay: impl Fn(&str) -> Duration + Send + Sync + 'static) {
        self.state().typing_delay = Some(Arc::new(delay));
    }

    pub(crate) fn set_scrollable(&self, element: ElementHandle) {
        self.state().scrollable = Some(element);
    }

    pub(crate) fn fail_probe(&self) {
        self.state().probe_fails = true;
    }

    pub(crate) fn set_source(&self, html: &str) {
        self.state().source = html.to_string();
    }

    pub(crate) fn actions(&self) -> Vec<Action> {
        self.state().actions.clone()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Action) -> bool) -> usize {
        self.state().actions.iter().filter(|a| predicate(a)).count()
    }

    fn record(&self, action: Action) {
        self.state().actions.push(action);
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state();
        state.url = url.to_string();
        state.actions.push(Action::Navigate(url.to_string()));
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.state().url.clone())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(self.state().title.clone())
    }

    async fn find_all(&self, query: &ElementQuery) -> Result<Vec<ElementHandle>, BrowserError> {
        let state = self.state();
        if state.failing_queries.contains(query) {
            return Err(BrowserError::Query {
                query: query.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(state.page.get(query).cloned().unwrap_or_default())
    }

    async fn find_within(
        &self,
        parent: ElementHandle,
        query: &ElementQuery,
    ) -> Result<Vec<ElementHandle>, BrowserError> {
        let state = self.state();
        if state.failing_queries.contains(query) {
            return Err(BrowserError::Query {
                query: query.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(state
            .within
            .get(&(parent.id(), query.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn text(&self, element: ElementHandle) -> Result<String, BrowserError> {
        let state = self.state();
        if state.failing_texts.contains(&element.id()) {
            return Err(BrowserError::StaleElement(element.id()));
        }
        state
            .texts
            .get(&element.id())
            .cloned()
            .ok_or(BrowserError::StaleElement(element.id()))
    }

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        Ok(self
            .state()
            .attrs
            .get(&(element.id(), name.to_string()))
            .cloned())
    }

    async fn click(&self, element: ElementHandle) -> Result<(), BrowserError> {
        let mut state = self.state();
        state.actions.push(Action::Click(element));
        if let Some(reveals) = state.reveal_on_click.get(&element.id()).cloned() {
            for (query, elements) in reveals {
                state.page.insert(query, elements);
            }
        }
        Ok(())
    }

    async fn clear(&self, element: ElementHandle) -> Result<(), BrowserError> {
        self.record(Action::Clear(element));
        Ok(())
    }

    async fn type_text(&self, element: ElementHandle, text: &str) -> Result<(), BrowserError> {
        let delay = {
            let mut state = self.state();
            state.actions.push(Action::Type(element, text.to_string()));
            if let Some((input, target)) = state.echo {
                if input == element {
                    state.texts.insert(target.id(), text.to_string());
                }
            }
            state.typing_delay.as_ref().map(|delay| delay(text))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn press_key(&self, element: ElementHandle, key: Key) -> Result<(), BrowserError> {
        let mut state = self.state();
        state.actions.push(Action::Key(element, key));
        if state.failing_keys.contains(&element.id()) {
            return Err(BrowserError::Interaction("scripted key failure".to_string()));
        }
        Ok(())
    }

    async fn find_scrollable_container(
        &self,
        _probe: &ScrollProbe,
    ) -> Result<Option<ElementHandle>, BrowserError> {
        let mut state = self.state();
        state.actions.push(Action::Probe);
        if state.probe_fails {
            return Err(BrowserError::Script("scripted probe failure".to_string()));
        }
        Ok(state.scrollable)
    }

    async fn scroll_to_end(&self, element: ElementHandle) -> Result<(), BrowserError> {
        self.record(Action::Scroll(element));
        Ok(())
    }

    async fn page_source(&self) -> Result<String, BrowserError> {
        let mut state = self.state();
        state.actions.push(Action::PageSource);
        Ok(state.source.clone())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        self.record(Action::Screenshot(path.to_path_buf()));
        Ok(())
    }

    async fn release_elements(&self) {
        self.record(Action::Release);
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.record(Action::Close);
        Ok(())
    }
}

type PageSetup = Box<dyn Fn(&FakePage) + Send + Sync>;

/// Hands out a fresh [`FakePage`] per launch, scripted by `setup`.
pub(crate) struct FakeFactory {
    setup: PageSetup,
    launched: Mutex<Vec<FakePage>>,
    fail_launch: bool,
}

impl FakeFactory {
    pub(crate) fn new(setup: impl Fn(&FakePage) + Send + Sync + 'static) -> Self {
        Self {
            setup: Box::new(setup),
            launched: Mutex::new(Vec::new()),
            fail_launch: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(|_| {})
        }
    }

    pub(crate) fn launches(&self) -> usize {
        self.launched.lock().expect("fake factory lock poisoned").len()
    }

    pub(crate) fn pages(&self) -> Vec<FakePage> {
        self.launched
            .lock()
            .expect("fake factory lock poisoned")
            .clone()
    }
}

#[async_trait]
impl DriverFactory for FakeFactory {
    async fn launch(
        &self,
        _locale: &'static LocaleConfig,
    ) -> Result<Box<dyn PageDriver>, BrowserError> {
        let page = FakePage::new();
        (self.setup)(&page);
        self.launched
            .lock()
            .expect("fake factory lock poisoned")
            .push(page.clone());
        if self.fail_launch {
            return Err(BrowserError::Launch("scripted launch failure".to_string()));
        }
        Ok(Box::new(page))
    }
}
