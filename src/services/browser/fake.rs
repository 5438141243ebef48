//! Scripted in-memory browser used by extractor and dispatcher tests.
//!
//! A fake site is a list of pages. Each page has fixed HTML, the elements it
//! exposes (with how many matches each locator has), and which clicks lead to
//! which page. Scrolling can also advance to another page to model lazy
//! loading.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

use super::{BrowserSession, ElementLocator};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakePage {
    pub html: String,
    pub elements: HashMap<ElementLocator, usize>,
    pub clicks: HashMap<ElementLocator, usize>,
    pub on_scroll: Option<usize>,
}

impl FakePage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    pub fn with_element(mut self, locator: ElementLocator, matches: usize) -> Self {
        self.elements.insert(locator, matches);
        self
    }

    /// Clicking `locator` navigates to page `target`
    pub fn with_click(mut self, locator: ElementLocator, target: usize) -> Self {
        self.elements.entry(locator).or_insert(1);
        self.clicks.insert(locator, target);
        self
    }

    pub fn with_scroll_to(mut self, target: usize) -> Self {
        self.on_scroll = Some(target);
        self
    }

    fn has(&self, locator: ElementLocator) -> bool {
        self.elements.get(&locator).copied().unwrap_or(0) > 0
    }
}

/// Everything the session was asked to do, shared with the test after the
/// session itself has been moved away.
#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub visited: Vec<String>,
    pub typed: Vec<String>,
    pub clicked: Vec<ElementLocator>,
    pub scrolls: u32,
    pub sources_read: u32,
    pub closed: bool,
}

pub(crate) struct FakeSession {
    pages: Vec<FakePage>,
    current: usize,
    log: Arc<Mutex<FakeLog>>,
}

impl FakeSession {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            current: 0,
            log: Arc::new(Mutex::new(FakeLog::default())),
        }
    }

    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        self.log.clone()
    }

    fn page(&self) -> &FakePage {
        &self.pages[self.current]
    }

    fn require(&self, locator: ElementLocator) -> AppResult<()> {
        if self.page().has(locator) {
            Ok(())
        } else {
            Err(AppError::PageStructureMismatch(format!(
                "element not found: {}",
                locator
            )))
        }
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&mut self, url: &str) -> AppResult<()> {
        self.current = 0;
        self.log.lock().unwrap().visited.push(url.to_string());
        Ok(())
    }

    async fn send_keys(&mut self, locator: ElementLocator, text: &str) -> AppResult<()> {
        self.require(locator)?;
        self.log.lock().unwrap().typed.push(text.to_string());
        Ok(())
    }

    async fn click(&mut self, locator: ElementLocator) -> AppResult<()> {
        self.require(locator)?;
        self.log.lock().unwrap().clicked.push(locator);
        let target = self.page().clicks.get(&locator).copied();
        if let Some(target) = target {
            self.current = target;
        }
        Ok(())
    }

    async fn count(&mut self, locator: ElementLocator) -> AppResult<usize> {
        Ok(self.page().elements.get(&locator).copied().unwrap_or(0))
    }

    async fn scroll_by(&mut self, _pixels: i64) -> AppResult<()> {
        self.log.lock().unwrap().scrolls += 1;
        let target = self.page().on_scroll;
        if let Some(target) = target {
            self.current = target;
        }
        Ok(())
    }

    async fn wait_interactable(
        &mut self,
        locator: ElementLocator,
        _timeout: Duration,
    ) -> AppResult<()> {
        if self.page().has(locator) {
            Ok(())
        } else {
            Err(AppError::ElementWaitTimeout(locator.to_string()))
        }
    }

    async fn page_source(&mut self) -> AppResult<String> {
        self.log.lock().unwrap().sources_read += 1;
        Ok(self.page().html.clone())
    }

    async fn close(self: Box<Self>) -> AppResult<()> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}
