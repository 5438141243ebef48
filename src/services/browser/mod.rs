/// Browser automation abstraction
///
/// Site extractors never talk to a WebDriver client directly. They drive a
/// [`BrowserSession`], which exposes the handful of page primitives the
/// extraction sequences need (navigate, type, click, count, scroll, wait,
/// read source). Sessions are handed out by a [`SessionProvider`], one per
/// request, and closed by the caller once extraction is over.
use std::{fmt::Display, time::Duration};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

pub mod webdriver;

#[cfg(test)]
pub(crate) mod fake;

pub use webdriver::{WebDriverSession, WebDriverSessionProvider};

/// How to find an element on the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementLocator {
    Css(&'static str),
    Id(&'static str),
    XPath(&'static str),
    LinkText(&'static str),
}

impl Display for ElementLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementLocator::Css(s) => write!(f, "css={}", s),
            ElementLocator::Id(s) => write!(f, "id={}", s),
            ElementLocator::XPath(s) => write!(f, "xpath={}", s),
            ElementLocator::LinkText(s) => write!(f, "link={}", s),
        }
    }
}

/// Whether an expired wait aborts the extraction or lets it continue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Log the timeout and carry on with whatever the page has
    BestEffort,
    /// Treat the timeout as the page not having the expected structure
    Required,
}

/// One isolated, controllable browser instance
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to `url` and wait for the document to load
    async fn goto(&mut self, url: &str) -> AppResult<()>;

    /// Type `text` into the element. Fails with `PageStructureMismatch` if it is absent.
    async fn send_keys(&mut self, locator: ElementLocator, text: &str) -> AppResult<()>;

    /// Activate the element. Fails with `PageStructureMismatch` if it is absent.
    async fn click(&mut self, locator: ElementLocator) -> AppResult<()>;

    /// Number of elements currently matching `locator`
    async fn count(&mut self, locator: ElementLocator) -> AppResult<usize>;

    /// Scroll the window vertically to trigger lazy loading
    async fn scroll_by(&mut self, pixels: i64) -> AppResult<()>;

    /// Wait until the element is displayed and enabled.
    /// Fails with `ElementWaitTimeout` once `timeout` has elapsed.
    async fn wait_interactable(
        &mut self,
        locator: ElementLocator,
        timeout: Duration,
    ) -> AppResult<()>;

    /// Serialized DOM of the current page
    async fn page_source(&mut self) -> AppResult<String>;

    /// End the browser session
    async fn close(self: Box<Self>) -> AppResult<()>;
}

/// Source of fresh browser sessions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Start a new session. Fails with `EngineUnavailable` if the engine cannot be reached.
    async fn acquire(&self) -> AppResult<Box<dyn BrowserSession>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Waits for `locator` according to `policy`.
///
/// Returns `Ok(true)` when the element became interactable and `Ok(false)` when a
/// best-effort wait expired. A required wait that expires becomes
/// `PageStructureMismatch`.
pub async fn wait_for(
    session: &mut dyn BrowserSession,
    locator: ElementLocator,
    timeout: Duration,
    policy: WaitPolicy,
) -> AppResult<bool> {
    match session.wait_interactable(locator, timeout).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_recoverable() => match policy {
            WaitPolicy::BestEffort => {
                tracing::warn!(
                    locator = %locator,
                    timeout_secs = timeout.as_secs_f64(),
                    "Page didn't load in a reasonable amount of time; continuing with partial content"
                );
                Ok(false)
            }
            WaitPolicy::Required => Err(AppError::PageStructureMismatch(format!(
                "{} never became interactable",
                locator
            ))),
        },
        Err(e) => Err(e),
    }
}
