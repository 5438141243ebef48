/// WebDriver-backed browser sessions
///
/// Talks to a running chromedriver (or any W3C WebDriver server) through
/// fantoccini. Installing and starting the driver is outside this crate; the
/// provider only connects to it.
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fantoccini::{elements::Element, error::CmdError, Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    services::browser::{BrowserSession, ElementLocator, SessionProvider},
};

/// Delay between readiness checks while waiting for an element
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl From<ElementLocator> for Locator<'static> {
    fn from(locator: ElementLocator) -> Self {
        match locator {
            ElementLocator::Css(s) => Locator::Css(s),
            ElementLocator::Id(s) => Locator::Id(s),
            ElementLocator::XPath(s) => Locator::XPath(s),
            ElementLocator::LinkText(s) => Locator::LinkText(s),
        }
    }
}

/// Starts Chrome sessions through a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverSessionProvider {
    webdriver_url: String,
    headless: bool,
}

impl WebDriverSessionProvider {
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.webdriver_url.clone(), config.headless)
    }

    /// Chrome capabilities for unattended operation with console logging silenced
    fn capabilities(&self) -> Map<String, Value> {
        let mut args = vec!["--disable-gpu", "--log-level=3"];
        if self.headless {
            args.insert(0, "--headless=new");
        }

        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "excludeSwitches": ["enable-logging"],
            }),
        );
        caps
    }
}

#[async_trait]
impl SessionProvider for WebDriverSessionProvider {
    async fn acquire(&self) -> AppResult<Box<dyn BrowserSession>> {
        let mut builder = ClientBuilder::rustls()
            .map_err(|e| AppError::EngineUnavailable(format!("TLS setup failed: {}", e)))?;
        builder.capabilities(self.capabilities());

        let client = builder.connect(&self.webdriver_url).await.map_err(|e| {
            tracing::error!(
                webdriver_url = %self.webdriver_url,
                error = %e,
                "Failed to start browser session"
            );
            AppError::EngineUnavailable(e.to_string())
        })?;

        tracing::debug!(headless = self.headless, "Browser session started");

        Ok(Box::new(WebDriverSession::new(client)))
    }

    fn name(&self) -> &'static str {
        "webdriver"
    }
}

/// A live WebDriver session
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn find(&self, locator: ElementLocator) -> AppResult<Element> {
        self.client
            .find(locator.into())
            .await
            .map_err(|e| lookup_error(locator, e))
    }

    /// Displayed and enabled, or `Ok(false)` if the element is missing or went stale
    async fn is_interactable(&self, locator: ElementLocator) -> Result<bool, CmdError> {
        let element = match self.client.find(locator.into()).await {
            Ok(element) => element,
            Err(e) if e.is_no_such_element() => return Ok(false),
            Err(e) => return Err(e),
        };

        match (element.is_displayed().await, element.is_enabled().await) {
            (Ok(displayed), Ok(enabled)) => Ok(displayed && enabled),
            (Err(e), _) | (_, Err(e)) => {
                tracing::debug!(locator = %locator, error = %e, "Element not ready yet");
                Ok(false)
            }
        }
    }
}

/// A missing element means the page is not shaped as expected; anything else is a driver failure
fn lookup_error(locator: ElementLocator, error: CmdError) -> AppError {
    if error.is_no_such_element() {
        AppError::PageStructureMismatch(format!("element not found: {}", locator))
    } else {
        AppError::Browser(error)
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> AppResult<()> {
        tracing::debug!(url, "Navigating");
        self.client.goto(url).await?;
        Ok(())
    }

    async fn send_keys(&mut self, locator: ElementLocator, text: &str) -> AppResult<()> {
        self.find(locator).await?.send_keys(text).await?;
        Ok(())
    }

    async fn click(&mut self, locator: ElementLocator) -> AppResult<()> {
        self.find(locator).await?.click().await?;
        Ok(())
    }

    async fn count(&mut self, locator: ElementLocator) -> AppResult<usize> {
        Ok(self.client.find_all(locator.into()).await?.len())
    }

    async fn scroll_by(&mut self, pixels: i64) -> AppResult<()> {
        self.client
            .execute("window.scrollBy(0, arguments[0]);", vec![json!(pixels)])
            .await?;
        Ok(())
    }

    async fn wait_interactable(
        &mut self,
        locator: ElementLocator,
        timeout: Duration,
    ) -> AppResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_interactable(locator).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AppError::ElementWaitTimeout(locator.to_string()));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn page_source(&mut self) -> AppResult<String> {
        Ok(self.client.source().await?)
    }

    async fn close(self: Box<Self>) -> AppResult<()> {
        self.client.close().await?;
        tracing::debug!("Browser session closed");
        Ok(())
    }
}
