/// Video platform (YouTube) trailer extractor
///
/// Flow:
/// 1. Home page → type the title into the search box → search
/// 2. Scroll until `limit` results are rendered or the scroll budget runs out
/// 3. Wait for the last rendered result as a load signal (best effort)
/// 4. Parse the page and resolve each result title's href against the site origin
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::TrailerSource,
    services::{
        browser::{wait_for, BrowserSession, ElementLocator, WaitPolicy},
        extractors::SiteExtractor,
    },
};

pub(crate) const SEARCH_INPUT: ElementLocator = ElementLocator::Css("input#search");
pub(crate) const SEARCH_BUTTON: ElementLocator = ElementLocator::Id("search-icon-legacy");
pub(crate) const RESULT_TITLES: ElementLocator =
    ElementLocator::XPath("//ytd-video-renderer//a[@id='video-title']");
pub(crate) const LAST_RESULT_TITLE: ElementLocator =
    ElementLocator::XPath("(//ytd-video-renderer//a[@id='video-title'])[last()]");

/// Bound on the scroll-until-loaded loop
#[derive(Debug, Clone, Copy)]
pub struct ScrollBudget {
    pub max_attempts: u32,
    pub poll_interval: Duration,
    pub step_px: i64,
}

impl ScrollBudget {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_scroll_attempts,
            poll_interval: config.scroll_poll_interval(),
            step_px: config.scroll_step_px,
        }
    }
}

pub struct VideoPlatformExtractor {
    base_url: Url,
    wait_timeout: Duration,
    scroll: ScrollBudget,
}

impl VideoPlatformExtractor {
    pub fn new(base_url: &str, wait_timeout: Duration, scroll: ScrollBudget) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Internal(format!("Invalid video platform URL {}: {}", base_url, e))
        })?;
        Ok(Self {
            base_url,
            wait_timeout,
            scroll,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            &config.video_platform_url,
            config.element_wait_timeout(),
            ScrollBudget::from_config(config),
        )
    }

    /// Scrolls until `limit` results are rendered or the budget is spent.
    /// Returns the number of results rendered at the end.
    async fn load_results(&self, session: &mut dyn BrowserSession, limit: usize) -> AppResult<usize> {
        let mut rendered = session.count(RESULT_TITLES).await?;
        let mut attempts = 0;

        while rendered < limit && attempts < self.scroll.max_attempts {
            session.scroll_by(self.scroll.step_px).await?;
            tokio::time::sleep(self.scroll.poll_interval).await;
            attempts += 1;
            rendered = session.count(RESULT_TITLES).await?;
        }

        if rendered < limit {
            tracing::warn!(
                rendered,
                limit,
                attempts,
                "Scroll budget exhausted before reaching limit; continuing with partial results"
            );
        } else {
            tracing::debug!(rendered, attempts, "Results loaded");
        }

        Ok(rendered)
    }
}

/// Collects result links in page order.
///
/// Every `ytd-video-renderer` contributes the href of its `a#video-title`,
/// resolved against `base_url`. Entries without an href, or that resolve to
/// another host, are skipped.
pub(crate) fn parse_result_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let (Ok(renderer), Ok(title)) = (
        Selector::parse("ytd-video-renderer"),
        Selector::parse("a#video-title"),
    ) else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for video in document.select(&renderer) {
        let Some(href) = video
            .select(&title)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
        else {
            continue;
        };

        match base_url.join(href) {
            Ok(url) if url.host_str() == base_url.host_str() => links.push(url.to_string()),
            Ok(url) => tracing::debug!(url = %url, "Skipping off-site result link"),
            Err(e) => tracing::debug!(href, error = %e, "Skipping unparseable result link"),
        }
    }
    links
}

#[async_trait]
impl SiteExtractor for VideoPlatformExtractor {
    fn source(&self) -> TrailerSource {
        TrailerSource::VideoPlatform
    }

    #[tracing::instrument(name = "video_platform_extract", skip(self, session))]
    async fn extract(
        &self,
        session: &mut dyn BrowserSession,
        movie_title: &str,
        limit: usize,
    ) -> AppResult<Vec<String>> {
        session.goto(self.base_url.as_str()).await?;
        session.send_keys(SEARCH_INPUT, movie_title).await?;
        session.click(SEARCH_BUTTON).await?;

        let rendered = self.load_results(session, limit).await?;
        if rendered > 0 {
            wait_for(
                session,
                LAST_RESULT_TITLE,
                self.wait_timeout,
                WaitPolicy::BestEffort,
            )
            .await?;
        }

        let html = session.page_source().await?;
        let mut links = parse_result_links(&html, &self.base_url);
        links.truncate(limit);

        tracing::info!(collected = links.len(), "Video platform extraction finished");

        Ok(links)
    }
}
