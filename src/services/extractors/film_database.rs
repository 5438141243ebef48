/// Film database (IMDb) trailer extractor
///
/// Flow:
/// 1. Home page → type the title into the suggestion search
/// 2. Open the first autocomplete suggestion (best effort wait)
/// 3. Title page → "more" quicklinks → "Trailers and Videos" (both required)
/// 4. Collect the gallery page by page until `limit` is reached, there is no
///    next page, or a page renders no videos
///
/// The gallery renders every video twice (thumbnail and heading), and only one
/// of the two anchors carries `data-video`. Collecting just those anchors
/// gives exactly one entry per video.
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

pub(crate) const SUGGESTION_SEARCH: ElementLocator = ElementLocator::Id("suggestion-search");
pub(crate) const FIRST_SUGGESTION: ElementLocator = ElementLocator::Id("react-autowhatever-1--item-0");
pub(crate) const MORE_MENU: ElementLocator =
    ElementLocator::XPath("//span[@class='show_more quicklink']");
pub(crate) const TRAILERS_LINK: ElementLocator =
    ElementLocator::XPath("//a[text()='Trailers and Videos']");
pub(crate) const FIRST_VIDEO: ElementLocator = ElementLocator::XPath("//h2/a[@class='video-modal']");
pub(crate) const NEXT_PAGE: ElementLocator = ElementLocator::XPath("//a[text()='Next »']");

pub struct FilmDatabaseExtractor {
    base_url: String,
    wait_timeout: Duration,
}

impl FilmDatabaseExtractor {
    pub fn new(base_url: &str, wait_timeout: Duration) -> AppResult<Self> {
        Url::parse(base_url).map_err(|e| {
            AppError::Internal(format!("Invalid film database URL {}: {}", base_url, e))
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            wait_timeout,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(&config.film_database_url, config.element_wait_timeout())
    }

    /// Home page → title page → video gallery
    async fn open_gallery(&self, session: &mut dyn BrowserSession, movie_title: &str) -> AppResult<()> {
        session.goto(&self.base_url).await?;
        session.send_keys(SUGGESTION_SEARCH, movie_title).await?;

        if wait_for(session, FIRST_SUGGESTION, self.wait_timeout, WaitPolicy::BestEffort).await? {
            session.click(FIRST_SUGGESTION).await?;
        }

        session.click(MORE_MENU).await?;
        session.click(TRAILERS_LINK).await?;
        Ok(())
    }
}

/// Video ids of the gallery page in page order, one per video
pub(crate) fn parse_video_ids(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a.video-modal[data-video]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("data-video"))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl SiteExtractor for FilmDatabaseExtractor {
    fn source(&self) -> TrailerSource {
        TrailerSource::FilmDatabase
    }

    #[tracing::instrument(name = "film_database_extract", skip(self, session))]
    async fn extract(
        &self,
        session: &mut dyn BrowserSession,
        movie_title: &str,
        limit: usize,
    ) -> AppResult<Vec<String>> {
        self.open_gallery(session, movie_title).await?;

        let mut links = Vec::new();
        let mut page = 1;
        loop {
            wait_for(session, FIRST_VIDEO, self.wait_timeout, WaitPolicy::BestEffort).await?;

            let html = session.page_source().await?;
            let ids = parse_video_ids(&html);
            tracing::debug!(page, found = ids.len(), "Collected gallery page");

            // Every page must add videos, otherwise following "Next" cannot reach the limit
            if ids.is_empty() {
                if session.count(NEXT_PAGE).await? > 0 {
                    tracing::warn!(
                        page,
                        collected = links.len(),
                        "Gallery page rendered no videos; stopping with partial results"
                    );
                }
                break;
            }

            links.extend(
                ids.into_iter()
                    .map(|id| format!("{}/video/{}", self.base_url, id)),
            );

            if links.len() >= limit {
                break;
            }
            if session.count(NEXT_PAGE).await? == 0 {
                break;
            }
            session.click(NEXT_PAGE).await?;
            page += 1;
        }

        links.truncate(limit);

        tracing::info!(collected = links.len(), pages = page, "Film database extraction finished");

        Ok(links)
    }
}
