/// Request dispatcher
///
/// Validates the requested source, runs the matching extractor inside a
/// freshly acquired browser session, and turns an empty extraction into
/// `NoResultsFound`.
///
/// Lifecycle per request:
/// `Idle → Validating → SessionActive → Extracting → Returning | Failed`.
/// No session is acquired before validation succeeds, and the session is
/// always closed before a terminal state is reached.
use std::{collections::HashMap, sync::Arc};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{TrailerQuery, TrailerRequest, TrailerResult, TrailerSource, RESULT_CAP},
    services::{
        browser::{SessionProvider, WebDriverSessionProvider},
        extractors::{FilmDatabaseExtractor, SiteExtractor, VideoPlatformExtractor},
    },
};

pub struct TrailerDispatcher {
    sessions: Arc<dyn SessionProvider>,
    extractors: HashMap<TrailerSource, Arc<dyn SiteExtractor>>,
    result_limit: usize,
}

impl TrailerDispatcher {
    /// Creates a dispatcher with no extractors registered
    pub fn new(sessions: Arc<dyn SessionProvider>, result_limit: usize) -> Self {
        Self {
            sessions,
            extractors: HashMap::new(),
            result_limit: result_limit.clamp(1, RESULT_CAP),
        }
    }

    /// Registers `extractor` for the source it reports, replacing any previous one
    pub fn with_extractor(mut self, extractor: Arc<dyn SiteExtractor>) -> Self {
        self.extractors.insert(extractor.source(), extractor);
        self
    }

    /// WebDriver sessions plus both site extractors, as configured
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let sessions = Arc::new(WebDriverSessionProvider::from_config(config));
        Ok(Self::new(sessions, config.effective_result_limit())
            .with_extractor(Arc::new(VideoPlatformExtractor::from_config(config)?))
            .with_extractor(Arc::new(FilmDatabaseExtractor::from_config(config)?)))
    }

    /// Validates `request` and fetches its trailers
    pub async fn dispatch(&self, request: TrailerRequest) -> AppResult<TrailerResult> {
        tracing::debug!(source = ?request.source, "Validating trailer request");
        let query = TrailerQuery::try_from(request)?;
        self.run(&query).await
    }

    /// Fetches trailers for an already validated query
    #[tracing::instrument(skip(self), fields(source = %query.source(), movie_title = %query.movie_title()))]
    pub async fn run(&self, query: &TrailerQuery) -> AppResult<TrailerResult> {
        let extractor = self
            .extractors
            .get(&query.source())
            .ok_or_else(|| AppError::UnknownSource(query.source().to_string()))?;

        let mut session = self.sessions.acquire().await?;
        tracing::debug!(provider = self.sessions.name(), "Session active; extracting");

        let outcome = extractor
            .extract(session.as_mut(), query.movie_title(), self.result_limit)
            .await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close browser session");
        }

        let urls = match outcome {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!(error = %e, "Extraction failed");
                return Err(e);
            }
        };

        if urls.is_empty() {
            tracing::info!("Extraction returned no results");
            return Err(AppError::NoResultsFound);
        }

        let result = TrailerResult::new(urls);
        tracing::info!(count = result.len(), "Returning trailer links");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        browser::{
            fake::{FakePage, FakeSession},
            BrowserSession, MockSessionProvider,
        },
        extractors::film_database::fixtures::{paged_ids, site},
    };
    use async_trait::async_trait;
    use std::time::Duration;

    const FILM_BASE: &str = "https://www.imdb.com";

    fn film_extractor() -> Arc<dyn SiteExtractor> {
        Arc::new(FilmDatabaseExtractor::new(FILM_BASE, Duration::from_secs(10)).unwrap())
    }

    fn request(source: &str, movie_title: &str) -> TrailerRequest {
        TrailerRequest::new(source, movie_title)
    }

    /// Extractor that fails without touching the page
    struct FailingExtractor;

    #[async_trait]
    impl SiteExtractor for FailingExtractor {
        fn source(&self) -> TrailerSource {
            TrailerSource::VideoPlatform
        }

        async fn extract(
            &self,
            _session: &mut dyn BrowserSession,
            _movie_title: &str,
            _limit: usize,
        ) -> AppResult<Vec<String>> {
            Err(AppError::PageStructureMismatch("search box".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unknown_source_creates_no_session() {
        let mut provider = MockSessionProvider::new();
        provider.expect_acquire().times(0);
        provider.expect_name().return_const("mock");

        let dispatcher =
            TrailerDispatcher::new(Arc::new(provider), 100).with_extractor(film_extractor());

        let err = dispatcher
            .dispatch(request("imdb_typo", "Batman Begins"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownSource(_)));
    }

    #[tokio::test]
    async fn test_batman_begins_end_to_end_over_three_pages() {
        let session = FakeSession::new(site(&paged_ids(3, 40)));
        let log = session.log();

        let mut provider = MockSessionProvider::new();
        provider
            .expect_acquire()
            .times(1)
            .return_once(move || Ok(Box::new(session) as Box<dyn BrowserSession>));
        provider.expect_name().return_const("mock");

        let dispatcher =
            TrailerDispatcher::new(Arc::new(provider), 100).with_extractor(film_extractor());

        let result = dispatcher
            .dispatch(request("film_database", "Batman Begins"))
            .await
            .unwrap();

        assert_eq!(result.len(), 100);
        for (i, url) in result.urls().iter().enumerate() {
            assert_eq!(url, &format!("{}/video/vi{}", FILM_BASE, i));
        }
        assert!(log.lock().unwrap().closed);
    }

    #[tokio::test]
    async fn test_zero_results_is_no_results_found_and_session_closed() {
        let session = FakeSession::new(site(&[Vec::new()]));
        let log = session.log();

        let mut provider = MockSessionProvider::new();
        provider
            .expect_acquire()
            .times(1)
            .return_once(move || Ok(Box::new(session) as Box<dyn BrowserSession>));
        provider.expect_name().return_const("mock");

        let dispatcher =
            TrailerDispatcher::new(Arc::new(provider), 100).with_extractor(film_extractor());

        let err = dispatcher
            .dispatch(request("imdb", "Nothing At All"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoResultsFound));
        assert!(log.lock().unwrap().closed);
    }

    #[tokio::test]
    async fn test_session_closed_when_extraction_fails() {
        let session = FakeSession::new(vec![FakePage::new("<html></html>")]);
        let log = session.log();

        let mut provider = MockSessionProvider::new();
        provider
            .expect_acquire()
            .times(1)
            .return_once(move || Ok(Box::new(session) as Box<dyn BrowserSession>));
        provider.expect_name().return_const("mock");

        let dispatcher =
            TrailerDispatcher::new(Arc::new(provider), 100).with_extractor(Arc::new(FailingExtractor));

        let err = dispatcher
            .dispatch(request("video_platform", "Batman Begins"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PageStructureMismatch(_)));
        assert!(log.lock().unwrap().closed);
    }

    #[tokio::test]
    async fn test_engine_unavailable_is_propagated() {
        let mut provider = MockSessionProvider::new();
        provider
            .expect_acquire()
            .times(1)
            .returning(|| Err(AppError::EngineUnavailable("connection refused".to_string())));
        provider.expect_name().return_const("mock");

        let dispatcher =
            TrailerDispatcher::new(Arc::new(provider), 100).with_extractor(film_extractor());

        let err = dispatcher
            .dispatch(request("film_database", "Batman Begins"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EngineUnavailable(_)));
    }

    #[tokio::test]
    async fn test_known_source_without_extractor_creates_no_session() {
        let mut provider = MockSessionProvider::new();
        provider.expect_acquire().times(0);
        provider.expect_name().return_const("mock");

        let dispatcher =
            TrailerDispatcher::new(Arc::new(provider), 100).with_extractor(film_extractor());

        let err = dispatcher
            .dispatch(request("video_platform", "Batman Begins"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownSource(_)));
    }

    #[test]
    fn test_result_limit_is_clamped() {
        let dispatcher = TrailerDispatcher::new(Arc::new(MockSessionProvider::new()), 1_000);
        assert_eq!(dispatcher.result_limit, RESULT_CAP);

        let dispatcher = TrailerDispatcher::new(Arc::new(MockSessionProvider::new()), 0);
        assert_eq!(dispatcher.result_limit, 1);
    }
}
