/// Site-specific trailer extractors
///
/// Each supported site has one [`SiteExtractor`] holding all of its markup
/// knowledge (selectors, navigation order, pagination rules). A layout change
/// on one site is contained to its extractor and its fixture tests.
use async_trait::async_trait;

use crate::{error::AppResult, models::TrailerSource, services::browser::BrowserSession};

pub mod film_database;
pub mod video_platform;

pub use film_database::FilmDatabaseExtractor;
pub use video_platform::{ScrollBudget, VideoPlatformExtractor};

/// Produces trailer URLs for a movie title from one site
#[async_trait]
pub trait SiteExtractor: Send + Sync {
    /// Source this extractor answers for
    fn source(&self) -> TrailerSource;

    /// Drive `session` through the site and collect at most `limit` absolute trailer URLs,
    /// in the site's own result order.
    ///
    /// Element-wait timeouts are recoverable and yield best-effort results. Only a missing
    /// mandatory navigation step fails the extraction.
    async fn extract(
        &self,
        session: &mut dyn BrowserSession,
        movie_title: &str,
        limit: usize,
    ) -> AppResult<Vec<String>>;
}
