use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::{AppError, AppResult};

/// Fixed maximum number of trailer URLs returned per query
pub const RESULT_CAP: usize = 100;

/// Site a trailer query is answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailerSource {
    /// YouTube search results
    #[serde(alias = "youtube")]
    VideoPlatform,
    /// IMDb "Trailers and Videos" gallery
    #[serde(alias = "imdb")]
    FilmDatabase,
}

impl TrailerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrailerSource::VideoPlatform => "video_platform",
            TrailerSource::FilmDatabase => "film_database",
        }
    }
}

impl Display for TrailerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrailerSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video_platform" | "youtube" => Ok(TrailerSource::VideoPlatform),
            "film_database" | "imdb" => Ok(TrailerSource::FilmDatabase),
            other => Err(AppError::UnknownSource(other.to_string())),
        }
    }
}

/// Raw query parameters as received over HTTP, not yet validated.
/// Both are optional here so a missing parameter is reported like any other invalid input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrailerRequest {
    pub source: Option<String>,
    pub movie_title: Option<String>,
}

impl TrailerRequest {
    pub fn new(source: impl Into<String>, movie_title: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            movie_title: Some(movie_title.into()),
        }
    }
}

/// A validated trailer query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerQuery {
    source: TrailerSource,
    movie_title: String,
}

impl TrailerQuery {
    pub fn new(source: TrailerSource, movie_title: impl Into<String>) -> AppResult<Self> {
        let movie_title = movie_title.into().trim().to_string();
        if movie_title.is_empty() {
            return Err(AppError::InvalidInput(
                "movie_title must not be empty".to_string(),
            ));
        }
        Ok(Self {
            source,
            movie_title,
        })
    }

    pub fn source(&self) -> TrailerSource {
        self.source
    }

    pub fn movie_title(&self) -> &str {
        &self.movie_title
    }
}

impl TryFrom<TrailerRequest> for TrailerQuery {
    type Error = AppError;

    /// The source is checked first so an unknown source is always reported as such
    fn try_from(request: TrailerRequest) -> Result<Self, Self::Error> {
        let source = request
            .source
            .ok_or_else(|| AppError::InvalidInput("source is required".to_string()))?
            .parse::<TrailerSource>()?;
        let movie_title = request
            .movie_title
            .ok_or_else(|| AppError::InvalidInput("movie_title is required".to_string()))?;
        TrailerQuery::new(source, movie_title)
    }
}

/// Ordered trailer URLs for one query, never longer than [`RESULT_CAP`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TrailerResult(Vec<String>);

impl TrailerResult {
    pub fn new(mut urls: Vec<String>) -> Self {
        urls.truncate(RESULT_CAP);
        Self(urls)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}
