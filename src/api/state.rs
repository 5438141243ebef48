use std::sync::Arc;

use crate::{config::Config, error::AppResult, services::TrailerDispatcher};

/// Shared application state
///
/// Read-only across requests; every request gets its own browser session.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<TrailerDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: TrailerDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Builds the production dispatcher (WebDriver sessions, both site extractors)
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(TrailerDispatcher::from_config(config)?))
    }
}
