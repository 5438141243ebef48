use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// The browser engine could not be started or reached
    #[error("Browser engine unavailable: {0}")]
    EngineUnavailable(String),

    /// An element did not become interactable in time
    #[error("Timed out waiting for element: {0}")]
    ElementWaitTimeout(String),

    /// The page markup deviated from what an extractor requires
    #[error("Page structure mismatch: {0}")]
    PageStructureMismatch(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("No results found")]
    NoResultsFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Browser command failed: {0}")]
    Browser(#[from] fantoccini::error::CmdError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether an extraction may continue with best-effort data after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::ElementWaitTimeout(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::UnknownSource(_) => (StatusCode::NOT_FOUND, "Source not found".to_string()),
            AppError::NoResultsFound => (StatusCode::NOT_FOUND, "No results found".to_string()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::EngineUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::PageStructureMismatch(_) | AppError::Browser(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::ElementWaitTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "detail": detail
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
