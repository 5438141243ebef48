use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{TrailerRequest, TrailerResult},
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// `GET /?source=...&movie_title=...`
///
/// Returns the trailer URLs as a bare JSON array. Unknown sources and empty
/// extractions are both reported as 404. A malformed query string is a 400
/// with the same `{"detail": ...}` body as every other failure.
pub async fn get_trailers(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<TrailerRequest>, QueryRejection>,
) -> AppResult<Json<TrailerResult>> {
    let Query(request) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    tracing::info!(
        request_id = %request_id,
        source = ?request.source,
        movie_title = ?request.movie_title,
        "Processing trailer request"
    );

    let result = state.dispatcher.dispatch(request).await?;

    tracing::info!(
        request_id = %request_id,
        count = result.len(),
        "Trailer request completed"
    );

    Ok(Json(result))
}
