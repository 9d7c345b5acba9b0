use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use paperlens_core::{ExtractionResult, RawDocument};

use crate::models::{ErrorResponse, PastedText};
use crate::state::AppState;
use crate::upload;

/// `200 OK` for usable text, `422 Unprocessable Entity` otherwise. The body
/// is the full [`ExtractionResult`] either way.
fn result_response(result: ExtractionResult) -> Response {
    let status = if result.usable {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(result)).into_response()
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

pub async fn extract_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Response {
    let file = match upload::parse_multipart(multipart).await {
        Ok(file) => file,
        Err(e) => {
            tracing::info!(status = %e.status, error = %e.message, "rejected upload");
            return error_response(e.status, e.message);
        }
    };

    // Parsing is CPU-bound and some PDF readers are slow on large files.
    let worker_state = Arc::clone(&state);
    let joined = tokio::task::spawn_blocking(move || {
        worker_state
            .extractor
            .extract(RawDocument::new(&file.data, &file.filename))
    })
    .await;

    match joined {
        Ok(result) => result_response(result),
        Err(e) => {
            tracing::error!(error = %e, "extraction task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Extraction failed")
        }
    }
}

pub async fn extract_pasted(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PastedText>,
) -> Response {
    result_response(state.extractor.check_pasted(&req.text))
}
