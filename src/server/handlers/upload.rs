use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::core::errors::{ApiError, ErrorKind};
use crate::state::AppState;
use crate::upstream::types::UploadedFile;

const FILE_FIELD: &str = "file";
pub const NO_FILE_MESSAGE: &str = "No file provided";
pub const UPLOAD_FAILURE_MESSAGE: &str = "Failed to upload file";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// `POST /api/upload`.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = match multipart {
        Ok(multipart) => relay_upload(&state, multipart).await,
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    };

    match result {
        Ok(()) => Json(json!({ "message": UPLOAD_SUCCESS_MESSAGE })).into_response(),
        Err(err) if err.kind() == ErrorKind::BadRequest => {
            err.respond(StatusCode::BAD_REQUEST, NO_FILE_MESSAGE)
        }
        Err(err) => err.respond(StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_FAILURE_MESSAGE),
    }
}

async fn relay_upload(state: &AppState, multipart: Multipart) -> Result<(), ApiError> {
    let file = take_file_field(multipart).await?;
    tracing::info!(
        file_name = file.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = file.bytes.len(),
        "Relaying upload"
    );
    state.rag.upload(file).await
}

async fn take_file_field(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        // A file was sent but could not be read in full.
        let bytes = field.bytes().await.map_err(ApiError::internal)?;

        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(ApiError::BadRequest("form has no file field".to_string()))
}
