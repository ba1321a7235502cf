//! Multipart upload handler

use crate::error::ApiError;
use crate::session::ensure_session;
use crate::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use salesdash_core::{load_dataset, CoreError, UploadState};
use std::sync::Arc;

/// Form field carrying the file
pub const UPLOAD_FIELD: &str = "file";

const FALLBACK_FILE_NAME: &str = "upload.csv";

/// Replace the session's dataset with the uploaded file.
///
/// Parse failures are stored on the session and shown as an error panel on
/// the next page render. Submitting the form without choosing a file keeps
/// the current upload.
pub async fn upload_file(
    State(state): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<(CookieJar, Redirect), ApiError> {
    let (jar, session_id) = ensure_session(jar);
    if !state.sessions.get(&session_id).await.access.is_unlocked() {
        return Err(ApiError::Unauthorized);
    }

    let limit = state.config.upload.max_bytes;
    let mut received = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        received = Some((file_name, content));
    }

    let Some((file_name, content)) = received else {
        return Err(ApiError::BadRequest {
            message: format!("missing form field '{}'", UPLOAD_FIELD),
        });
    };

    if file_name.is_empty() && content.is_empty() {
        log::debug!("Upload form submitted without a file");
        return Ok((jar, Redirect::to("/")));
    }

    let file_name = if file_name.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        file_name
    };

    let upload = match load_dataset(&state.parser, &file_name, &content).await {
        Ok(dataset) => UploadState::Loaded(Arc::new(dataset)),
        Err(e) => {
            log::warn!("Failed to load {} ({} bytes): {}", file_name, content.len(), e);
            UploadState::failed(file_name, &e)
        }
    };

    state.sessions.update(&session_id, move |session| session.upload = upload).await;
    Ok((jar, Redirect::to("/")))
}

fn multipart_error(error: MultipartError, limit: usize) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::Core(CoreError::UploadTooLarge { limit })
    } else {
        ApiError::BadRequest {
            message: error.body_text(),
        }
    }
}
