use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use sealcrop_core::export::BUNDLE_FILE_NAME;

use crate::error::HttpError;
use crate::state::{with_session, SharedState};

/// Serve an exported file or the bundle as an attachment.
///
/// Only artifacts the session currently offers can be downloaded, and only
/// while they exist on disk.
pub async fn download_artifact(
    State(state): State<SharedState>,
    Path(file_name): Path<String>,
) -> Result<Response, HttpError> {
    let (file_name, bytes) = with_session(&state, move |session, exporter| {
        let offered = session
            .downloads(exporter)
            .iter()
            .any(|d| d.file_name == file_name);
        if !offered {
            return Err(HttpError::not_found(format!(
                "No download named {file_name}"
            )));
        }
        let bytes = exporter.read_artifact(&file_name)?;
        Ok((file_name, bytes))
    })
    .await?;

    let content_type = if file_name == BUNDLE_FILE_NAME {
        "application/zip"
    } else {
        "image/jpeg"
    };
    tracing::info!(file = %file_name, bytes = bytes.len(), "Serving download");

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, attachment_header(&file_name)),
        ],
        bytes,
    )
        .into_response())
}

/// `Content-Disposition` value with quotes, backslashes and control
/// characters in the name replaced by `_`.
fn attachment_header(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
