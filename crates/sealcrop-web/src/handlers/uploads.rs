use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    Json,
};
use sealcrop_core::{encode_image, generate_thumbnail, DecodedImage, SessionError};

use super::{jpeg_response, DISPLAY_JPEG_QUALITY, THUMBNAIL_SIZE};
use crate::error::HttpError;
use crate::state::{run_blocking, with_session, AppState, SharedState};
use crate::views::{RejectedUpload, UploadReply};

const ACCEPTED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// Add every file field of a multipart form to the session.
///
/// Files with another content type, or that fail to decode, are listed in
/// `rejected`; the rest of the batch is still added.
pub async fn upload_images(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReply>, HttpError> {
    let mut files = Vec::new();
    let mut rejected = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(base_name) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;

        if !ACCEPTED_CONTENT_TYPES.contains(&content_type.as_str()) {
            tracing::warn!(filename = %filename, content_type = %content_type, "Rejected upload type");
            rejected.push(RejectedUpload {
                filename,
                error: format!("Unsupported file type: {content_type}"),
            });
            continue;
        }
        files.push((filename, data));
    }

    if files.is_empty() && rejected.is_empty() {
        return Err(HttpError::bad_request("No files in upload"));
    }

    let (accepted, failed) = with_session(&state, move |session, _| {
        let failures = session.add_uploads(
            files
                .iter()
                .map(|(name, data)| (name.as_str(), &data[..])),
        )?;
        let accepted = files
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| !failures.iter().any(|f| &f.filename == name))
            .collect::<Vec<_>>();
        let failures = failures
            .into_iter()
            .map(|f| RejectedUpload {
                filename: f.filename,
                error: f.error.to_string(),
            })
            .collect::<Vec<_>>();
        Ok((accepted, failures))
    })
    .await?;
    rejected.extend(failed);

    tracing::info!(
        accepted = accepted.len(),
        rejected = rejected.len(),
        "Upload batch processed"
    );
    Ok(Json(UploadReply { accepted, rejected }))
}

pub async fn thumbnail(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Response, HttpError> {
    let bytes = run_blocking(move || {
        let source = source_copy(&state, &name)?;
        let thumb = generate_thumbnail(&source, THUMBNAIL_SIZE)?;
        Ok(encode_image(&thumb, DISPLAY_JPEG_QUALITY)?)
    })
    .await?;
    Ok(jpeg_response(bytes))
}

/// The oriented source image, used as the crop canvas background.
pub async fn source_image(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Response, HttpError> {
    let bytes = run_blocking(move || {
        let source = source_copy(&state, &name)?;
        Ok(encode_image(&source, DISPLAY_JPEG_QUALITY)?)
    })
    .await?;
    Ok(jpeg_response(bytes))
}

/// Copy an upload out so encoding runs without the session lock.
fn source_copy(state: &AppState, name: &str) -> Result<DecodedImage, HttpError> {
    let session = state.session()?;
    let upload = session
        .upload(name)
        .ok_or_else(|| SessionError::UnknownImage(name.to_string()))?;
    Ok(upload.image.clone())
}

/// Browsers may send a path on some platforms; keep the last component.
fn base_name(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or(name).to_string()
}
