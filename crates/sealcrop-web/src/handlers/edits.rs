use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use sealcrop_core::{encode_image, SessionError};

use super::{jpeg_response, DISPLAY_JPEG_QUALITY};
use crate::error::{HttpError, ValidatedJson};
use crate::state::{run_blocking, with_session, SharedState};
use crate::views::{EditRequest, EditView};

/// Apply the crop rectangle and slider values for one selected image.
pub async fn update_edit(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    ValidatedJson(request): ValidatedJson<EditRequest>,
) -> Result<Json<EditView>, HttpError> {
    let view = with_session(&state, move |session, _| {
        let (width, height) = session
            .upload(&name)
            .map(|u| u.image.dimensions())
            .ok_or_else(|| SessionError::UnknownImage(name.clone()))?;

        let edit = request.to_edit(width, height);
        let finalized = session.confirm_crop(&name, edit)?;
        tracing::debug!(filename = %name, crop = %edit.crop, "Edit applied");
        Ok(EditView::new(&name, &edit, finalized))
    })
    .await?;
    Ok(Json(view))
}

/// The finalized image as it would be exported.
pub async fn preview_edit(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Response, HttpError> {
    let bytes = run_blocking(move || {
        let image = state
            .session()?
            .finalized_image(&name)
            .cloned()
            .ok_or_else(|| SessionError::UnknownImage(name.clone()))?;
        Ok(encode_image(&image, DISPLAY_JPEG_QUALITY)?)
    })
    .await?;
    Ok(jpeg_response(bytes))
}
