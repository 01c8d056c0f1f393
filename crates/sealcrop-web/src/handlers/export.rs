use axum::{extract::State, Json};

use crate::error::HttpError;
use crate::state::{with_session, SharedState};
use crate::views::SessionView;

/// Save Cropped Images.
pub async fn export_images(
    State(state): State<SharedState>,
) -> Result<Json<SessionView>, HttpError> {
    let view = with_session(&state, |session, exporter| {
        session.confirm_export(exporter)?;
        Ok(SessionView::build(session, exporter))
    })
    .await?;
    Ok(Json(view))
}
