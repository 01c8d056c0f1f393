use axum::{extract::State, Json};

use crate::error::HttpError;
use crate::state::{with_session, SharedState};
use crate::views::SessionView;

pub async fn get_session(State(state): State<SharedState>) -> Result<Json<SessionView>, HttpError> {
    let view = with_session(&state, |session, exporter| {
        Ok(SessionView::build(session, exporter))
    })
    .await?;
    Ok(Json(view))
}

/// Start Over. Exported files are kept.
pub async fn reset_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionView>, HttpError> {
    let view = with_session(&state, |session, exporter| {
        session.reset();
        Ok(SessionView::build(session, exporter))
    })
    .await?;
    Ok(Json(view))
}
