use axum::{extract::State, Json};

use crate::error::{HttpError, ValidatedJson};
use crate::state::{with_session, SharedState};
use crate::views::{SelectionRequest, SessionView};

pub async fn confirm_selection(
    State(state): State<SharedState>,
    ValidatedJson(request): ValidatedJson<SelectionRequest>,
) -> Result<Json<SessionView>, HttpError> {
    let view = with_session(&state, move |session, exporter| {
        session.confirm_selection(request.filenames.as_slice())?;
        Ok(SessionView::build(session, exporter))
    })
    .await?;
    Ok(Json(view))
}
