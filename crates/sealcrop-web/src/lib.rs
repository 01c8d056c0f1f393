//! Sealcrop Web - local browser front end
//!
//! Serves a single page and a small JSON API over one
//! [`sealcrop_core::Session`]. The page only renders state and forwards user
//! actions; every rule lives in the core crate.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod views;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::state::SharedState;

/// Build the application router. Request bodies above `max_body_bytes` are
/// refused with 413.
pub fn router(state: SharedState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/session", get(handlers::get_session))
        .route("/api/uploads", post(handlers::upload_images))
        .route("/api/uploads/{name}/thumbnail", get(handlers::thumbnail))
        .route("/api/uploads/{name}/image", get(handlers::source_image))
        .route("/api/selection", post(handlers::confirm_selection))
        .route("/api/edits/{name}", put(handlers::update_edit))
        .route("/api/edits/{name}/preview", get(handlers::preview_edit))
        .route("/api/export", post(handlers::export_images))
        .route("/api/downloads/{file}", get(handlers::download_artifact))
        .route("/api/reset", post(handlers::reset_session))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
