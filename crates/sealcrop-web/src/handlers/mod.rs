//! Route handlers. Each one locks the session, runs a single transition and
//! renders the result.

mod downloads;
mod edits;
mod export;
mod page;
mod selection;
mod session;
mod uploads;

pub use downloads::download_artifact;
pub use edits::{preview_edit, update_edit};
pub use export::export_images;
pub use page::index;
pub use selection::confirm_selection;
pub use session::{get_session, reset_session};
pub use uploads::{source_image, thumbnail, upload_images};

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};

/// Edge length of grid thumbnails.
pub const THUMBNAIL_SIZE: u32 = 256;

/// Quality of JPEGs sent to the browser for display. Exports use the
/// configured quality instead.
pub const DISPLAY_JPEG_QUALITY: u8 = 90;

pub(crate) fn jpeg_response(bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        bytes,
    )
        .into_response()
}
