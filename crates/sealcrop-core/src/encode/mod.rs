//! Image encoding.
//!
//! Exported files and the thumbnails/previews shown in the browser are all
//! baseline JPEG produced by the `image` crate's encoder.

mod jpeg;

pub use jpeg::{encode_image, encode_jpeg, EncodeError, DEFAULT_JPEG_QUALITY};
