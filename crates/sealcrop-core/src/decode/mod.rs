//! Upload decoding.
//!
//! Uploaded photos arrive as raw JPEG or PNG bytes. They are decoded once,
//! with EXIF orientation applied, into an RGB [`DecodedImage`] that every
//! later stage works from. Decoding is synchronous.

mod reader;
mod resize;
mod types;

pub use reader::{decode_image, get_orientation};
pub use resize::{generate_thumbnail, resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
