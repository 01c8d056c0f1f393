//! Geometric transforms applied before enhancement.
//!
//! Only cropping exists: the user drags a rectangle over the oriented
//! source image and the editing pipeline cuts it out before brightness,
//! contrast and sharpening run.
//!
//! # Coordinate System
//!
//! - Crop regions are integer pixel rectangles in source coordinates
//! - Origin is the top-left corner
//! - Pointer input (pixels or 0.0-1.0 fractions) is clamped on the way in

mod crop;

pub use crop::{apply_crop, CropError, CropRegion};
