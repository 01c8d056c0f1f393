//! Sealcrop Core - photo selection and cropping library
//!
//! This crate holds everything that does not depend on a front end:
//! decoding uploads, cropping, enhancement, JPEG export with an optional
//! zip bundle, and the [`session::Session`] state machine that ties them
//! together.

pub mod decode;
pub mod encode;
pub mod enhance;
pub mod export;
pub mod pipeline;
pub mod session;
pub mod transform;

pub use decode::{decode_image, generate_thumbnail, DecodeError, DecodedImage};
pub use encode::{encode_image, EncodeError, DEFAULT_JPEG_QUALITY};
pub use enhance::{apply_enhancement, EnhanceError};
pub use export::{ExportError, ExportOptions, ExportReport, Exporter};
pub use pipeline::{finalize, ImageEdit};
pub use session::{Session, SessionError, Stage};
pub use transform::{apply_crop, CropError, CropRegion};

/// Most images that can be selected at once.
pub const MAX_SELECTION: usize = 5;

/// Lowest accepted brightness or contrast factor.
pub const MIN_FACTOR: f32 = 0.5;
/// Highest accepted brightness or contrast factor.
pub const MAX_FACTOR: f32 = 2.0;

/// Enhancement settings for one image
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnhancementParams {
    /// Brightness factor (0.5 to 2.0, 1.0 = unchanged)
    pub brightness: f32,
    /// Contrast factor (0.5 to 2.0, 1.0 = unchanged)
    pub contrast: f32,
    /// Apply the sharpening kernel
    pub sharpen: bool,
}

impl Default for EnhancementParams {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            sharpen: false,
        }
    }
}

impl EnhancementParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when applying these parameters leaves the image unchanged
    pub fn is_identity(&self) -> bool {
        self.brightness == 1.0 && self.contrast == 1.0 && !self.sharpen
    }

    /// Check both factors against the inclusive range. NaN is rejected.
    pub fn validate(&self) -> Result<(), EnhanceError> {
        check_factor("brightness", self.brightness)?;
        check_factor("contrast", self.contrast)
    }
}

fn check_factor(name: &'static str, value: f32) -> Result<(), EnhanceError> {
    if (MIN_FACTOR..=MAX_FACTOR).contains(&value) {
        Ok(())
    } else {
        Err(EnhanceError::FactorOutOfRange { name, value })
    }
}

#[cfg(test)]
pub(crate) mod test_support;
