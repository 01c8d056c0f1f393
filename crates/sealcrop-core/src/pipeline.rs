//! Editing pipeline: crop, then enhance.
//!
//! The pipeline always starts from the decoded source. Slider and crop
//! changes re-run it from scratch, so results never depend on earlier
//! intermediate images.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;
use crate::enhance::apply_enhancement;
use crate::transform::{apply_crop, CropError, CropRegion};
use crate::EnhancementParams;

/// Current user input for one selected image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageEdit {
    pub crop: CropRegion,
    pub enhancement: EnhancementParams,
}

impl ImageEdit {
    /// Full-image crop with identity enhancement.
    pub fn for_image(image: &DecodedImage) -> Self {
        Self {
            crop: CropRegion::full(image.width, image.height),
            enhancement: EnhancementParams::default(),
        }
    }
}

/// Produce the finalized image for `edit` from the original `source`.
pub fn finalize(source: &DecodedImage, edit: &ImageEdit) -> Result<DecodedImage, CropError> {
    let cropped = apply_crop(source, &edit.crop)?;
    Ok(apply_enhancement(&cropped, &edit.enhancement))
}
