//! Request and response bodies.

use sealcrop_core::session::{Download, UploadedImage};
use sealcrop_core::{
    CropRegion, DecodedImage, EnhancementParams, ExportReport, Exporter, ImageEdit, Session, Stage,
};
use serde::{Deserialize, Serialize};

/// Everything the page needs to render the current stage.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub stage: Stage,
    pub max_selection: usize,
    pub uploads: Vec<UploadView>,
    pub selection: Vec<String>,
    pub edits: Vec<EditView>,
    pub downloads: Vec<Download>,
    pub last_export: Option<ExportReport>,
}

impl SessionView {
    pub fn build(session: &Session, exporter: &Exporter) -> Self {
        let edits = session
            .selection()
            .iter()
            .filter_map(|name| {
                let edit = session.edit(name)?;
                let image = session.finalized_image(name)?;
                Some(EditView::new(name, edit, image))
            })
            .collect();

        Self {
            stage: session.stage(),
            max_selection: sealcrop_core::MAX_SELECTION,
            uploads: session.uploads().iter().map(UploadView::from).collect(),
            selection: session.selection().to_vec(),
            edits,
            downloads: session.downloads(exporter),
            last_export: session.last_export().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadView {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub byte_size: usize,
}

impl From<&UploadedImage> for UploadView {
    fn from(upload: &UploadedImage) -> Self {
        Self {
            filename: upload.filename.clone(),
            width: upload.image.width,
            height: upload.image.height,
            byte_size: upload.byte_size,
        }
    }
}

/// Current edit of one selected image and the size of its result.
#[derive(Debug, Serialize)]
pub struct EditView {
    pub filename: String,
    pub crop: CropRegion,
    pub brightness: f32,
    pub contrast: f32,
    pub sharpen: bool,
    pub output_width: u32,
    pub output_height: u32,
}

impl EditView {
    pub fn new(filename: &str, edit: &ImageEdit, finalized: &DecodedImage) -> Self {
        Self {
            filename: filename.to_string(),
            crop: edit.crop,
            brightness: edit.enhancement.brightness,
            contrast: edit.enhancement.contrast,
            sharpen: edit.enhancement.sharpen,
            output_width: finalized.width,
            output_height: finalized.height,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadReply {
    pub accepted: Vec<String>,
    pub rejected: Vec<RejectedUpload>,
}

#[derive(Debug, Serialize)]
pub struct RejectedUpload {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub filenames: Vec<String>,
}

/// Crop rectangle as drawn on the canvas, in source pixels. Values may be
/// fractional, negative or past the edges; they are clamped before use.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CropInput {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    /// Omitted means the whole image.
    #[serde(default)]
    pub crop: Option<CropInput>,
    #[serde(default = "unit_factor")]
    pub brightness: f32,
    #[serde(default = "unit_factor")]
    pub contrast: f32,
    #[serde(default)]
    pub sharpen: bool,
}

fn unit_factor() -> f32 {
    1.0
}

impl EditRequest {
    /// Resolve against a source of `width x height`.
    pub fn to_edit(&self, width: u32, height: u32) -> ImageEdit {
        let crop = match self.crop {
            Some(c) => CropRegion::clamped(c.x, c.y, c.width, c.height, width, height),
            None => CropRegion::full(width, height),
        };
        ImageEdit {
            crop,
            enhancement: EnhancementParams {
                brightness: self.brightness,
                contrast: self.contrast,
                sharpen: self.sharpen,
            },
        }
    }
}
