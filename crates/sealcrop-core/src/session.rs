//! Session state machine.
//!
//! ```text
//!            confirm_selection            confirm_export
//! Selecting ───────────────────▶ Cropping ──────────────▶ Done
//!     ▲                            ▲    │                   │
//!     │                            │    └─ confirm_crop ◀┐  │
//!     │                            └─────── confirm_crop ┘◀─┤
//!     └──────────────────────── reset ◀─────────────────────┘
//! ```
//!
//! All state for one operator lives in a [`Session`]. Front ends hold a
//! session and call its transition methods; they never keep their own
//! copies of the selection or the finalized images.
//!
//! While in `Cropping` or `Done` the finalized map holds exactly one image
//! per selected filename.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::enhance::EnhanceError;
use crate::export::{output_file_name, ExportError, ExportReport, Exporter, BUNDLE_FILE_NAME};
use crate::pipeline::{finalize, ImageEdit};
use crate::transform::CropError;
use crate::MAX_SELECTION;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Selecting,
    Cropping,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Selecting => "selecting",
            Stage::Cropping => "cropping",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Cannot {action} while {stage}")]
    WrongStage { action: &'static str, stage: Stage },

    #[error("Please select 1-{max} images.", max = MAX_SELECTION)]
    SelectionCount { count: usize },

    #[error("Unknown image: {0}")]
    UnknownImage(String),

    #[error("Upload is missing a filename")]
    MissingFilename,

    #[error("Failed to decode {filename}: {source}")]
    Decode {
        filename: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Enhance(#[from] EnhanceError),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// A decoded upload. Immutable once added.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    /// Size of the uploaded file in bytes.
    pub byte_size: usize,
    pub image: DecodedImage,
}

/// An upload that could not be decoded and was left out of the grid.
#[derive(Debug)]
pub struct UploadFailure {
    pub filename: String,
    pub error: SessionError,
}

/// A downloadable artifact that currently exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    /// Upload the file was exported from; `None` for the zip bundle.
    pub source_name: Option<String>,
    pub file_name: String,
}

#[derive(Debug, Default)]
pub struct Session {
    stage: Stage,
    uploads: Vec<UploadedImage>,
    selection: Vec<String>,
    edits: HashMap<String, ImageEdit>,
    finalized: HashMap<String, DecodedImage>,
    last_export: Option<ExportReport>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Uploads in the order they arrived.
    pub fn uploads(&self) -> &[UploadedImage] {
        &self.uploads
    }

    pub fn upload(&self, filename: &str) -> Option<&UploadedImage> {
        self.uploads.iter().find(|u| u.filename == filename)
    }

    /// Selected filenames, in upload order.
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn edit(&self, filename: &str) -> Option<&ImageEdit> {
        self.edits.get(filename)
    }

    pub fn finalized_image(&self, filename: &str) -> Option<&DecodedImage> {
        self.finalized.get(filename)
    }

    /// Finalized images in selection order.
    pub fn finalized(&self) -> impl Iterator<Item = (&str, &DecodedImage)> + '_ {
        self.selection.iter().filter_map(|name| {
            self.finalized
                .get(name)
                .map(|image| (name.as_str(), image))
        })
    }

    pub fn last_export(&self) -> Option<&ExportReport> {
        self.last_export.as_ref()
    }

    /// Decode and add one upload. A filename that is already present is
    /// replaced in place.
    pub fn add_upload(&mut self, filename: &str, bytes: &[u8]) -> Result<(), SessionError> {
        self.require("upload images", &[Stage::Selecting])?;
        if filename.is_empty() {
            return Err(SessionError::MissingFilename);
        }

        let image = decode_image(bytes).map_err(|source| SessionError::Decode {
            filename: filename.to_string(),
            source,
        })?;
        let upload = UploadedImage {
            filename: filename.to_string(),
            byte_size: bytes.len(),
            image,
        };

        match self.uploads.iter_mut().find(|u| u.filename == filename) {
            Some(existing) => {
                tracing::debug!(filename, "Replacing upload with the same name");
                *existing = upload;
            }
            None => self.uploads.push(upload),
        }
        Ok(())
    }

    /// Add a batch of uploads. Files that fail to decode are reported and
    /// skipped; the rest of the batch is still added.
    pub fn add_uploads<'a, I>(&mut self, files: I) -> Result<Vec<UploadFailure>, SessionError>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        self.require("upload images", &[Stage::Selecting])?;

        let mut failures = Vec::new();
        for (filename, bytes) in files {
            if let Err(error) = self.add_upload(filename, bytes) {
                tracing::warn!(filename, error = %error, "Skipping upload");
                failures.push(UploadFailure {
                    filename: filename.to_string(),
                    error,
                });
            }
        }
        Ok(failures)
    }

    /// Commit the checked filenames and move to cropping.
    ///
    /// On any error the session is left exactly as it was.
    pub fn confirm_selection<S: AsRef<str>>(&mut self, chosen: &[S]) -> Result<(), SessionError> {
        self.require("confirm a selection", &[Stage::Selecting])?;

        if let Some(unknown) = chosen
            .iter()
            .map(AsRef::as_ref)
            .find(|name| self.upload(name).is_none())
        {
            return Err(SessionError::UnknownImage(unknown.to_string()));
        }

        let picked: Vec<&UploadedImage> = self
            .uploads
            .iter()
            .filter(|u| chosen.iter().any(|c| c.as_ref() == u.filename))
            .collect();
        if picked.is_empty() || picked.len() > MAX_SELECTION {
            return Err(SessionError::SelectionCount {
                count: picked.len(),
            });
        }

        let mut edits = HashMap::with_capacity(picked.len());
        let mut finalized = HashMap::with_capacity(picked.len());
        for upload in &picked {
            let edit = ImageEdit::for_image(&upload.image);
            finalized.insert(upload.filename.clone(), finalize(&upload.image, &edit)?);
            edits.insert(upload.filename.clone(), edit);
        }
        let selection: Vec<String> = picked.iter().map(|u| u.filename.clone()).collect();

        tracing::info!(count = selection.len(), "Selection confirmed");
        self.selection = selection;
        self.edits = edits;
        self.finalized = finalized;
        self.last_export = None;
        self.stage = Stage::Cropping;
        Ok(())
    }

    /// Set the crop and enhancement for one selected image and recompute
    /// its finalized image from the original upload.
    ///
    /// Editing after an export returns the session to `Cropping`, since the
    /// files on disk no longer match.
    pub fn confirm_crop(
        &mut self,
        filename: &str,
        edit: ImageEdit,
    ) -> Result<&DecodedImage, SessionError> {
        self.require("edit images", &[Stage::Cropping, Stage::Done])?;
        if !self.selection.iter().any(|s| s == filename) {
            return Err(SessionError::UnknownImage(filename.to_string()));
        }
        edit.enhancement.validate()?;

        let image = {
            let source = self
                .upload(filename)
                .ok_or_else(|| SessionError::UnknownImage(filename.to_string()))?;
            finalize(&source.image, &edit)?
        };

        self.edits.insert(filename.to_string(), edit);
        if self.stage == Stage::Done {
            self.stage = Stage::Cropping;
        }

        let slot = match self.finalized.entry(filename.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(image);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(image),
        };
        Ok(slot)
    }

    /// Write the finalized images as they are right now.
    ///
    /// On failure the stage does not change and files already written are
    /// left in place.
    pub fn confirm_export(&mut self, exporter: &Exporter) -> Result<&ExportReport, SessionError> {
        self.require("export", &[Stage::Cropping, Stage::Done])?;

        let report = match exporter.export(self.finalized()) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "Export failed");
                return Err(e.into());
            }
        };

        tracing::info!(
            files = report.files.len(),
            bundle = report.bundle.is_some(),
            "Export complete"
        );
        self.stage = Stage::Done;
        Ok(self.last_export.insert(report))
    }

    /// Start over. Files already exported stay on disk.
    pub fn reset(&mut self) {
        *self = Self::new();
        tracing::info!("Session reset");
    }

    /// Artifacts that can be downloaded right now: one per exported file
    /// that exists, then the bundle if it exists.
    ///
    /// Uploads sharing a stem share one file; the entry names the upload
    /// exported last, whose pixels are on disk.
    pub fn downloads(&self, exporter: &Exporter) -> Vec<Download> {
        let mut downloads: Vec<Download> = Vec::new();
        for (name, _) in self.finalized() {
            let file_name = output_file_name(name);
            if let Some(existing) = downloads.iter_mut().find(|d| d.file_name == file_name) {
                existing.source_name = Some(name.to_string());
            } else if exporter.artifact_exists(&file_name) {
                downloads.push(Download {
                    source_name: Some(name.to_string()),
                    file_name,
                });
            }
        }

        if exporter.options().bundle
            && !self.finalized.is_empty()
            && exporter.artifact_exists(BUNDLE_FILE_NAME)
        {
            downloads.push(Download {
                source_name: None,
                file_name: BUNDLE_FILE_NAME.to_string(),
            });
        }
        downloads
    }

    fn require(&self, action: &'static str, allowed: &[Stage]) -> Result<(), SessionError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(SessionError::WrongStage {
                action,
                stage: self.stage,
            })
        }
    }
}
