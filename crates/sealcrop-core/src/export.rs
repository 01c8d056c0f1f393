//! Writing finalized images to disk.
//!
//! Every finalized image becomes `<output_dir>/<stem>_cropped.jpg`. In
//! bundle mode a `cropped_images.zip` is rebuilt afterwards from **every**
//! `*_cropped.jpg` found in the output directory, including files left by
//! earlier exports. Nothing is ever deleted; re-exporting overwrites
//! same-named files.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::decode::DecodedImage;
use crate::encode::{encode_image, EncodeError, DEFAULT_JPEG_QUALITY};

pub const DEFAULT_OUTPUT_DIR: &str = "cropped_images";
pub const BUNDLE_FILE_NAME: &str = "cropped_images.zip";
pub const CROPPED_SUFFIX: &str = "_cropped.jpg";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: EncodeError,
    },

    #[error("Failed to build bundle {}: {source}", .path.display())]
    Bundle {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("Not an export artifact: {0}")]
    InvalidName(String),

    #[error("Artifact not found: {}", .path.display())]
    NotFound { path: PathBuf },
}

/// Where and how exports are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub jpeg_quality: u8,
    /// Also build the zip bundle after writing the individual files.
    pub bundle: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            bundle: true,
        }
    }
}

/// One written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedFile {
    /// Upload filename the image came from.
    pub source_name: String,
    /// Name inside the output directory.
    pub file_name: String,
    pub path: PathBuf,
}

/// Result of a successful export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub files: Vec<ExportedFile>,
    pub bundle: Option<PathBuf>,
}

/// Output file name for an uploaded filename: directory components and
/// the extension are dropped, `_cropped.jpg` is appended.
pub fn output_file_name(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "..")
        .unwrap_or("image");
    format!("{stem}{CROPPED_SUFFIX}")
}

/// Matches the `*_cropped.jpg` pattern (hidden files excluded).
pub fn is_cropped_artifact(file_name: &str) -> bool {
    file_name.ends_with(CROPPED_SUFFIX) && !file_name.starts_with('.')
}

#[derive(Debug, Clone)]
pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn output_dir(&self) -> &Path {
        &self.options.output_dir
    }

    /// Path of the file an upload exports to.
    pub fn output_path(&self, source_name: &str) -> PathBuf {
        self.options.output_dir.join(output_file_name(source_name))
    }

    /// Write `images` (upload filename, finalized image) and, in bundle
    /// mode, rebuild the zip.
    ///
    /// Stops at the first failure; files already written stay on disk.
    pub fn export<'a, I>(&self, images: I) -> Result<ExportReport, ExportError>
    where
        I: IntoIterator<Item = (&'a str, &'a DecodedImage)>,
    {
        let dir = &self.options.output_dir;
        fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let mut report = ExportReport::default();
        for (source_name, image) in images {
            let file_name = output_file_name(source_name);
            let path = dir.join(&file_name);

            let bytes = encode_image(image, self.options.jpeg_quality).map_err(|source| {
                ExportError::Encode {
                    name: source_name.to_string(),
                    source,
                }
            })?;
            fs::write(&path, bytes).map_err(|source| ExportError::Write {
                path: path.clone(),
                source,
            })?;

            tracing::info!(source = source_name, path = %path.display(), "Saved cropped image");
            report.files.push(ExportedFile {
                source_name: source_name.to_string(),
                file_name,
                path,
            });
        }

        if self.options.bundle {
            report.bundle = Some(create_bundle(dir)?);
        }

        Ok(report)
    }

    /// Resolve a download name to a path inside the output directory.
    ///
    /// Only bare `*_cropped.jpg` names and the bundle name are accepted.
    pub fn artifact_path(&self, file_name: &str) -> Result<PathBuf, ExportError> {
        let is_bare = Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name)
            && !file_name.contains(['/', '\\']);
        if !is_bare || !(file_name == BUNDLE_FILE_NAME || is_cropped_artifact(file_name)) {
            return Err(ExportError::InvalidName(file_name.to_string()));
        }
        Ok(self.options.output_dir.join(file_name))
    }

    /// True while the named artifact exists on disk.
    pub fn artifact_exists(&self, file_name: &str) -> bool {
        self.artifact_path(file_name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Read an artifact for download.
    pub fn read_artifact(&self, file_name: &str) -> Result<Vec<u8>, ExportError> {
        let path = self.artifact_path(file_name)?;
        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ExportError::NotFound { path: path.clone() },
            _ => ExportError::Read {
                path: path.clone(),
                source,
            },
        })
    }
}

/// Build `<dir>/cropped_images.zip` from every `*_cropped.jpg` in `dir`.
///
/// Entries are flat (bare file names), deflate-compressed and sorted by
/// name, so the archive content does not depend on directory order.
pub fn create_bundle(dir: &Path) -> Result<PathBuf, ExportError> {
    let names = list_artifacts(dir)?;
    let path = dir.join(BUNDLE_FILE_NAME);

    let bundle_err = |source: ZipError| ExportError::Bundle {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for name in &names {
        let entry_path = dir.join(name);
        let data = fs::read(&entry_path).map_err(|source| ExportError::Read {
            path: entry_path,
            source,
        })?;
        zip.start_file(name.as_str(), options).map_err(bundle_err)?;
        zip.write_all(&data)
            .map_err(|e| bundle_err(ZipError::from(e)))?;
    }
    zip.finish().map_err(bundle_err)?;

    tracing::info!(path = %path.display(), entries = names.len(), "Wrote bundle");
    Ok(path)
}

/// Sorted `*_cropped.jpg` file names directly inside `dir`.
fn list_artifacts(dir: &Path) -> Result<Vec<String>, ExportError> {
    let read_err = |source: io::Error| ExportError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.file_type().map_err(read_err)?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_cropped_artifact(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
