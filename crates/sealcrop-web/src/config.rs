//! Command line configuration for the `sealcrop` binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use sealcrop_core::export::DEFAULT_OUTPUT_DIR;
use sealcrop_core::{ExportOptions, DEFAULT_JPEG_QUALITY};

#[derive(Debug, Clone, Parser)]
#[command(name = "sealcrop", version, about = "Select, crop and enhance photos in the browser")]
pub struct Config {
    /// Address the web page is served on.
    #[arg(long, default_value = "127.0.0.1:8501")]
    pub bind: SocketAddr,

    /// Directory exported images are written to.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// JPEG quality for exported images (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: u8,

    /// Skip building cropped_images.zip after each export.
    #[arg(long = "no-bundle", action = ArgAction::SetFalse)]
    pub bundle: bool,

    /// Largest accepted upload request, in megabytes.
    #[arg(long, value_name = "MB", default_value_t = 50)]
    pub max_upload_mb: usize,
}

impl Config {
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            output_dir: self.output_dir.clone(),
            jpeg_quality: self.jpeg_quality,
            bundle: self.bundle,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
