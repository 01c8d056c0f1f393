//! Synthetic images shared by the unit tests.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

use crate::decode::DecodedImage;

/// Every channel of pixel (x, y) is `(y * width + x) % 256`.
pub fn position_image(width: u32, height: u32) -> DecodedImage {
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| ((y * width + x) % 256) as u8))
        .flat_map(|v| [v, v, v])
        .collect();
    DecodedImage::new(width, height, pixels)
}

/// Horizontal red ramp, vertical green ramp, constant blue.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.saturating_sub(1).max(1)) as u8,
            (y * 255 / height.saturating_sub(1).max(1)) as u8,
            96,
        ])
    })
}

pub fn gradient_image(width: u32, height: u32) -> DecodedImage {
    DecodedImage::from_rgb_image(gradient_rgb(width, height))
}

/// Encode `img` in memory.
pub fn encoded(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format)
        .expect("in-memory encode");
    cursor.into_inner()
}

/// A gradient PNG upload.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encoded(&gradient_rgb(width, height), ImageFormat::Png)
}
