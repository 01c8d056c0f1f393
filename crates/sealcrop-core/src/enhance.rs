//! Brightness, contrast and sharpening.
//!
//! ## Order
//! 1. Brightness: `out = in * factor` per channel (blend toward black)
//! 2. Contrast: `out = mean + factor * (in - mean)`, where `mean` is the
//!    rounded average luma of the brightened image (blend toward flat gray)
//! 3. Sharpen (optional): 3x3 convolution with [`SHARPEN_KERNEL`]
//!
//! Each step rounds and saturates to 0-255. A factor of 1.0 leaves the
//! pixels untouched, so default parameters are an exact identity.

use thiserror::Error;

use crate::decode::DecodedImage;
use crate::{EnhancementParams, MAX_FACTOR, MIN_FACTOR};

/// Sharpening kernel. Weights sum to 1, so flat regions keep their value.
pub const SHARPEN_KERNEL: [[i32; 3]; 3] = [[-1, -1, -1], [-1, 9, -1], [-1, -1, -1]];

/// Invalid enhancement parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnhanceError {
    #[error("{name} factor {value} is outside {min}..={max}", min = MIN_FACTOR, max = MAX_FACTOR)]
    FactorOutOfRange { name: &'static str, value: f32 },
}

/// Apply brightness, contrast and optional sharpening to a copy of `image`.
pub fn apply_enhancement(image: &DecodedImage, params: &EnhancementParams) -> DecodedImage {
    if params.is_identity() {
        return image.clone();
    }

    let mut out = image.clone();
    adjust_brightness(&mut out.pixels, params.brightness);
    adjust_contrast(&mut out.pixels, params.contrast);

    if params.sharpen {
        out = sharpen(&out);
    }
    out
}

/// Scale every channel by `factor`.
pub fn adjust_brightness(pixels: &mut [u8], factor: f32) {
    if factor == 1.0 {
        return;
    }
    for value in pixels.iter_mut() {
        *value = to_u8(*value as f32 * factor);
    }
}

/// Push every channel away from (or toward) the image's mean luma.
pub fn adjust_contrast(pixels: &mut [u8], factor: f32) {
    if factor == 1.0 || pixels.len() < 3 {
        return;
    }
    let mean = mean_luma(pixels) as f32;
    for value in pixels.iter_mut() {
        *value = to_u8(mean + factor * (*value as f32 - mean));
    }
}

/// Convolve each channel with [`SHARPEN_KERNEL`].
///
/// Borders mirror the image without repeating the edge pixel
/// (`dcb|abcd|cba`).
pub fn sharpen(image: &DecodedImage) -> DecodedImage {
    let w = image.width as usize;
    let h = image.height as usize;
    let mut out = vec![0u8; image.pixels.len()];

    for y in 0..h {
        for x in 0..w {
            for c in 0..3 {
                let mut acc = 0i32;
                for (ky, row) in SHARPEN_KERNEL.iter().enumerate() {
                    let sy = reflect_101(y as isize + ky as isize - 1, h);
                    for (kx, weight) in row.iter().enumerate() {
                        let sx = reflect_101(x as isize + kx as isize - 1, w);
                        acc += weight * image.pixels[(sy * w + sx) * 3 + c] as i32;
                    }
                }
                out[(y * w + x) * 3 + c] = acc.clamp(0, 255) as u8;
            }
        }
    }

    DecodedImage::new(image.width, image.height, out)
}

/// Average luma (ITU-R BT.601, 16-bit fixed point), rounded.
fn mean_luma(pixels: &[u8]) -> u8 {
    let (sum, count) = pixels
        .chunks_exact(3)
        .fold((0u64, 0u64), |(sum, count), px| {
            (sum + luma(px[0], px[1], px[2]) as u64, count + 1)
        });
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64 + 0.5) as u8
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

#[inline]
fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let i = if i < 0 {
        -i
    } else if i >= len {
        2 * len - 2 - i
    } else {
        i
    };
    i as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::gradient_image;

    fn uniform(width: u32, height: u32, value: u8) -> DecodedImage {
        DecodedImage::new(width, height, vec![value; (width * height * 3) as usize])
    }

    fn params(brightness: f32, contrast: f32, sharpen: bool) -> EnhancementParams {
        EnhancementParams {
            brightness,
            contrast,
            sharpen,
        }
    }

    #[test]
    fn test_default_params_are_identity() {
        let img = gradient_image(31, 17);
        let out = apply_enhancement(&img, &EnhancementParams::default());
        assert_eq!(out, img);
    }

    #[test]
    fn test_brightness_scales_and_saturates() {
        let mut pixels = vec![0, 100, 200];
        adjust_brightness(&mut pixels, 2.0);
        assert_eq!(pixels, vec![0, 200, 255]);

        let mut pixels = vec![101, 10, 255];
        adjust_brightness(&mut pixels, 0.5);
        assert_eq!(pixels, vec![51, 5, 128]);
    }

    #[test]
    fn test_contrast_stretches_around_mean() {
        // Black + white pixel: mean luma rounds to 128
        let mut pixels = vec![0, 0, 0, 255, 255, 255];
        adjust_contrast(&mut pixels, 2.0);
        assert_eq!(pixels, vec![0, 0, 0, 255, 255, 255]);

        let mut pixels = vec![0, 0, 0, 255, 255, 255];
        adjust_contrast(&mut pixels, 0.5);
        assert_eq!(pixels, vec![64, 64, 64, 192, 192, 192]);
    }

    #[test]
    fn test_contrast_leaves_flat_gray_alone() {
        let mut img = uniform(4, 4, 90);
        adjust_contrast(&mut img.pixels, 1.7);
        assert_eq!(img, uniform(4, 4, 90));
    }

    #[test]
    fn test_mean_luma_weights() {
        assert_eq!(mean_luma(&[255, 255, 255]), 255);
        assert_eq!(mean_luma(&[0, 0, 0]), 0);
        // Green dominates luma
        assert!(mean_luma(&[0, 255, 0]) > mean_luma(&[255, 0, 0]));
        assert!(mean_luma(&[255, 0, 0]) > mean_luma(&[0, 0, 255]));
    }

    #[test]
    fn test_sharpen_flat_image_unchanged() {
        let img = uniform(5, 4, 120);
        assert_eq!(sharpen(&img), img);
    }

    #[test]
    fn test_sharpen_isolated_highlight() {
        let mut img = uniform(3, 3, 0);
        img.pixels[4 * 3..4 * 3 + 3].copy_from_slice(&[90, 90, 90]);

        let out = sharpen(&img);
        // Center: 9 * 90 saturates, neighbors: -90 saturates at 0
        assert_eq!(&out.pixels[12..15], &[255, 255, 255]);
        assert_eq!(&out.pixels[0..3], &[0, 0, 0]);
    }

    #[test]
    fn test_sharpen_edge_uses_reflection() {
        // 1x3 strip: 10 | 20 | 30 per channel
        let img = DecodedImage::new(
            3,
            1,
            vec![10, 10, 10, 20, 20, 20, 30, 30, 30],
        );
        let out = sharpen(&img);

        // Rows reflect onto themselves for a single-row image, so each tap
        // row sees the same three samples. Left pixel neighborhood: 20,10,20.
        // 3 * (-20 + -20) + (9 - 2) * 10 = -120 + 70 = -50 -> 0
        assert_eq!(out.pixels[0], 0);
        // Middle: 3 * (-10 - 30) + 7 * 20 = -120 + 140 = 20
        assert_eq!(out.pixels[3], 20);
    }

    #[test]
    fn test_sharpen_single_pixel() {
        let img = uniform(1, 1, 77);
        assert_eq!(sharpen(&img), img);
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
    }

    #[test]
    fn test_order_brightness_before_contrast() {
        let img = gradient_image(8, 8);

        let mut expected = img.clone();
        adjust_brightness(&mut expected.pixels, 1.5);
        adjust_contrast(&mut expected.pixels, 1.3);

        assert_eq!(apply_enhancement(&img, &params(1.5, 1.3, false)), expected);
    }

    #[test]
    fn test_sharpen_flag_applies_kernel_last() {
        let img = gradient_image(9, 6);
        let plain = apply_enhancement(&img, &params(1.2, 0.8, false));
        let sharp = apply_enhancement(&img, &params(1.2, 0.8, true));

        assert_eq!(sharp, sharpen(&plain));
    }

    #[test]
    fn test_error_display() {
        let err = EnhanceError::FactorOutOfRange {
            name: "brightness",
            value: 3.0,
        };
        assert_eq!(err.to_string(), "brightness factor 3 is outside 0.5..=2");
    }
}
