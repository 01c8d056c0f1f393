//! Rectangular cropping in source pixel coordinates.
//!
//! A [`CropRegion`] built through [`CropRegion::clamped`] or
//! [`CropRegion::from_normalized`] always lies inside the image it was
//! clamped against. [`apply_crop`] never pads or wraps: a region that does
//! not fit is reported as a [`CropError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodedImage;

/// Errors from cropping. These indicate a region that skipped clamping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CropError {
    #[error("Crop region {region} does not fit inside the {width}x{height} image")]
    OutOfBounds {
        region: CropRegion,
        width: u32,
        height: u32,
    },
}

/// Crop rectangle, origin at the top-left corner of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Region covering the whole image (the default when the user never drags).
    pub fn full(image_width: u32, image_height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: image_width,
            height: image_height,
        }
    }

    /// Build a region from raw pointer input in pixels.
    ///
    /// Values are rounded, the origin is clamped into the image, the size
    /// is clipped at the right/bottom edges, and the result is at least 1x1.
    /// Non-finite values count as 0.
    pub fn clamped(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let (x, width) = clamp_axis(x, width, image_width);
        let (y, height) = clamp_axis(y, height, image_height);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a region from coordinates normalized to 0.0..=1.0 of the
    /// image dimensions, clamped like [`CropRegion::clamped`].
    pub fn from_normalized(
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let w = image_width as f64;
        let h = image_height as f64;
        Self::clamped(
            left.clamp(0.0, 1.0) * w,
            top.clamp(0.0, 1.0) * h,
            width.clamp(0.0, 1.0) * w,
            height.clamp(0.0, 1.0) * h,
            image_width,
            image_height,
        )
    }

    /// True if the region is non-empty and inside a `width x height` image.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }

    /// True if the region covers the whole `width x height` image.
    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Clamp one axis: returns `(start, length)`.
fn clamp_axis(start: f64, length: f64, limit: u32) -> (u32, u32) {
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };

    let start = finite(start).round().max(0.0).min(limit as f64) as u32;
    let start = start.min(limit.saturating_sub(1));
    let length = finite(length).round().max(0.0).min(limit as f64) as u32;
    let end = start.saturating_add(length).min(limit);

    (start, end.saturating_sub(start).max(1))
}

/// Cut `region` out of `image`.
///
/// # Errors
///
/// Returns `CropError::OutOfBounds` if the region is empty or extends past
/// the image edges.
pub fn apply_crop(image: &DecodedImage, region: &CropRegion) -> Result<DecodedImage, CropError> {
    if !region.fits(image.width, image.height) {
        return Err(CropError::OutOfBounds {
            region: *region,
            width: image.width,
            height: image.height,
        });
    }

    if region.is_full(image.width, image.height) {
        return Ok(image.clone());
    }

    let src_stride = image.width as usize * 3;
    let row_len = region.width as usize * 3;
    let mut pixels = Vec::with_capacity(row_len * region.height as usize);

    for y in region.y..region.y + region.height {
        let start = y as usize * src_stride + region.x as usize * 3;
        pixels.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    Ok(DecodedImage::new(region.width, region.height, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::position_image;

    #[test]
    fn test_full_crop_is_identity() {
        let img = position_image(50, 40);
        let result = apply_crop(&img, &CropRegion::full(50, 40)).unwrap();

        assert_eq!(result, img);
    }

    #[test]
    fn test_center_crop_pixels() {
        let img = position_image(10, 10);
        let region = CropRegion {
            x: 2,
            y: 3,
            width: 4,
            height: 5,
        };
        let result = apply_crop(&img, &region).unwrap();

        assert_eq!(result.dimensions(), (4, 5));
        // First pixel comes from (2, 3): 3 * 10 + 2
        assert_eq!(&result.pixels[0..3], &[32, 32, 32]);
        // Last pixel comes from (5, 7): 7 * 10 + 5
        let n = result.pixels.len();
        assert_eq!(&result.pixels[n - 3..], &[75, 75, 75]);
    }

    #[test]
    fn test_crop_touching_bottom_right_edge() {
        let img = position_image(10, 10);
        let region = CropRegion {
            x: 7,
            y: 8,
            width: 3,
            height: 2,
        };
        let result = apply_crop(&img, &region).unwrap();
        assert_eq!(result.dimensions(), (3, 2));
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let img = position_image(10, 10);
        let region = CropRegion {
            x: 8,
            y: 0,
            width: 3,
            height: 2,
        };

        assert_eq!(
            apply_crop(&img, &region),
            Err(CropError::OutOfBounds {
                region,
                width: 10,
                height: 10
            })
        );
    }

    #[test]
    fn test_empty_region_is_an_error() {
        let img = position_image(10, 10);
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 0,
            height: 4,
        };
        assert!(apply_crop(&img, &region).is_err());
    }

    #[test]
    fn test_clamped_negative_origin() {
        let region = CropRegion::clamped(-15.0, -3.2, 40.0, 20.0, 100, 80);
        assert_eq!(
            region,
            CropRegion {
                x: 0,
                y: 0,
                width: 40,
                height: 20
            }
        );
    }

    #[test]
    fn test_clamped_clips_at_far_edge() {
        let region = CropRegion::clamped(90.0, 70.0, 50.0, 50.0, 100, 80);
        assert_eq!(
            region,
            CropRegion {
                x: 90,
                y: 70,
                width: 10,
                height: 10
            }
        );
    }

    #[test]
    fn test_clamped_origin_past_edge_keeps_one_pixel() {
        let region = CropRegion::clamped(500.0, 500.0, 10.0, 10.0, 100, 80);
        assert_eq!(
            region,
            CropRegion {
                x: 99,
                y: 79,
                width: 1,
                height: 1
            }
        );
        assert!(region.fits(100, 80));
    }

    #[test]
    fn test_clamped_non_finite_input() {
        let region = CropRegion::clamped(f64::NAN, f64::INFINITY, f64::NAN, 5.0, 20, 20);
        assert!(region.fits(20, 20));
        assert_eq!(region.x, 0);
        assert_eq!(region.width, 1);
    }

    #[test]
    fn test_from_normalized_center() {
        let region = CropRegion::from_normalized(0.25, 0.25, 0.5, 0.5, 100, 60);
        assert_eq!(
            region,
            CropRegion {
                x: 25,
                y: 15,
                width: 50,
                height: 30
            }
        );
    }

    #[test]
    fn test_from_normalized_oversized_is_full() {
        let region = CropRegion::from_normalized(-0.5, 0.0, 1.5, 2.0, 64, 48);
        assert!(region.is_full(64, 48));
    }

    #[test]
    fn test_display() {
        let region = CropRegion {
            x: 1,
            y: 2,
            width: 3,
            height: 4,
        };
        assert_eq!(region.to_string(), "3x4+1+2");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::test_support::position_image;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=60, 1u32..=60)
    }

    fn raw_input_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
        (
            -100.0f64..=200.0,
            -100.0f64..=200.0,
            -50.0f64..=300.0,
            -50.0f64..=300.0,
        )
    }

    proptest! {
        /// Property: clamping always yields a region that fits.
        #[test]
        fn prop_clamped_region_fits(
            (width, height) in dimensions_strategy(),
            (x, y, w, h) in raw_input_strategy(),
        ) {
            let region = CropRegion::clamped(x, y, w, h, width, height);
            prop_assert!(region.fits(width, height), "{} vs {}x{}", region, width, height);
        }

        /// Property: cropping a clamped region succeeds with matching size.
        #[test]
        fn prop_crop_matches_region(
            (width, height) in dimensions_strategy(),
            (x, y, w, h) in raw_input_strategy(),
        ) {
            let img = position_image(width, height);
            let region = CropRegion::clamped(x, y, w, h, width, height);
            let result = apply_crop(&img, &region).unwrap();

            prop_assert_eq!(result.dimensions(), (region.width, region.height));
            prop_assert_eq!(
                result.pixels.len(),
                (region.width * region.height * 3) as usize
            );
        }

        /// Property: every cropped pixel equals the source pixel it maps to.
        #[test]
        fn prop_crop_copies_source_pixels(
            (width, height) in (2u32..=40, 2u32..=40),
            (x, y, w, h) in raw_input_strategy(),
        ) {
            let img = position_image(width, height);
            let region = CropRegion::clamped(x, y, w, h, width, height);
            let result = apply_crop(&img, &region).unwrap();

            for cy in 0..result.height {
                for cx in 0..result.width {
                    let dst = ((cy * result.width + cx) * 3) as usize;
                    let src = (((cy + region.y) * width + cx + region.x) * 3) as usize;
                    prop_assert_eq!(&result.pixels[dst..dst + 3], &img.pixels[src..src + 3]);
                }
            }
        }

        /// Property: normalized input never escapes the image either.
        #[test]
        fn prop_normalized_region_fits(
            (width, height) in dimensions_strategy(),
            (l, t, w, h) in (-1.0f64..=2.0, -1.0f64..=2.0, -1.0f64..=2.0, -1.0f64..=2.0),
        ) {
            let region = CropRegion::from_normalized(l, t, w, h, width, height);
            prop_assert!(region.fits(width, height));
        }
    }
}
