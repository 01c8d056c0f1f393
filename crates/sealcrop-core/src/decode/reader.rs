//! JPEG/PNG decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// Decode an uploaded photo, applying EXIF orientation correction.
///
/// The format is sniffed from the content, not the filename. Only JPEG
/// and PNG are accepted.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFormat` for recognizable non-JPEG/PNG
/// data and `DecodeError::CorruptedFile` for anything that fails to decode.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    match reader.format() {
        Some(ImageFormat::Jpeg) | Some(ImageFormat::Png) => {}
        Some(other) => return Err(DecodeError::UnsupportedFormat(format!("{:?}", other))),
        None => {
            return Err(DecodeError::CorruptedFile(
                "unrecognized image data".to_string(),
            ))
        }
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = apply_orientation(img, extract_orientation(bytes));
    Ok(DecodedImage::from_rgb_image(oriented.into_rgb8()))
}

/// Extract EXIF orientation value from image bytes.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

/// Returns `Orientation::Normal` when there is no usable EXIF data.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return Orientation::Normal;
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encoded, gradient_rgb};

    #[test]
    fn test_decode_png() {
        let bytes = encoded(&gradient_rgb(7, 5), ImageFormat::Png);
        let img = decode_image(&bytes).unwrap();

        assert_eq!(img.dimensions(), (7, 5));
        assert_eq!(img.pixels.len(), 7 * 5 * 3);
        // PNG is lossless
        assert_eq!(img.pixels, gradient_rgb(7, 5).into_raw());
    }

    #[test]
    fn test_decode_jpeg() {
        let bytes = encoded(&gradient_rgb(16, 8), ImageFormat::Jpeg);
        let img = decode_image(&bytes).unwrap();

        assert_eq!(img.dimensions(), (16, 8));
    }

    #[test]
    fn test_decode_ignores_filename_extension() {
        // Content decides, so a PNG named "photo.jpg" still decodes
        let bytes = encoded(&gradient_rgb(3, 3), ImageFormat::Png);
        assert!(decode_image(&bytes).is_ok());
    }

    #[test]
    fn test_decode_rejects_gif() {
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
        match decode_image(gif) {
            Err(DecodeError::UnsupportedFormat(name)) => assert_eq!(name, "Gif"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_garbage() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(decode_image(&[]).is_err());
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = encoded(&gradient_rgb(20, 20), ImageFormat::Png);
        let result = decode_image(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_orientation_without_exif() {
        let bytes = encoded(&gradient_rgb(4, 4), ImageFormat::Jpeg);
        assert_eq!(get_orientation(&bytes), Orientation::Normal);
        assert_eq!(get_orientation(&[0x00, 0x01]), Orientation::Normal);
    }

    fn two_pixel_strip() -> DynamicImage {
        let pixels = vec![
            255, 0, 0, // left: red
            0, 255, 0, // right: green
        ];
        DynamicImage::ImageRgb8(image::RgbImage::from_raw(2, 1, pixels).unwrap())
    }

    #[test]
    fn test_apply_orientation_rotate90_swaps_dimensions() {
        let result = apply_orientation(two_pixel_strip(), Orientation::Rotate90CW).into_rgb8();
        assert_eq!(result.dimensions(), (1, 2));
        // Left pixel ends up on top after a clockwise quarter turn
        assert_eq!(result.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let result =
            apply_orientation(two_pixel_strip(), Orientation::FlipHorizontal).into_rgb8();
        assert_eq!(result.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(result.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_normal_is_noop() {
        let result = apply_orientation(two_pixel_strip(), Orientation::Normal).into_rgb8();
        assert_eq!(result.into_raw(), vec![255, 0, 0, 0, 255, 0]);
    }
}
