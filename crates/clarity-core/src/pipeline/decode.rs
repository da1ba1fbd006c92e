//! Image decoding with content-based format detection.

use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, Luma};
use std::io::Cursor;

/// Result of decoding an image to luminance.
pub struct DecodedImage {
    /// Single-channel 8-bit luminance grid
    pub luma: GrayImage,
    /// Format detected from the leading bytes
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

/// Decodes fetched bytes into a luminance grid.
pub struct ImageDecoder;

impl ImageDecoder {
    /// Decode raw bytes into a luminance grid.
    ///
    /// The declared content type of the response is never consulted; the
    /// format is sniffed from the bytes themselves. Returns the decoder's
    /// error message on failure so callers can log it.
    pub fn decode_luma(bytes: &[u8]) -> Result<DecodedImage, String> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| format!("Cannot detect image format: {e}"))?;
        let format = reader
            .format()
            .ok_or_else(|| "Unrecognized image format".to_string())?;
        let image = reader.decode().map_err(|e| e.to_string())?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            luma: to_luma_bt601(image),
            format,
            width,
            height,
        })
    }
}

/// Collapse any decoded image to 8-bit luminance with BT.601 weights.
///
/// Alpha is dropped, not composited. 16-bit samples keep their high byte.
pub fn to_luma_bt601(image: DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray,
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => {
            let rgb = image.into_rgb16();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                Luma([bt601((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8)])
            })
        }
        other => {
            let rgb = other.into_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                Luma([bt601(r, g, b)])
            })
        }
    }
}

/// Y = 0.299 R + 0.587 G + 0.114 B in 14-bit fixed point, rounded half up.
///
/// The weights sum to exactly 1 << 14, so grey input maps to itself.
fn bt601(r: u8, g: u8, b: u8) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    const SHIFT: u32 = 14;
    let y = u32::from(r) * R + u32::from(g) * G + u32::from(b) * B + (1 << (SHIFT - 1));
    (y >> SHIFT) as u8
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}
