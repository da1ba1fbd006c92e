//! Blur detection by variance of the Laplacian.
//!
//! The 3x3 Laplacian kernel
//!
//! ```text
//! 0  1  0
//! 1 -4  1
//! 0  1  0
//! ```
//!
//! responds strongly to edges and barely at all to smooth gradients, so the
//! variance of its response over the whole luminance grid is a cheap proxy for
//! perceived sharpness: soft images score low, crisp ones score high.
//!
//! Borders use reflect-101 extension (`dcb|abcd|cba`), so the response grid has
//! the same dimensions as the input and a constant image scores exactly 0.

use image::GrayImage;

use crate::error::{PipelineError, PipelineResult};
use crate::math::VarianceAccumulator;
use crate::types::BlurVerdict;

use super::decode::{format_to_string, ImageDecoder};

/// Default Laplacian variance below which an image is considered blurry.
pub const DEFAULT_BLUR_THRESHOLD: f64 = 100.0;

/// Classifies image bytes as blurry or sharp.
#[derive(Debug, Clone, Copy)]
pub struct BlurAnalyzer {
    threshold: f64,
}

impl Default for BlurAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_THRESHOLD)
    }
}

impl BlurAnalyzer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Strict less-than: a score equal to the threshold is sharp.
    pub fn is_blurry(&self, score: f64) -> bool {
        score < self.threshold
    }

    /// Score and classify raw image bytes.
    ///
    /// Bytes that don't decode as an image are reported as maximally blurry
    /// (`score = 0.0`) rather than as an error.
    pub fn analyze(&self, bytes: &[u8]) -> BlurVerdict {
        let decoded = match ImageDecoder::decode_luma(bytes) {
            Ok(decoded) => decoded,
            Err(message) => {
                tracing::warn!(
                    bytes = bytes.len(),
                    "Image decode failed, treating as blurry: {message}"
                );
                return BlurVerdict {
                    is_blur: true,
                    score: 0.0,
                };
            }
        };

        let score = sharpness_score(&decoded.luma);
        tracing::debug!(
            format = %format_to_string(decoded.format),
            width = decoded.width,
            height = decoded.height,
            score,
            threshold = self.threshold,
            "Scored image sharpness"
        );

        BlurVerdict {
            is_blur: self.is_blurry(score),
            score,
        }
    }

    /// Run [`analyze`](Self::analyze) on the blocking thread pool.
    ///
    /// Decoding and convolution are CPU-bound; keeping them off the async
    /// workers stops one large image from stalling unrelated requests.
    /// The only failure is the blocking task itself dying.
    pub async fn analyze_blocking(&self, bytes: Vec<u8>) -> PipelineResult<BlurVerdict> {
        let analyzer = *self;
        tokio::task::spawn_blocking(move || analyzer.analyze(&bytes))
            .await
            .map_err(|e| PipelineError::Unexpected {
                message: format!("Blur analysis task failed: {e}"),
            })
    }
}

/// Variance of the Laplacian response over the whole grid.
///
/// The response is streamed into the accumulator one pixel at a time and
/// never materialized.
pub fn sharpness_score(luma: &GrayImage) -> f64 {
    let mut acc = VarianceAccumulator::default();
    for_each_response(luma, |lap| acc.push(lap));
    acc.population_variance()
}

/// Visit the 3x3 Laplacian response at every pixel, row-major.
pub fn for_each_response(luma: &GrayImage, mut visit: impl FnMut(i32)) {
    let (width, height) = luma.dimensions();
    let at = |x: i64, y: i64| -> i32 {
        let x = reflect_101(x, width);
        let y = reflect_101(y, height);
        i32::from(luma.get_pixel(x, y).0[0])
    };

    for y in 0..i64::from(height) {
        for x in 0..i64::from(width) {
            visit(at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4 * at(x, y));
        }
    }
}

/// Map an out-of-range coordinate back into `0..len` without repeating the edge.
///
/// A single-pixel axis has nothing to reflect onto, so it maps to itself.
fn reflect_101(i: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len == 1 {
        return 0;
    }
    let reflected = if i < 0 {
        -i
    } else if i >= len {
        2 * len - 2 - i
    } else {
        i
    };
    reflected as u32
}
