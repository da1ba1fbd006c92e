//! Triage pipeline components.
//!
//! - **fetch**: Retrieve image bytes from a URL
//! - **decode**: Sniff the format and decode to luminance
//! - **blur**: Laplacian-variance sharpness score and blur verdict
//! - **processor**: Orchestrates fetch → analyze → describe

pub mod blur;
pub mod decode;
pub mod fetch;
pub mod processor;

// Re-exports for convenient access
pub use blur::{sharpness_score, BlurAnalyzer, DEFAULT_BLUR_THRESHOLD};
pub use decode::{DecodedImage, ImageDecoder};
pub use fetch::{HttpFetcher, ImageSource};
pub use processor::{TriageProcessor, TriageStage};
