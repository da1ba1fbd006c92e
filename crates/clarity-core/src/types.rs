//! Core data types for the triage pipeline.
//!
//! `AnalysisResult` is the wire shape returned to callers: a `status` tag plus
//! either the success fields or an error message, never both.

use serde::{Deserialize, Serialize};

/// Description attached to every blurry verdict.
pub const BLURRY_DESCRIPTION: &str = "Image is too blurry to be described.";

/// A single triage request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Image location. Not validated beyond what the HTTP client does.
    pub url: String,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Output of the blur analyzer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurVerdict {
    /// Whether the score fell strictly below the threshold
    pub is_blur: bool,
    /// Variance of the Laplacian response; higher is sharper
    pub score: f64,
}

/// The structured outcome of one triage call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisResult {
    Success {
        is_blur: bool,
        blur_score: f64,
        description: String,
    },
    Error {
        message: String,
    },
}

impl AnalysisResult {
    /// Result for an image whose score fell below the threshold.
    pub fn blurry(score: f64) -> Self {
        AnalysisResult::Success {
            is_blur: true,
            blur_score: score,
            description: BLURRY_DESCRIPTION.to_string(),
        }
    }

    /// Result for a sharp image with its (real or fallback) description.
    pub fn sharp(score: f64, description: impl Into<String>) -> Self {
        AnalysisResult::Success {
            is_blur: false,
            blur_score: score,
            description: description.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        AnalysisResult::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success { .. })
    }

    /// The blur flag, if this is a success result.
    pub fn is_blur(&self) -> Option<bool> {
        match self {
            AnalysisResult::Success { is_blur, .. } => Some(*is_blur),
            AnalysisResult::Error { .. } => None,
        }
    }

    /// The sharpness score, if this is a success result.
    pub fn blur_score(&self) -> Option<f64> {
        match self {
            AnalysisResult::Success { blur_score, .. } => Some(*blur_score),
            AnalysisResult::Error { .. } => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            AnalysisResult::Success { description, .. } => Some(description),
            AnalysisResult::Error { .. } => None,
        }
    }
}
