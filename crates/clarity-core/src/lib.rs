//! Clarity Core - image triage library.
//!
//! Given an image URL, Clarity decides whether the image is too blurry to be
//! worth describing and, if it isn't, asks a vision model for a description.
//!
//! # Architecture
//!
//! ```text
//! URL → Fetch → Decode → Laplacian variance → blurry? ─yes─► result
//!                                                 │
//!                                                 no
//!                                                 ▼
//!                                      Describe (LLM, with fallback) → result
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use clarity_core::{Clarity, Config};
//!
//! #[tokio::main]
//! async fn main() -> clarity_core::Result<()> {
//!     let clarity = Clarity::new(Config::load()?)?;
//!     let result = clarity.triage("https://example.com/photo.jpg").await;
//!     println!("{result:?}");
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod math;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ClarityError, ConfigError, PipelineError, PipelineResult, Result};
pub use llm::{Describer, FALLBACK_DESCRIPTION};
pub use pipeline::{BlurAnalyzer, TriageProcessor};
pub use types::{AnalysisRequest, AnalysisResult, BlurVerdict, BLURRY_DESCRIPTION};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Clarity service - the main entry point for triage.
pub struct Clarity {
    config: Config,
    processor: TriageProcessor,
}

impl Clarity {
    /// Create a new Clarity instance with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing Clarity v{}", VERSION);
        let processor = TriageProcessor::new(&config)?;
        Ok(Self { config, processor })
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn processor(&self) -> &TriageProcessor {
        &self.processor
    }

    /// Triage one image URL. Never fails; errors are reported in the result.
    pub async fn triage(&self, url: &str) -> AnalysisResult {
        self.processor.triage(url).await
    }
}
