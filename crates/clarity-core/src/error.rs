//! Error types for the Clarity triage pipeline.
//!
//! Errors are organized by stage so that the message surfaced to the caller
//! names what failed (fetch, description, ...) and carries the relevant URL.
//! Only fetch-side failures ever reach an API response; description failures
//! are resolved into fallback text before that.

use thiserror::Error;

/// Top-level error type for Clarity operations.
#[derive(Error, Debug)]
pub enum ClarityError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Network failure or non-success HTTP status while fetching the image
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Response body exceeded the configured download cap
    #[error("Image at {url} exceeds the {max_mb}MB download limit")]
    BodyTooLarge { url: String, max_mb: u64 },

    /// LLM description generation failed
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        status_code: Option<u16>,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {url} after {timeout_ms}ms")]
    Timeout {
        url: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Anything not covered above (e.g. a panicked blocking task)
    #[error("Unexpected failure: {message}")]
    Unexpected { message: String },
}

/// Convenience type alias for Clarity results.
pub type Result<T> = std::result::Result<T, ClarityError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
