//! Description step with a degrade-don't-fail contract.
//!
//! `try_describe` returns the provider's typed result; `describe` resolves
//! that result into display text, substituting [`FALLBACK_DESCRIPTION`] for
//! any failure. Callers of `describe` never see an error.

use super::provider::{Description, DescriptionProvider, DescriptionRequest};
use crate::config::LlmConfig;
use crate::error::PipelineError;
use std::sync::Arc;
use std::time::Duration;

/// Text returned for a sharp image when no description could be obtained.
pub const FALLBACK_DESCRIPTION: &str =
    "Image is sharp, but a description is currently unavailable.";

/// Options for the description step.
#[derive(Debug, Clone)]
pub struct DescribeOptions {
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum tokens to request
    pub max_tokens: u32,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_tokens: 300,
        }
    }
}

impl From<&LlmConfig> for DescribeOptions {
    fn from(config: &LlmConfig) -> Self {
        Self {
            timeout_ms: config.timeout_ms,
            max_tokens: config.max_tokens,
        }
    }
}

/// Obtains descriptions for sharp images.
pub struct Describer {
    provider: Arc<dyn DescriptionProvider>,
    options: DescribeOptions,
}

impl Describer {
    pub fn new(provider: Box<dyn DescriptionProvider>, options: DescribeOptions) -> Self {
        Self {
            provider: Arc::from(provider),
            options,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn provider_available(&self) -> bool {
        self.provider.is_available().await
    }

    /// Ask the provider for a description. Single attempt, time-bounded.
    pub async fn try_describe(&self, url: &str) -> Result<Description, PipelineError> {
        let request = DescriptionRequest::describe_url(url, self.options.max_tokens);
        match tokio::time::timeout(
            Duration::from_millis(self.options.timeout_ms),
            self.provider.generate(&request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout {
                url: url.to_string(),
                stage: "describe".to_string(),
                timeout_ms: self.options.timeout_ms,
            }),
        }
    }

    /// Describe the image at `url`, falling back to fixed text on any failure.
    pub async fn describe(&self, url: &str) -> String {
        let result = self.try_describe(url).await;
        resolve_description(self.provider.name(), result)
    }
}

/// Map a provider result to the text shown to the caller.
pub fn resolve_description(provider: &str, result: Result<Description, PipelineError>) -> String {
    match result {
        Ok(description) => {
            tracing::debug!(
                provider,
                model = %description.model,
                latency_ms = description.latency_ms,
                tokens = ?description.tokens_used,
                "Description generated"
            );
            description.text
        }
        Err(e) => {
            tracing::warn!(provider, "Description unavailable, using fallback: {e}");
            FALLBACK_DESCRIPTION.to_string()
        }
    }
}
