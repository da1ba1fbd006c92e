//! Provider for any OpenAI-compatible Chat Completions endpoint.
//!
//! Delegates to `OpenAiProvider` with a custom endpoint.

use super::openai::OpenAiProvider;
use super::provider::{Description, DescriptionProvider, DescriptionRequest};
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::Duration;

/// Wraps an OpenAI-compatible endpoint (Hyperbolic, vLLM, LM Studio, ...).
pub struct CompatibleProvider {
    inner: OpenAiProvider,
}

impl CompatibleProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        let url = chat_completions_url(endpoint);
        Self {
            inner: OpenAiProvider::with_endpoint(api_key, model, &url, timeout),
        }
    }
}

fn chat_completions_url(endpoint: &str) -> String {
    format!("{}/chat/completions", endpoint.trim_end_matches('/'))
}

#[async_trait]
impl DescriptionProvider for CompatibleProvider {
    fn name(&self) -> &str {
        "compatible"
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn generate(&self, request: &DescriptionRequest) -> Result<Description, PipelineError> {
        self.inner.generate(request).await
    }

    fn timeout(&self) -> Duration {
        self.inner.timeout()
    }
}
