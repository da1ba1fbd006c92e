//! Description provider trait and request/response types.
//!
//! Defines the interface every vision-model backend implements, plus the
//! factory that builds the configured backend.

use crate::config::{LlmConfig, ProviderKind};
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::Duration;

/// Fixed instruction sent with every image.
pub const DESCRIBE_PROMPT: &str = "Describe this image content concisely.";

/// A request to describe a remote image.
#[derive(Debug, Clone)]
pub struct DescriptionRequest {
    /// URL of the image; the provider fetches it itself
    pub image_url: String,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl DescriptionRequest {
    /// Build a description request for the image at `url`.
    pub fn describe_url(url: &str, max_tokens: u32) -> Self {
        Self {
            image_url: url.to_string(),
            prompt: DESCRIBE_PROMPT.to_string(),
            max_tokens,
            temperature: 0.3,
        }
    }
}

/// The response from a description call.
#[derive(Debug, Clone)]
pub struct Description {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all description backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn DescriptionProvider>` for dynamic dispatch).
#[async_trait]
pub trait DescriptionProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai", "anthropic").
    fn name(&self) -> &str;

    /// Check whether the provider is configured.
    async fn is_available(&self) -> bool;

    /// Generate a description for the given request.
    async fn generate(&self, request: &DescriptionRequest) -> Result<Description, PipelineError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Provider that always fails.
///
/// Stands in when descriptions are disabled or the configured backend could
/// not be built, so sharp images still get the fallback text.
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DescriptionProvider for UnavailableProvider {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn generate(&self, _request: &DescriptionRequest) -> Result<Description, PipelineError> {
        Err(PipelineError::Llm {
            message: self.reason.clone(),
            status_code: None,
        })
    }

    fn timeout(&self) -> Duration {
        Duration::ZERO
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the configured provider.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider from the LLM config section.
    ///
    /// `model_override` replaces the configured model name when given.
    pub fn create(
        config: &LlmConfig,
        model_override: Option<&str>,
    ) -> Result<Box<dyn DescriptionProvider>, PipelineError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        match config.provider {
            ProviderKind::Openai => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| PipelineError::Llm {
                    message: "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                    status_code: None,
                })?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &api_key, &model, timeout,
                )))
            }
            ProviderKind::Anthropic => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| PipelineError::Llm {
                    message: "Anthropic API key not set. Set ANTHROPIC_API_KEY env var."
                        .to_string(),
                    status_code: None,
                })?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::anthropic::AnthropicProvider::new(
                    &api_key, &model, timeout,
                )))
            }
            ProviderKind::Compatible => {
                let cfg = config.compatible.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| PipelineError::Llm {
                    message: format!(
                        "API key for compatible endpoint {} not set.",
                        cfg.endpoint
                    ),
                    status_code: None,
                })?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::compatible::CompatibleProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &model,
                    timeout,
                )))
            }
            ProviderKind::None => Ok(Box::new(UnavailableProvider::new(
                "Descriptions are disabled (llm.provider = \"none\")",
            ))),
        }
    }

    /// Like [`create`](Self::create), but never fails.
    ///
    /// A backend that can't be built is logged and replaced with an
    /// [`UnavailableProvider`] so the service degrades to fallback text.
    pub fn create_or_unavailable(
        config: &LlmConfig,
        model_override: Option<&str>,
    ) -> Box<dyn DescriptionProvider> {
        match Self::create(config, model_override) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(
                    provider = %config.provider,
                    "Description provider unavailable, using fallback text: {e}"
                );
                Box::new(UnavailableProvider::new(e.to_string()))
            }
        }
    }
}
