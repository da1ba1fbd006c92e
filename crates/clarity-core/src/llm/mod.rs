//! LLM integration for image description.
//!
//! Provides a provider abstraction over vision-model backends (OpenAI,
//! Anthropic, any OpenAI-compatible endpoint) and the describer that turns
//! provider failures into fallback text.

pub(crate) mod anthropic;
pub(crate) mod compatible;
pub(crate) mod describer;
pub(crate) mod openai;
pub(crate) mod provider;

pub use describer::{resolve_description, DescribeOptions, Describer, FALLBACK_DESCRIPTION};
pub use provider::{
    Description, DescriptionProvider, DescriptionRequest, ProviderFactory, UnavailableProvider,
    DESCRIBE_PROMPT,
};
