//! Anthropic provider using the Messages API.
//!
//! Sends the prompt plus an image block whose source is the original URL.

use super::provider::{Description, DescriptionProvider, DescriptionRequest};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic provider using the Messages API.
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: ANTHROPIC_ENDPOINT.to_string(),
            timeout,
        }
    }

    fn build_body(&self, request: &DescriptionRequest) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: Some(request.temperature),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "url".to_string(),
                            url: request.image_url.clone(),
                        },
                    },
                    ContentBlock::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "image")]
    Image { source: ImageSource },
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
    model: String,
    usage: Usage,
}

#[derive(Deserialize)]
struct ResponseContent {
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl DescriptionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, request: &DescriptionRequest) -> Result<Description, PipelineError> {
        let start = Instant::now();
        let body = self.build_body(request);

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| PipelineError::Llm {
                message: format!("Anthropic request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Llm {
                message: format!("Anthropic HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let messages_resp: MessagesResponse =
            resp.json().await.map_err(|e| PipelineError::Llm {
                message: format!("Failed to parse Anthropic response: {e}"),
                status_code: None,
            })?;

        let text = messages_resp
            .content
            .into_iter()
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(PipelineError::Llm {
                message: "Anthropic returned no text content".to_string(),
                status_code: None,
            });
        }

        Ok(Description {
            text,
            model: messages_resp.model,
            tokens_used: Some(messages_resp.usage.input_tokens + messages_resp.usage.output_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::serve_once;

    fn provider_at(endpoint: &str) -> AnthropicProvider {
        AnthropicProvider {
            endpoint: endpoint.to_string(),
            ..AnthropicProvider::new("key", "claude-test", Duration::from_secs(5))
        }
    }

    #[test]
    fn test_body_uses_url_image_source() {
        let request = DescriptionRequest::describe_url("https://example.com/cat.png", 200);
        let body =
            serde_json::to_value(provider_at(ANTHROPIC_ENDPOINT).build_body(&request)).unwrap();

        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "url");
        assert_eq!(content[0]["source"]["url"], "https://example.com/cat.png");
        assert_eq!(content[1]["type"], "text");
        assert_eq!(body["max_tokens"], 200);
    }

    #[tokio::test]
    async fn test_generate_joins_text_blocks() {
        let body = br#"{"model":"claude-test","content":[{"type":"text","text":"A cat "},{"type":"text","text":"asleep."}],"usage":{"input_tokens":10,"output_tokens":5}}"#;
        let endpoint = serve_once("200 OK", "application/json", body.to_vec()).await;
        let request = DescriptionRequest::describe_url("https://example.com/cat.png", 200);

        let description = provider_at(&endpoint).generate(&request).await.unwrap();
        assert_eq!(description.text, "A cat asleep.");
        assert_eq!(description.tokens_used, Some(15));
    }

    #[tokio::test]
    async fn test_generate_http_error() {
        let endpoint = serve_once("401 Unauthorized", "application/json", b"{}".to_vec()).await;
        let request = DescriptionRequest::describe_url("https://example.com/cat.png", 200);

        let err = provider_at(&endpoint).generate(&request).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Llm {
                status_code: Some(401),
                ..
            }
        ));
    }
}
