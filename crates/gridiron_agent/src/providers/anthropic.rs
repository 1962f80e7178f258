//! Anthropic Messages API provider. The shared transcript already matches
//! this wire format, so translation is a straight serialization.

use crate::api_types::{ContentBlock, Message, MessagesRequest, MessagesResponse, Tool};
use crate::llm::{CompletionParams, LlmClient};
use crate::providers::{http_retryable, ApiStatusError};
use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use reqwest::Client;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(model: &str, base_url: Option<&str>) -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY").unwrap_or_else(|_| "mock".to_string());
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| env::var("ANTHROPIC_BASE_URL").ok())
            .unwrap_or_else(|| "https://api.anthropic.com".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            api_key,
            base_url,
            model: model.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    #[tracing::instrument(skip(self, system, messages, tools, params), fields(model = %self.model))]
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        tools: Vec<Tool>,
        params: CompletionParams,
    ) -> Result<MessagesResponse> {
        if self.api_key == "mock" {
            // Mock delay to simulate network
            tokio::time::sleep(Duration::from_millis(500)).await;
            return Ok(MessagesResponse {
                content: vec![ContentBlock::Text {
                    text: "(Mock Response) I received your prompt.".to_string(),
                }],
                stop_reason: Some("end_turn".to_string()),
                usage: None,
            });
        }

        let url = format!("{}/v1/messages", self.base_url);
        let request_body = MessagesRequest {
            model: self.model.clone(),
            system: Some(system.to_string()),
            messages,
            max_tokens: params.max_tokens,
            temperature: Some(params.temperature),
            tools,
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            // At least log tool definitions so we can diagnose schema issues
            let tools_json = serde_json::to_string(&request_body.tools).unwrap_or_default();
            tracing::debug!(
                "Anthropic tools payload ({}): {}",
                request_body.tools.len(),
                tools_json
            );
        }

        let retry_config = RetryConfig::default();
        let response = with_retry(&retry_config, "Anthropic", http_retryable, || async {
            let resp = self
                .client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&request_body)
                .send()
                .await
                .map_err(anyhow::Error::from)?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApiStatusError {
                    provider: "Anthropic",
                    status,
                    body,
                }
                .into());
            }
            Ok(resp)
        })
        .await?;

        let resp_text = response.text().await?;
        tracing::debug!(
            "Anthropic raw response (first 2000 chars): {}",
            &resp_text[..resp_text.len().min(2000)]
        );
        let api_response: MessagesResponse =
            serde_json::from_str(&resp_text).context("Failed to parse Anthropic response")?;
        Ok(api_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_types::Role;

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{
            "content": [
                {"type": "text", "text": "Checking the waiver wire."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_waiver_wire", "input": {"position": "RB"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 900, "output_tokens": 40}
        }"#;
        let resp: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.content.len(), 2);
        assert!(matches!(
            &resp.content[1],
            ContentBlock::ToolUse { name, input, .. }
                if name == "get_waiver_wire" && input["position"] == "RB"
        ));
        assert_eq!(resp.usage.unwrap().input_tokens, 900);
    }

    #[test]
    fn test_request_serialization_skips_empty_tools() {
        let request = MessagesRequest {
            model: "claude-sonnet-4-5".into(),
            system: Some("analyst".into()),
            messages: vec![Message {
                role: Role::User,
                content: vec![ContentBlock::Text {
                    text: "hi".into(),
                }],
            }],
            max_tokens: 1024,
            temperature: Some(0.7),
            tools: vec![],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert_eq!(value["system"], "analyst");
    }
}
