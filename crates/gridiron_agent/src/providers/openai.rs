//! OpenAI Chat Completions provider.
//!
//! The shared transcript is Anthropic-shaped; everything OpenAI-specific
//! (system message placement, stringified tool arguments, `tool` role
//! results) is translated here and nowhere else.

use crate::api_types::{ContentBlock, Message, MessagesResponse, Role, Tool, Usage};
use crate::llm::{CompletionParams, LlmClient};
use crate::providers::{http_retryable, ApiStatusError};
use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(model: &str, base_url: Option<&str>) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| "mock".to_string());
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
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
impl LlmClient for OpenAiClient {
    #[tracing::instrument(skip(self, system, messages, tools, params), fields(model = %self.model))]
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        tools: Vec<Tool>,
        params: CompletionParams,
    ) -> Result<MessagesResponse> {
        if self.api_key == "mock" {
            tokio::time::sleep(Duration::from_millis(500)).await;
            return Ok(MessagesResponse {
                content: vec![ContentBlock::Text {
                    text: "(Mock OpenAI Response) I received your prompt.".to_string(),
                }],
                stop_reason: Some("stop".to_string()),
                usage: None,
            });
        }

        let payload = build_request(&self.model, system, &messages, &tools, &params);
        let url = format!("{}/chat/completions", self.base_url);

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                "OpenAI tools payload ({}): {}",
                tools.len(),
                serde_json::to_string(&payload["tools"]).unwrap_or_default()
            );
        }

        let retry_config = RetryConfig::default();
        let resp_json = with_retry(&retry_config, "OpenAI", http_retryable, || async {
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&payload)
                .send()
                .await
                .map_err(anyhow::Error::from)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiStatusError {
                    provider: "OpenAI",
                    status,
                    body,
                }
                .into());
            }

            response
                .json::<Value>()
                .await
                .context("Failed to parse OpenAI response")
        })
        .await?;

        Ok(parse_response(&resp_json))
    }
}

/// Convert the normalized transcript into Chat Completions wire format.
fn build_request(
    model: &str,
    system: &str,
    messages: &[Message],
    tools: &[Tool],
    params: &CompletionParams,
) -> Value {
    // System prompt goes first as its own message
    let mut openai_messages = vec![json!({
        "role": "system",
        "content": system
    })];

    for msg in messages {
        match msg.role {
            Role::User => {
                // Tool results become their own `tool` role messages
                for block in &msg.content {
                    if let ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        ..
                    } = block
                    {
                        openai_messages.push(json!({
                            "role": "tool",
                            "tool_call_id": tool_use_id,
                            "content": content
                        }));
                    }
                }

                let text: Vec<&str> = msg
                    .content
                    .iter()
                    .filter_map(|b| match b {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if !text.is_empty() {
                    openai_messages.push(json!({
                        "role": "user",
                        "content": text.join("\n")
                    }));
                }
            }
            Role::Assistant => {
                let mut text_parts = Vec::new();
                let mut tool_calls = Vec::new();
                for block in &msg.content {
                    match block {
                        ContentBlock::Text { text } => text_parts.push(text.as_str()),
                        ContentBlock::ToolUse { id, name, input } => {
                            tool_calls.push(json!({
                                "id": id,
                                "type": "function",
                                "function": {
                                    "name": name,
                                    // OpenAI expects stringified JSON
                                    "arguments": input.to_string()
                                }
                            }));
                        }
                        _ => {}
                    }
                }

                let mut msg_obj = json!({"role": "assistant"});
                msg_obj["content"] = if text_parts.is_empty() {
                    Value::Null
                } else {
                    json!(text_parts.join("\n"))
                };
                if !tool_calls.is_empty() {
                    msg_obj["tool_calls"] = json!(tool_calls);
                }
                openai_messages.push(msg_obj);
            }
        }
    }

    let mut payload = json!({
        "model": model,
        "messages": openai_messages,
        "temperature": params.temperature,
    });
    if !tools.is_empty() {
        let openai_tools: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.input_schema
                    }
                })
            })
            .collect();
        payload["tools"] = json!(openai_tools);
    }
    payload
}

/// Normalize the Chat Completions reply into shared content blocks.
fn parse_response(resp_json: &Value) -> MessagesResponse {
    let choice = &resp_json["choices"][0];
    let message = &choice["message"];
    let finish_reason = choice["finish_reason"].as_str().map(|s| s.to_string());

    let mut content_blocks = Vec::new();

    if let Some(content) = message["content"].as_str() {
        if !content.is_empty() {
            content_blocks.push(ContentBlock::Text {
                text: content.to_string(),
            });
        }
    }

    if let Some(tool_calls) = message["tool_calls"].as_array() {
        for call in tool_calls {
            let id = call["id"].as_str().unwrap_or_default().to_string();
            let func = &call["function"];
            let name = func["name"].as_str().unwrap_or_default().to_string();
            let args_str = func["arguments"].as_str().unwrap_or("{}");
            let input: Value = serde_json::from_str(args_str).unwrap_or(json!({}));

            content_blocks.push(ContentBlock::ToolUse { id, name, input });
        }
    }

    let usage = resp_json.get("usage").map(|u| Usage {
        input_tokens: u["prompt_tokens"].as_u64().unwrap_or(0),
        output_tokens: u["completion_tokens"].as_u64().unwrap_or(0),
    });

    MessagesResponse {
        content: content_blocks,
        stop_reason: finish_reason,
        usage,
    }
}
