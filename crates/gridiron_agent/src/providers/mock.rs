//! Mock LLM provider: deterministic responses for tests and keyless runs.
//!
//! Scripted responses pop in order; a looping fallback repeats forever.
//! Everything the engine sends is recorded so tests can inspect the exact
//! transcript each turn received.

use crate::api_types::{ContentBlock, Message, MessagesResponse, Tool};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockProvider {
    script: Mutex<VecDeque<MessagesResponse>>,
    fallback: Option<MessagesResponse>,
    fail_with: Option<String>,
    calls: Arc<AtomicU32>,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Respond with the given responses in order, then a default text.
    pub fn scripted(script: Vec<MessagesResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            fail_with: None,
            calls: Arc::new(AtomicU32::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with the same response on every call.
    pub fn looping(response: MessagesResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::scripted(vec![])
        }
    }

    /// Fail every call with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::scripted(vec![])
        }
    }

    /// A canned single-answer provider, used when no API key is configured.
    pub fn canned(model: &str) -> Self {
        Self::looping(Self::text_response(&format!(
            "(Mock {} Response) I received your prompt.",
            model
        )))
    }

    pub fn call_count_handle(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }

    pub fn seen_messages_handle(&self) -> Arc<Mutex<Vec<Vec<Message>>>> {
        self.seen.clone()
    }

    pub fn text_response(text: &str) -> MessagesResponse {
        MessagesResponse {
            content: vec![ContentBlock::Text {
                text: text.to_string(),
            }],
            stop_reason: Some("end_turn".to_string()),
            usage: None,
        }
    }

    pub fn tool_call_response(calls: &[(&str, &str, serde_json::Value)]) -> MessagesResponse {
        MessagesResponse {
            content: calls
                .iter()
                .map(|(id, name, input)| ContentBlock::ToolUse {
                    id: id.to_string(),
                    name: name.to_string(),
                    input: input.clone(),
                })
                .collect(),
            stop_reason: Some("tool_use".to_string()),
            usage: None,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        messages: Vec<Message>,
        _tools: Vec<Tool>,
        _params: CompletionParams,
    ) -> Result<MessagesResponse> {
        self.seen.lock().unwrap().push(messages);

        if let Some(message) = &self.fail_with {
            anyhow::bail!("{}", message);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return Ok(next);
        }
        if let Some(fallback) = &self.fallback {
            return Ok(fallback.clone());
        }
        Ok(Self::text_response("(mock) no scripted response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_order_then_default() {
        let provider = MockProvider::scripted(vec![
            MockProvider::text_response("first"),
            MockProvider::text_response("second"),
        ]);

        for expected in ["first", "second", "(mock) no scripted response"] {
            let resp = provider
                .complete("sys", vec![], vec![], CompletionParams::default())
                .await
                .unwrap();
            match &resp.content[0] {
                ContentBlock::Text { text } => assert_eq!(text, expected),
                other => panic!("expected text, got {:?}", other),
            }
        }
        assert_eq!(provider.call_count_handle().load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_tool_call_response_shape() {
        let resp =
            MockProvider::tool_call_response(&[("t1", "get_waiver_wire", serde_json::json!({}))]);
        assert_eq!(resp.stop_reason.as_deref(), Some("tool_use"));
        assert!(matches!(
            &resp.content[0],
            ContentBlock::ToolUse { id, name, .. } if id == "t1" && name == "get_waiver_wire"
        ));
    }
}
