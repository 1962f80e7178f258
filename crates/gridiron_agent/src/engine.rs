//! The conversation driver: a bounded tool-use loop over one LLM client and
//! one tool registry.
//!
//! Each turn the full transcript plus the tool schema goes to the model; the
//! reply either ends the run with final text or requests tool calls, which
//! are executed in request order and appended as one results turn. Tool
//! failures stay inside the loop as result text; LLM failures (after the
//! provider's own retries) and the turn bound are fatal.

use crate::api_types::{ContentBlock, Message, Role};
use crate::error::AgentError;
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::{PromptBuilder, RequestPayload};
use crate::tool_registry::ToolRegistry;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

/// Categorise tool failures so we can decide whether to retry.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolErrorKind {
    /// Transient: timeout, connection reset — worth retrying.
    Transient,
    /// Permanent: missing param, unknown tool — retrying won't help.
    Permanent,
}

/// Structured result from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub content: String,
    pub is_error: bool,
    pub error_kind: Option<ToolErrorKind>,
}

impl ToolOutcome {
    pub fn ok(content: String) -> Self {
        Self {
            content,
            is_error: false,
            error_kind: None,
        }
    }

    pub fn transient_error(msg: String) -> Self {
        Self {
            content: msg,
            is_error: true,
            error_kind: Some(ToolErrorKind::Transient),
        }
    }

    pub fn permanent_error(msg: String) -> Self {
        Self {
            content: msg,
            is_error: true,
            error_kind: Some(ToolErrorKind::Permanent),
        }
    }
}

/// Maximum number of retries for transient tool failures.
const TOOL_MAX_RETRIES: usize = 1;

pub struct AnalysisEngine {
    client: Box<dyn LlmClient>,
    registry: ToolRegistry,
    instructions: String,
    params: CompletionParams,
    max_turns: u32,
    cancelled: AtomicBool,
}

impl AnalysisEngine {
    pub fn new(
        client: Box<dyn LlmClient>,
        registry: ToolRegistry,
        instructions: String,
        max_turns: u32,
        params: CompletionParams,
    ) -> Self {
        Self {
            client,
            registry,
            instructions,
            params,
            max_turns: max_turns.max(1),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Request cancellation. Takes effect at the next suspension point,
    /// before the next external call.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// The one assembly point for LLM requests; debug mode renders exactly
    /// what `analyze` submits.
    fn assemble_request(&self, messages: &[Message]) -> RequestPayload {
        RequestPayload {
            instructions: self.instructions.clone(),
            tools: self.registry.available_tools(),
            messages: messages.to_vec(),
        }
    }

    /// Render the request that a run seeded with `kickoff` would send,
    /// without contacting the provider.
    pub fn render_debug(&self, kickoff: &str) -> String {
        self.assemble_request(&PromptBuilder::seed_messages(kickoff))
            .render()
    }

    /// Run the full analysis loop until the model produces a final answer.
    pub async fn analyze(&self, kickoff: &str) -> Result<String> {
        let mut messages = PromptBuilder::seed_messages(kickoff);
        let mut consecutive_permanent_fails = 0u32;

        for turn in 0..self.max_turns {
            if self.is_cancelled() {
                tracing::info!("Analysis cancelled before LLM call");
                return Err(AgentError::Cancelled.into());
            }

            let payload = self.assemble_request(&messages);
            let response = self
                .client
                .complete(
                    &payload.instructions,
                    payload.messages,
                    payload.tools,
                    self.params.clone(),
                )
                .await?;

            if let Some(usage) = &response.usage {
                tracing::info!(
                    "Token usage - input: {}, output: {}",
                    usage.input_tokens,
                    usage.output_tokens
                );
            }

            // Extract text and collect tool_use blocks from the response
            let mut final_text = String::new();
            let mut tool_uses: Vec<(String, String, serde_json::Value)> = Vec::new();
            for block in &response.content {
                match block {
                    ContentBlock::Text { text } => {
                        tracing::debug!("LLM text: {}", text);
                        final_text.push_str(text);
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        tool_uses.push((id.clone(), name.clone(), input.clone()));
                    }
                    _ => {}
                }
            }

            messages.push(Message {
                role: Role::Assistant,
                content: response.content.clone(),
            });

            if tool_uses.is_empty() {
                // No tool calls → final answer
                tracing::debug!("Final answer after {} turn(s)", turn + 1);
                return Ok(final_text.trim().to_string());
            }

            tracing::info!("Model requested {} tool call(s)", tool_uses.len());
            let mut result_blocks = Vec::with_capacity(tool_uses.len());
            let mut any_permanent_fail = false;

            for (id, name, input) in &tool_uses {
                if self.is_cancelled() {
                    tracing::info!("Analysis cancelled before tool dispatch");
                    return Err(AgentError::Cancelled.into());
                }
                tracing::info!("Tool: {} input: {}", name, input);
                let outcome = self.execute_tool_with_retry(name, input).await;
                if outcome.is_error {
                    tracing::warn!("Tool '{}' failed: {}", name, outcome.content);
                    if outcome.error_kind == Some(ToolErrorKind::Permanent) {
                        any_permanent_fail = true;
                    }
                }
                // Exactly one result per request, in request order
                result_blocks.push(ContentBlock::ToolResult {
                    tool_use_id: id.clone(),
                    content: outcome.content,
                    is_error: if outcome.is_error { Some(true) } else { None },
                });
            }

            messages.push(Message {
                role: Role::User,
                content: result_blocks,
            });

            if any_permanent_fail {
                consecutive_permanent_fails += 1;
            } else {
                consecutive_permanent_fails = 0;
            }
            if consecutive_permanent_fails >= 2 {
                tracing::warn!("Tool calls failing repeatedly, aborting analysis");
                anyhow::bail!("tool calls failing repeatedly; aborting analysis");
            }
        }

        Err(AgentError::MaxTurnsExceeded {
            max_turns: self.max_turns,
        }
        .into())
    }

    /// Execute a tool with automatic retry for transient failures.
    async fn execute_tool_with_retry(
        &self,
        name: &str,
        input: &serde_json::Value,
    ) -> ToolOutcome {
        let outcome = self.registry.dispatch(name, input).await;

        if outcome.is_error && outcome.error_kind == Some(ToolErrorKind::Transient) {
            for attempt in 1..=TOOL_MAX_RETRIES {
                tracing::info!(
                    "Retrying tool '{}' (attempt {}/{})",
                    name,
                    attempt,
                    TOOL_MAX_RETRIES
                );
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;

                let retry_outcome = self.registry.dispatch(name, input).await;
                if !retry_outcome.is_error || attempt == TOOL_MAX_RETRIES {
                    return retry_outcome;
                }
            }
        }

        outcome
    }
}
