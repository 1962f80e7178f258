pub mod anthropic;
pub mod mock;
pub mod openai;

use crate::llm::LlmClient;
use crate::retry::is_retryable_status;
use anyhow::Result;
use gridiron_core::LlmConfig;

/// Non-success HTTP reply from an LLM provider, kept typed so the retry
/// classifier can read the status.
#[derive(Debug, thiserror::Error)]
#[error("{provider} API error ({status}): {body}")]
pub struct ApiStatusError {
    pub provider: &'static str,
    pub status: reqwest::StatusCode,
    pub body: String,
}

/// Classifier shared by the HTTP providers: transport trouble and the
/// retryable status set are transient, everything else terminal.
pub(crate) fn http_retryable(e: &anyhow::Error) -> bool {
    if let Some(api) = e.downcast_ref::<ApiStatusError>() {
        return is_retryable_status(api.status);
    }
    if let Some(req) = e.downcast_ref::<reqwest::Error>() {
        return req.is_timeout() || req.is_connect() || req.is_request();
    }
    false
}

/// Build an LLM client from config.
pub fn from_config(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(openai::OpenAiClient::new(
            &config.model,
            config.base_url.as_deref(),
        )?)),
        "anthropic" => Ok(Box::new(anthropic::AnthropicClient::new(
            &config.model,
            config.base_url.as_deref(),
        )?)),
        "mock" => Ok(Box::new(mock::MockProvider::canned(&config.model))),
        other => anyhow::bail!(
            "Unknown LLM provider '{}' (expected openai, anthropic, or mock)",
            other
        ),
    }
}
