//! Fatal run-level errors. Tool-local failures never appear here (they are
//! folded into tool results so the model can adapt); these variants terminate
//! the whole analysis and carry enough context to tell an auth problem from
//! a flaky network.

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("analysis exceeded {max_turns} tool round trips without a final answer")]
    MaxTurnsExceeded { max_turns: u32 },

    #[error("analysis cancelled")]
    Cancelled,
}
