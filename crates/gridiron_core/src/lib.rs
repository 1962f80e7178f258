pub mod config;

pub use config::{AgentConfig, GridironConfig, LeagueConfig, LlmConfig};
