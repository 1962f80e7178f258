use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GridironConfig {
    pub llm: LlmConfig,
    pub league: LeagueConfig,
    pub agent: AgentConfig,
}

impl GridironConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: GridironConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("LEAGUE_ID") {
            if let Ok(n) = v.parse() {
                self.league.league_id = n;
            }
        }
        if let Ok(v) = std::env::var("YEAR") {
            if let Ok(n) = v.parse() {
                self.league.season = n;
            }
        }
        if let Ok(v) = std::env::var("ESPN_S2") {
            self.league.espn_s2 = Some(v);
        }
        if let Ok(v) = std::env::var("SWID") {
            self.league.swid = Some(v);
        }
        if let Ok(v) = std::env::var("MY_TEAM_ID") {
            if let Ok(n) = v.parse() {
                self.league.team_id = Some(n);
            }
        }
        if let Ok(v) = std::env::var("AGENT_MAX_TURNS") {
            if let Ok(n) = v.parse() {
                self.agent.max_turns = n;
            }
        }
    }

    /// Check that everything the run needs is present. Called once at startup;
    /// the core components receive these values as immutable run parameters.
    pub fn validate(&self) -> Result<()> {
        if self.league.league_id == 0 {
            anyhow::bail!("No league configured. Set LEAGUE_ID in .env or [league] league_id in the config file");
        }
        if self.league.season == 0 {
            anyhow::bail!("No season configured. Set YEAR in .env or [league] season in the config file");
        }
        if self.league.espn_s2.is_some() != self.league.swid.is_some() {
            anyhow::bail!("ESPN credentials are incomplete: set both ESPN_S2 and SWID (or neither for a public league)");
        }
        if self.league.swid.is_none() && self.league.team_id.is_none() {
            anyhow::bail!("Cannot identify your team: set SWID or [league] team_id");
        }
        Ok(())
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-5".to_string(),
            base_url: None,
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    pub league_id: u64,
    /// Season year, e.g. 2025.
    pub season: u16,
    /// ESPN session cookie. Required for private leagues.
    pub espn_s2: Option<String>,
    /// ESPN owner id cookie, braces included or not.
    pub swid: Option<String>,
    /// Explicit team id override. When absent, the team is identified by SWID.
    pub team_id: Option<u32>,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            league_id: 0,
            season: 0,
            espn_s2: None,
            swid: None,
            team_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum tool round trips before the run is aborted.
    pub max_turns: u32,
    /// Maximum attempts per network-bound call (including the first).
    pub max_attempts: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: 8,
            max_attempts: 4,
        }
    }
}
