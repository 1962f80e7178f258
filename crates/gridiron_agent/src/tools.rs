//! League data-access tools exposed to the LLM.
//!
//! Each handler is a thin adapter: parse arguments, call the league layer,
//! serialize a compact payload. Argument problems and unknown entities are
//! reported inside the tool result so the model can adjust its next request;
//! they never abort the run.

use crate::api_types::{Tool, ToolInputSchema};
use crate::engine::{ToolErrorKind, ToolOutcome};
use crate::retry::{with_retry, RetryConfig};
use crate::tool_registry::{DuplicateTool, ToolHandler, ToolRegistry};
use gridiron_league::{summary, EspnClient, League, LeagueError};
use serde_json::json;
use std::sync::Arc;

const VALID_POSITIONS: [&str; 6] = ["QB", "RB", "WR", "TE", "K", "D/ST"];

/// Shared state for all league tools: the provider session is read-only and
/// reused across invocations within a run.
pub struct ToolContext {
    pub client: Arc<EspnClient>,
    pub league: Arc<League>,
    pub my_team_id: u32,
    pub retry: RetryConfig,
}

/// Register the full tool set in its declaration order.
pub fn register_league_tools(
    registry: &mut ToolRegistry,
    ctx: Arc<ToolContext>,
) -> Result<(), DuplicateTool> {
    registry.register(Box::new(WaiverWireTool { ctx: ctx.clone() }))?;
    registry.register(Box::new(TeamDetailsTool { ctx: ctx.clone() }))?;
    registry.register(Box::new(PlayerStatsTool { ctx }))?;
    Ok(())
}

/// Only provider-unavailable errors are worth another attempt.
fn league_retryable(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<LeagueError>(),
        Some(LeagueError::Unavailable(_))
    )
}

fn provider_failure_outcome(e: anyhow::Error) -> ToolOutcome {
    if matches!(
        e.downcast_ref::<LeagueError>(),
        Some(LeagueError::NotFound(_))
    ) {
        ToolOutcome::permanent_error(e.to_string())
    } else {
        // Unavailable after retries; still transient in kind
        ToolOutcome::transient_error(e.to_string())
    }
}

// ============================================================================
// get_waiver_wire
// ============================================================================

pub struct WaiverWireTool {
    ctx: Arc<ToolContext>,
}

#[async_trait::async_trait]
impl ToolHandler for WaiverWireTool {
    fn name(&self) -> &str {
        "get_waiver_wire"
    }

    fn description(&self) -> &str {
        "Top available players from the waiver wire"
    }

    fn schema(&self) -> Tool {
        Tool {
            name: "get_waiver_wire".to_string(),
            description: "Get top available players from the waiver wire, sorted by projected points (highest first), optionally filtered by position".to_string(),
            input_schema: ToolInputSchema {
                schema_type: "object".to_string(),
                properties: json!({
                    "position": {
                        "type": "string",
                        "enum": ["QB", "RB", "WR", "TE", "K", "D/ST"],
                        "description": "Position to filter by (optional)"
                    },
                    "size": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 10,
                        "description": "Number of players to return (default: 3, max: 10)"
                    }
                }),
                required: vec![],
            },
        }
    }

    async fn execute(&self, input: &serde_json::Value) -> ToolOutcome {
        let position = match input.get("position").and_then(|v| v.as_str()) {
            None => None,
            // D/ST goes by both names in the wild
            Some("DST") => Some("D/ST"),
            Some(pos) if VALID_POSITIONS.contains(&pos) => Some(pos),
            Some(pos) => {
                return ToolOutcome::permanent_error(format!(
                    "Invalid position: {}. Valid positions are QB, RB, WR, TE, K, D/ST",
                    pos
                ));
            }
        };
        let size = input
            .get("size")
            .and_then(|v| v.as_u64())
            .unwrap_or(3)
            .clamp(1, 10) as usize;

        // Larger fetch when filtering, so the position survives the cut
        let fetch_size = if position.is_some() { 75 } else { 50 };
        let week = self.ctx.league.current_week.max(1);
        let client = self.ctx.client.clone();

        let pool = with_retry(
            &self.ctx.retry,
            "ESPN free agent fetch",
            league_retryable,
            || {
                let client = client.clone();
                async move {
                    client
                        .fetch_free_agents(week, fetch_size)
                        .await
                        .map_err(anyhow::Error::from)
                }
            },
        )
        .await;

        match pool {
            Ok(players) => {
                let payload =
                    summary::waiver_payload(&players, position, size, &self.ctx.league);
                ToolOutcome::ok(payload.to_string())
            }
            Err(e) => provider_failure_outcome(e),
        }
    }
}

// ============================================================================
// get_team_details
// ============================================================================

pub struct TeamDetailsTool {
    ctx: Arc<ToolContext>,
}

#[async_trait::async_trait]
impl ToolHandler for TeamDetailsTool {
    fn name(&self) -> &str {
        "get_team_details"
    }

    fn description(&self) -> &str {
        "Roster details for a specific team"
    }

    fn schema(&self) -> Tool {
        Tool {
            name: "get_team_details".to_string(),
            description: "Get roster information for a specific team including lineup structure with player IDs. Use team_id from league standings; omit it for your own team. Use get_player_stats tool with player_id for detailed individual player analysis.".to_string(),
            input_schema: ToolInputSchema {
                schema_type: "object".to_string(),
                properties: json!({
                    "team_id": {
                        "type": "integer",
                        "description": "The team_id from the league standings. Defaults to your own team."
                    }
                }),
                required: vec![],
            },
        }
    }

    async fn execute(&self, input: &serde_json::Value) -> ToolOutcome {
        let team_id = input
            .get("team_id")
            .and_then(|v| v.as_u64())
            .map(|id| id as u32)
            .unwrap_or(self.ctx.my_team_id);

        match self.ctx.league.team(team_id) {
            Some(team) => {
                let payload = summary::team_details_payload(&self.ctx.league, team);
                ToolOutcome::ok(payload.to_string())
            }
            None => ToolOutcome::permanent_error(
                json!({"error": format!("Team with ID '{}' not found", team_id)}).to_string(),
            ),
        }
    }
}

// ============================================================================
// get_player_stats
// ============================================================================

pub struct PlayerStatsTool {
    ctx: Arc<ToolContext>,
}

#[async_trait::async_trait]
impl ToolHandler for PlayerStatsTool {
    fn name(&self) -> &str {
        "get_player_stats"
    }

    fn description(&self) -> &str {
        "Weekly stat breakdown for a player"
    }

    fn schema(&self) -> Tool {
        Tool {
            name: "get_player_stats".to_string(),
            description: "Get detailed weekly breakdown stats for any player. Useful for analyzing usage trends, projections, and performance patterns. Use the player_id from roster data.".to_string(),
            input_schema: ToolInputSchema {
                schema_type: "object".to_string(),
                properties: json!({
                    "player_id": {
                        "type": "integer",
                        "description": "The player_id from roster data. Example: 4426515"
                    }
                }),
                required: vec!["player_id".to_string()],
            },
        }
    }

    async fn execute(&self, input: &serde_json::Value) -> ToolOutcome {
        let player_id = match input.get("player_id").and_then(|v| v.as_u64()) {
            Some(id) => id,
            None => {
                return ToolOutcome::permanent_error(
                    "Missing required parameter: \"player_id\"".to_string(),
                );
            }
        };

        match summary::player_stats_payload(&self.ctx.league, player_id) {
            Some(payload) => ToolOutcome::ok(payload.to_string()),
            None => ToolOutcome::permanent_error(
                json!({"error": format!("Player with ID '{}' not found", player_id)}).to_string(),
            ),
        }
    }
}
