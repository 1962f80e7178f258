//! Prompt assembly.
//!
//! `RequestPayload` is the single source of truth for what gets sent to the
//! LLM provider: the real loop submits it and debug mode renders it, so the
//! two can never drift apart.

use crate::api_types::{ContentBlock, Message, Role, Tool};
use gridiron_league::{summary, League, Team};

/// Standing instructions for the analyst role. The initial data is concise
/// on purpose; the model is expected to drill down with tools.
pub const ANALYST_INSTRUCTIONS: &str = "\
You are an expert fantasy football analyst with deep NFL knowledge. You combine statistical \
analysis with understanding of matchups, injuries, bye weeks, and game script to provide \
actionable fantasy advice.

IMPORTANT: The initial data provided is intentionally concise to optimize token usage. Use the \
available tools strategically to gather detailed information as needed:

- get_waiver_wire: Find top available players (use position filter for focused searches)
- get_team_details: Get full roster details for any team using team_id from standings
- get_player_stats: Get detailed weekly stats breakdown for any player using player_id

Start your analysis with the provided summary data, then use tools to drill down into areas \
that need deeper investigation. Focus on high-impact decisions and actionable recommendations. \
Be specific with player names and confident in recommendations.";

/// Everything one LLM call needs. Assembled in one place (see module docs).
#[derive(Debug, Clone)]
pub struct RequestPayload {
    pub instructions: String,
    pub tools: Vec<Tool>,
    pub messages: Vec<Message>,
}

impl RequestPayload {
    /// Deterministic text rendering for debug/introspection mode.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("== INSTRUCTIONS ==\n");
        out.push_str(&self.instructions);
        out.push_str("\n\n");

        out.push_str(&format!("== TOOLS ({}) ==\n", self.tools.len()));
        for tool in &self.tools {
            out.push_str(
                &serde_json::to_string_pretty(tool).unwrap_or_else(|_| tool.name.clone()),
            );
            out.push('\n');
        }
        out.push('\n');

        out.push_str("== MESSAGES ==\n");
        for message in &self.messages {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            out.push_str(&format!("[{}]\n", role));
            for block in &message.content {
                match block {
                    ContentBlock::Text { text } => {
                        out.push_str(text);
                        out.push('\n');
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        out.push_str(&format!("[tool_use {}] {} {}\n", id, name, input));
                    }
                    ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        ..
                    } => {
                        out.push_str(&format!("[tool_result {}] {}\n", tool_use_id, content));
                    }
                }
            }
        }
        out
    }
}

pub struct PromptBuilder;

impl PromptBuilder {
    /// The kickoff analysis request: compact team/opponent/standings context
    /// plus the asked-for report structure.
    pub fn kickoff_prompt(league: &League, my_team: &Team) -> String {
        let week = league.current_week;
        let current_date = chrono::Local::now().format("%B %d, %Y");
        let roster = summary::roster_summary(league, my_team);
        let standings = summary::standings_summary(league);
        let opponent = summary::opponent_summary(league, my_team.id);
        let projected_total = my_team.projected_starter_total(week);
        let avg_points = league.avg_points_per_week(my_team);

        format!(
            "Analyze this fantasy football team and provide actionable recommendations for Week {week}.

{season} SEASON - WEEK {week} | {current_date}
Team: {team_name} | Record: {record} | Points For: {points_for:.1} | Avg/Week: {avg_points:.1}
Projected Total (starters): {projected_total:.1}

MY ROSTER:
{roster}

OPPONENT:
{opponent}

LEAGUE STANDINGS:
{standings}

Tools available for deeper analysis:
- get_waiver_wire: Find top available players, optionally filtered by position
- get_team_details: Analyze any team's roster using their team_id from standings above
- get_player_stats: Get detailed weekly breakdown stats for any player by player_id

Use these tools to enhance your analysis and identify opportunities.

Provide recommendations in these sections:

## EXECUTIVE SUMMARY
Key insights and most critical decisions for this week.

## STARTING LINEUP
Optimal lineup with brief reasoning for key decisions. Consider injuries, matchups, bye weeks, and recent performance.

## ROSTER MOVES
Use the get_waiver_wire tool to find available players, then provide specific add/drop recommendations. Consider upcoming bye weeks when evaluating long-term roster needs.

## MATCHUP STRATEGY
How to approach this specific opponent and maximize win probability.

## ACTION ITEMS
Prioritized list of moves to make immediately.

Focus on what matters most for winning this week.",
            week = week,
            season = league.season,
            current_date = current_date,
            team_name = my_team.name,
            record = my_team.record(),
            points_for = my_team.points_for,
            avg_points = avg_points,
            projected_total = projected_total,
            roster = roster,
            opponent = opponent,
            standings = standings,
        )
    }

    /// Seed transcript: the user's analysis request as the opening turn.
    pub fn seed_messages(kickoff: &str) -> Vec<Message> {
        vec![Message {
            role: Role::User,
            content: vec![ContentBlock::Text {
                text: kickoff.to_string(),
            }],
        }]
    }
}
