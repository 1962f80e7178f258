//! End-to-end: engine + registry + real league tools over a fixture league,
//! driven by a scripted provider.

use gridiron_agent::api_types::{ContentBlock, Message};
use gridiron_agent::engine::AnalysisEngine;
use gridiron_agent::llm::CompletionParams;
use gridiron_agent::prompts::{PromptBuilder, ANALYST_INSTRUCTIONS};
use gridiron_agent::providers::mock::MockProvider;
use gridiron_agent::retry::RetryConfig;
use gridiron_agent::tool_registry::ToolRegistry;
use gridiron_agent::tools::{register_league_tools, ToolContext};
use gridiron_league::{EspnClient, League, Matchup, Player, Team};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

fn player(id: u64, name: &str, pos: &str, slot: &str, pro: &str, avg: f64) -> Player {
    Player {
        id,
        name: name.into(),
        position: pos.into(),
        pro_team: pro.into(),
        lineup_slot: slot.into(),
        injury_status: None,
        projected_avg: avg,
        weekly: BTreeMap::new(),
    }
}

fn fixture_league() -> League {
    League {
        id: 7,
        season: 2025,
        name: "Integration League".into(),
        current_week: 5,
        teams: vec![
            Team {
                id: 1,
                name: "Sunday Scaries".into(),
                wins: 3,
                losses: 1,
                points_for: 455.2,
                points_against: 430.0,
                owners: vec!["ME-1234".into()],
                roster: vec![
                    player(100, "Josh Allen", "QB", "QB", "BUF", 23.1),
                    player(101, "Bijan Robinson", "RB", "RB", "ATL", 19.4),
                    player(102, "Jaylen Warren", "RB", "BE", "PIT", 8.8),
                ],
            },
            Team {
                id: 2,
                name: "Gridiron Gurus".into(),
                wins: 2,
                losses: 2,
                points_for: 420.0,
                points_against: 415.5,
                owners: vec!["THEM-5678".into()],
                roster: vec![player(200, "Lamar Jackson", "QB", "QB", "BAL", 22.0)],
            },
        ],
        schedule: vec![Matchup {
            week: 5,
            home_team: 1,
            away_team: 2,
            home_points: 0.0,
            away_points: 0.0,
        }],
    }
}

fn build_engine(provider: MockProvider) -> (AnalysisEngine, Arc<League>) {
    let league = Arc::new(fixture_league());
    let ctx = Arc::new(ToolContext {
        client: Arc::new(EspnClient::new(7, 2025, None).unwrap()),
        league: league.clone(),
        my_team_id: 1,
        retry: RetryConfig::with_max_attempts(1),
    });
    let mut registry = ToolRegistry::new();
    register_league_tools(&mut registry, ctx).unwrap();

    let engine = AnalysisEngine::new(
        Box::new(provider),
        registry,
        ANALYST_INSTRUCTIONS.to_string(),
        8,
        CompletionParams::default(),
    );
    (engine, league)
}

fn results_turn(transcript: &[Message]) -> Vec<(String, String)> {
    transcript
        .last()
        .unwrap()
        .content
        .iter()
        .map(|b| match b {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => (tool_use_id.clone(), content.clone()),
            other => panic!("expected tool result, got {:?}", other),
        })
        .collect()
}

#[tokio::test]
async fn test_full_run_with_team_and_player_lookups() {
    let provider = MockProvider::scripted(vec![
        MockProvider::tool_call_response(&[
            ("c1", "get_team_details", json!({"team_id": 2})),
            ("c2", "get_player_stats", json!({"player_id": 101})),
        ]),
        MockProvider::text_response("Start Bijan Robinson and Josh Allen."),
    ]);
    let seen = provider.seen_messages_handle();

    let (engine, league) = build_engine(provider);
    let kickoff = PromptBuilder::kickoff_prompt(&league, league.team(1).unwrap());
    let answer = engine.analyze(&kickoff).await.unwrap();

    assert_eq!(answer, "Start Bijan Robinson and Josh Allen.");

    let transcripts = seen.lock().unwrap();
    assert_eq!(transcripts.len(), 2);

    // The kickoff context reached the provider verbatim on turn one
    let first_turn = &transcripts[0];
    match &first_turn[0].content[0] {
        ContentBlock::Text { text } => {
            assert!(text.contains("WEEK 5"));
            assert!(text.contains("Sunday Scaries"));
            assert!(text.contains("Gridiron Gurus"));
        }
        other => panic!("expected text seed, got {:?}", other),
    }

    // Both tool results came back, in order, with real payloads
    let results = results_turn(transcripts.last().unwrap());
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "c1");
    assert!(results[0].1.contains("Gridiron Gurus"));
    assert_eq!(results[1].0, "c2");
    assert!(results[1].1.contains("Bijan Robinson"));
}

#[tokio::test]
async fn test_my_team_fallback_flows_through_loop() {
    let provider = MockProvider::scripted(vec![
        // No team_id argument: the adapter must fall back to the caller's team
        MockProvider::tool_call_response(&[("c1", "get_team_details", json!({}))]),
        MockProvider::text_response("done"),
    ]);
    let seen = provider.seen_messages_handle();

    let (engine, league) = build_engine(provider);
    let kickoff = PromptBuilder::kickoff_prompt(&league, league.team(1).unwrap());
    engine.analyze(&kickoff).await.unwrap();

    let transcripts = seen.lock().unwrap();
    let results = results_turn(transcripts.last().unwrap());
    assert!(results[0].1.contains("Sunday Scaries"));
}

#[tokio::test]
async fn test_tool_local_not_found_keeps_run_alive() {
    let provider = MockProvider::scripted(vec![
        MockProvider::tool_call_response(&[("c1", "get_player_stats", json!({"player_id": 9999}))]),
        MockProvider::text_response("player unknown, moving on"),
    ]);
    let seen = provider.seen_messages_handle();

    let (engine, _) = build_engine(provider);
    let answer = engine.analyze("What should my lineup be?").await.unwrap();
    assert_eq!(answer, "player unknown, moving on");

    let transcripts = seen.lock().unwrap();
    let results = results_turn(transcripts.last().unwrap());
    assert!(results[0].1.contains("not found"));
}

#[test]
fn test_debug_render_covers_registered_tools() {
    let provider = MockProvider::scripted(vec![]);
    let (engine, league) = build_engine(provider);
    let kickoff = PromptBuilder::kickoff_prompt(&league, league.team(1).unwrap());

    let rendered = engine.render_debug(&kickoff);
    assert!(rendered.contains("== TOOLS (3) =="));
    for tool in ["get_waiver_wire", "get_team_details", "get_player_stats"] {
        assert!(rendered.contains(tool), "missing {} in debug render", tool);
    }
    assert!(rendered.contains("LEAGUE STANDINGS"));
}
