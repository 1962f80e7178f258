//! Token-efficient renderings of league data.
//!
//! The kickoff prompt and every tool payload is produced here, kept
//! deliberately compact: the model is told to drill down with tools instead
//! of being handed a full data dump.

use crate::model::{slot_order, League, Player, SeasonPhase, Team};
use serde_json::{json, Value};

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// One-line player rendering: projection, bye week, injury tag.
fn player_line(player: &Player, week: Option<u32>, with_slot: bool) -> String {
    let projected = match week {
        Some(w) => player.projected_for(w),
        None => player.projected_avg,
    };
    let mut line = if with_slot {
        format!(
            "{}: {} ({}) - {:.1}pts",
            player.lineup_slot, player.name, player.position, projected
        )
    } else {
        format!("{} ({}) - {:.1}pts", player.name, player.position, projected)
    };
    if let Some(bye) = player.bye_week() {
        line.push_str(&format!(" (Bye: W{})", bye));
    }
    if let Some(status) = &player.injury_status {
        line.push_str(&format!(" [{}]", status));
    }
    line
}

/// Concise roster summary for the kickoff prompt: starters in slot order,
/// bench sorted by projection.
pub fn roster_summary(league: &League, team: &Team) -> String {
    let week = match league.season_phase() {
        SeasonPhase::Preseason => None,
        SeasonPhase::InSeason { week } => Some(week),
    };

    let mut starters: Vec<&Player> = team.roster.iter().filter(|p| p.is_starter()).collect();
    starters.sort_by_key(|p| slot_order(&p.lineup_slot));

    let mut bench: Vec<&Player> = team
        .roster
        .iter()
        .filter(|p| !p.is_starter() && p.lineup_slot != "IR")
        .collect();
    bench.sort_by(|a, b| {
        let pa = week.map(|w| a.projected_for(w)).unwrap_or(a.projected_avg);
        let pb = week.map(|w| b.projected_for(w)).unwrap_or(b.projected_avg);
        pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = String::from("STARTERS:\n");
    out.push_str(
        &starters
            .iter()
            .map(|p| player_line(p, week, true))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    if !bench.is_empty() {
        out.push_str("\n\nBENCH:\n");
        out.push_str(
            &bench
                .iter()
                .map(|p| player_line(p, week, false))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    out
}

/// Minimal standings: rank, name, record, points, team id. Sorted by wins,
/// then points.
pub fn standings_summary(league: &League) -> String {
    let mut teams: Vec<&Team> = league.teams.iter().collect();
    teams.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.points_for.partial_cmp(&a.points_for).unwrap_or(std::cmp::Ordering::Equal))
    });
    teams
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. {} ({}) - {:.1}pts (team_id: {})",
                i + 1,
                t.name,
                t.record(),
                t.points_for,
                t.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Concise current-week opponent line for the kickoff prompt.
pub fn opponent_summary(league: &League, my_team_id: u32) -> String {
    let opponent = match league.opponent_of(my_team_id) {
        Some(t) => t,
        None => return "No opponent data available".to_string(),
    };
    let week = league.current_week;
    format!(
        "{} ({}) - Proj: {:.1}pts (team_id: {})\nUse get_team_details tool for full roster analysis",
        opponent.name,
        opponent.record(),
        opponent.projected_starter_total(week),
        opponent.id
    )
}

fn player_entry(player: &Player, week: Option<u32>) -> Value {
    let projected = match week {
        Some(w) => player.projected_for(w),
        None => player.projected_avg,
    };
    json!({
        "player_id": player.id,
        "name": player.name,
        "position": player.position,
        "team": player.pro_team,
        "lineup_slot": player.lineup_slot,
        "projected_points": round1(projected),
        "bye_week": player.bye_week(),
        "injury_status": player.injury_status,
    })
}

/// Structured roster with player ids, split into starters and bench, for the
/// `get_team_details` tool.
pub fn team_details_payload(league: &League, team: &Team) -> Value {
    let week = match league.season_phase() {
        SeasonPhase::Preseason => None,
        SeasonPhase::InSeason { week } => Some(week),
    };

    let mut starters: Vec<&Player> = team.roster.iter().filter(|p| p.is_starter()).collect();
    starters.sort_by_key(|p| slot_order(&p.lineup_slot));
    let mut bench: Vec<&Player> = team
        .roster
        .iter()
        .filter(|p| !p.is_starter() && p.lineup_slot != "IR")
        .collect();
    bench.sort_by(|a, b| {
        b.projected_avg
            .partial_cmp(&a.projected_avg)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut payload = json!({
        "team_name": team.name,
        "record": team.record(),
        "points_for": round1(team.points_for),
        "points_against": round1(team.points_against),
        "roster_strength": team.roster_strength(),
        "lineup": {
            "starters": starters.iter().map(|p| player_entry(p, week)).collect::<Vec<_>>(),
            "bench": bench.iter().map(|p| player_entry(p, week)).collect::<Vec<_>>(),
        },
        "note": "Use get_player_stats tool with player_id for detailed player analysis",
    });
    if week.is_none() {
        payload["pre_season"] = json!(true);
        payload["note"] = json!(
            "Pre-season: projections are season averages; weekly data arrives when play begins"
        );
    }
    payload
}

/// Weekly projected/actual breakdown for the `get_player_stats` tool.
/// Returns `None` when the player is on no roster.
pub fn player_stats_payload(league: &League, player_id: u64) -> Option<Value> {
    let (team, player) = league.find_player(player_id)?;

    let weekly: serde_json::Map<String, Value> = player
        .weekly
        .iter()
        .map(|(week, stat)| {
            (
                week.to_string(),
                json!({
                    "projected_points": round1(stat.projected),
                    "actual_points": round1(stat.actual),
                    "status": if stat.actual > 0.0 { "completed" } else { "projected" },
                }),
            )
        })
        .collect();

    let mut payload = json!({
        "player_id": player.id,
        "name": player.name,
        "position": player.position,
        "team": player.pro_team,
        "fantasy_team": team.name,
        "projected_avg_points": round1(player.projected_avg),
        "bye_week": player.bye_week(),
        "injury_status": player.injury_status,
        "weekly_stats": weekly,
    });
    if league.season_phase() == SeasonPhase::Preseason {
        payload["pre_season"] = json!(true);
    }
    Some(payload)
}

/// Rank the free-agent pool for the `get_waiver_wire` tool. In season the
/// cutoff is a meaningful weekly projection; pre-season falls back to season
/// averages and says so instead of failing.
pub fn waiver_payload(pool: &[Player], position: Option<&str>, size: usize, league: &League) -> Value {
    let phase = league.season_phase();
    let week = match phase {
        SeasonPhase::Preseason => None,
        SeasonPhase::InSeason { week } => Some(week),
    };

    let mut candidates: Vec<(&Player, f64)> = pool
        .iter()
        .filter(|p| position.map(|pos| p.position == pos).unwrap_or(true))
        .filter_map(|p| {
            let projected = match week {
                Some(w) => p.projected_for(w),
                None => p.projected_avg,
            };
            (projected > 2.0).then_some((p, projected))
        })
        .collect();
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(size);

    if candidates.is_empty() {
        return match position {
            Some(pos) => json!({"message": format!("No available players found for position {}", pos)}),
            None => json!({"message": "No available players found"}),
        };
    }

    let players: Vec<Value> = candidates
        .iter()
        .map(|(p, projected)| {
            json!({
                "player_id": p.id,
                "name": p.name,
                "position": p.position,
                "team": p.pro_team,
                "projected_points": round1(*projected),
                "bye_week": p.bye_week(),
                "injury_status": p.injury_status,
            })
        })
        .collect();

    let mut payload = json!({
        "position": position.unwrap_or("All"),
        "count": players.len(),
        "available_players": players,
        "note": "Use get_player_stats tool with player_id for detailed analysis of any player",
    });
    if week.is_none() {
        payload["pre_season"] = json!(true);
        payload["note"] = json!("Pre-season: ranked by season-average projection");
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Matchup, WeekStat};
    use std::collections::BTreeMap;

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

    fn fixture_league(week: u32) -> League {
        let mut qb = player(10, "Josh Allen", "QB", "QB", "BUF", 22.0);
        qb.weekly.insert(
            week.max(1),
            WeekStat {
                projected: 24.5,
                actual: 0.0,
            },
        );
        let mut rb = player(11, "Bijan Robinson", "RB", "RB", "ATL", 18.0);
        rb.injury_status = Some("QUESTIONABLE".into());
        let bench = player(12, "Jaylen Warren", "RB", "BE", "PIT", 9.0);

        let my_team = Team {
            id: 1,
            name: "My Team".into(),
            wins: 2,
            losses: 1,
            points_for: 310.0,
            points_against: 290.0,
            owners: vec!["ME".into()],
            roster: vec![qb, rb, bench],
        };
        let rival = Team {
            id: 2,
            name: "Rival".into(),
            wins: 3,
            losses: 0,
            points_for: 350.0,
            points_against: 250.0,
            owners: vec!["THEM".into()],
            roster: vec![player(20, "Lamar Jackson", "QB", "QB", "BAL", 21.0)],
        };

        League {
            id: 1,
            season: 2025,
            name: "Test".into(),
            current_week: week,
            teams: vec![my_team, rival],
            schedule: vec![Matchup {
                week: week.max(1),
                home_team: 1,
                away_team: 2,
                home_points: 0.0,
                away_points: 0.0,
            }],
        }
    }

    #[test]
    fn test_roster_summary_layout() {
        let league = fixture_league(4);
        let summary = roster_summary(&league, league.team(1).unwrap());
        assert!(summary.starts_with("STARTERS:\n"));
        assert!(summary.contains("QB: Josh Allen (QB) - 24.5pts (Bye: W7)"));
        assert!(summary.contains("[QUESTIONABLE]"));
        assert!(summary.contains("BENCH:\nJaylen Warren (RB) - 9.0pts"));
    }

    #[test]
    fn test_standings_sorted_by_wins_then_points() {
        let league = fixture_league(4);
        let standings = standings_summary(&league);
        let first = standings.lines().next().unwrap();
        assert!(first.starts_with("1. Rival (3-0)"));
        assert!(first.contains("(team_id: 2)"));
    }

    #[test]
    fn test_opponent_summary() {
        let league = fixture_league(4);
        let opp = opponent_summary(&league, 1);
        assert!(opp.starts_with("Rival (3-0) - Proj:"));
        assert!(opp.contains("get_team_details"));
    }

    #[test]
    fn test_team_details_payload_in_season() {
        let league = fixture_league(4);
        let payload = team_details_payload(&league, league.team(1).unwrap());
        assert_eq!(payload["team_name"], "My Team");
        assert_eq!(payload["lineup"]["starters"].as_array().unwrap().len(), 2);
        assert_eq!(payload["lineup"]["bench"][0]["player_id"], 12);
        assert!(payload.get("pre_season").is_none());
    }

    #[test]
    fn test_preseason_payload_flags_reduced_capability() {
        let league = fixture_league(0);
        let payload = team_details_payload(&league, league.team(1).unwrap());
        assert_eq!(payload["pre_season"], true);

        let stats = player_stats_payload(&league, 10).unwrap();
        assert_eq!(stats["pre_season"], true);
    }

    #[test]
    fn test_player_stats_payload() {
        let league = fixture_league(4);
        let payload = player_stats_payload(&league, 10).unwrap();
        assert_eq!(payload["name"], "Josh Allen");
        assert_eq!(payload["fantasy_team"], "My Team");
        assert_eq!(payload["weekly_stats"]["4"]["projected_points"], 24.5);
        assert!(player_stats_payload(&league, 9999).is_none());
    }

    #[test]
    fn test_waiver_payload_filters_and_sorts() {
        let league = fixture_league(4);
        let pool = vec![
            player(30, "Deep Bench", "RB", "BE", "DAL", 1.0), // below cutoff
            player(31, "Hot Pickup", "RB", "BE", "DET", 12.0),
            player(32, "Backup QB", "QB", "BE", "CHI", 8.0),
        ];
        let payload = waiver_payload(&pool, Some("RB"), 5, &league);
        assert_eq!(payload["count"], 1);
        assert_eq!(payload["available_players"][0]["name"], "Hot Pickup");

        let none = waiver_payload(&pool, Some("TE"), 5, &league);
        assert!(none["message"].as_str().unwrap().contains("TE"));
    }
}
