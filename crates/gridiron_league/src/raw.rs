//! Serde mapping of the ESPN fantasy v3 league document.
//!
//! Only the fields the summaries and tools consume are mapped; everything
//! else in the (very large) wire document is ignored. Conversion into the
//! normalized `model` types happens here so `client.rs` stays a transport.

use crate::model::{
    lineup_slot_name, normalize_owner_id, position_name, pro_team_abbrev, League, Matchup, Player,
    Team, WeekStat,
};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueDoc {
    #[serde(default)]
    pub scoring_period_id: u32,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub teams: Vec<RawTeam>,
    #[serde(default)]
    pub schedule: Vec<RawMatchup>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub current_matchup_period: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    pub id: u32,
    /// Current documents carry a single `name`; older seasons split it.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub record: RawRecord,
    /// Owner entries are either bare SWID strings or `{"id": ...}` objects
    /// depending on the view; both appear in the wild.
    #[serde(default)]
    pub owners: Vec<serde_json::Value>,
    #[serde(default)]
    pub roster: RawRoster,
}

impl RawTeam {
    fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            if !name.is_empty() {
                return name.clone();
            }
        }
        let location = self.location.as_deref().unwrap_or("");
        let nickname = self.nickname.as_deref().unwrap_or("");
        let combined = format!("{} {}", location, nickname);
        let combined = combined.trim().to_string();
        if combined.is_empty() {
            format!("Team {}", self.id)
        } else {
            combined
        }
    }

    fn owner_ids(&self) -> Vec<String> {
        self.owners
            .iter()
            .filter_map(|owner| match owner {
                serde_json::Value::String(s) => Some(normalize_owner_id(s)),
                serde_json::Value::Object(map) => map
                    .get("id")
                    .and_then(|v| v.as_str())
                    .map(normalize_owner_id),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default)]
    pub overall: RawOverall,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOverall {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub points_for: f64,
    #[serde(default)]
    pub points_against: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoster {
    #[serde(default)]
    pub entries: Vec<RawRosterEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRosterEntry {
    #[serde(default)]
    pub lineup_slot_id: i32,
    pub player_pool_entry: RawPlayerPoolEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayerPoolEntry {
    pub player: RawPlayer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayer {
    pub id: u64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub default_position_id: i32,
    #[serde(default)]
    pub pro_team_id: i32,
    #[serde(default)]
    pub injury_status: Option<String>,
    #[serde(default)]
    pub stats: Vec<RawStatLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatLine {
    #[serde(default)]
    pub scoring_period_id: u32,
    /// 0 = actual, 1 = projected.
    #[serde(default)]
    pub stat_source_id: u32,
    #[serde(default)]
    pub applied_total: Option<f64>,
    #[serde(default)]
    pub applied_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchup {
    #[serde(default)]
    pub matchup_period_id: u32,
    #[serde(default)]
    pub home: Option<RawMatchupSide>,
    #[serde(default)]
    pub away: Option<RawMatchupSide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchupSide {
    pub team_id: u32,
    #[serde(default)]
    pub total_points: f64,
}

/// Free-agent response for the `kona_player_info` view.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeAgentDoc {
    #[serde(default)]
    pub players: Vec<RawPlayerPoolEntry>,
}

// ============================================================================
// Conversion
// ============================================================================

impl RawPlayer {
    /// Fold the wire stat lines into the normalized player. Scoring period 0
    /// rows are season aggregates: the projected one (source 1) supplies the
    /// per-week average, everything else in period 0 is dropped.
    pub fn into_player(self, lineup_slot_id: Option<i32>) -> Player {
        let mut projected_avg = 0.0;
        let mut weekly: BTreeMap<u32, WeekStat> = BTreeMap::new();

        for line in &self.stats {
            if line.scoring_period_id == 0 {
                if line.stat_source_id == 1 {
                    projected_avg = line
                        .applied_average
                        .or(line.applied_total.map(|t| t / 17.0))
                        .unwrap_or(0.0);
                }
                continue;
            }
            let entry = weekly.entry(line.scoring_period_id).or_default();
            let total = line.applied_total.unwrap_or(0.0);
            if line.stat_source_id == 1 {
                entry.projected = total;
            } else {
                entry.actual = total;
            }
        }

        let injury_status = self.injury_status.filter(|s| s != "ACTIVE" && s != "NORMAL");

        Player {
            id: self.id,
            name: if self.full_name.is_empty() {
                format!("Player {}", self.id)
            } else {
                self.full_name
            },
            position: position_name(self.default_position_id).to_string(),
            pro_team: pro_team_abbrev(self.pro_team_id).to_string(),
            lineup_slot: lineup_slot_name(lineup_slot_id.unwrap_or(20)).to_string(),
            injury_status,
            projected_avg: (projected_avg * 100.0).round() / 100.0,
            weekly,
        }
    }
}

impl LeagueDoc {
    pub fn into_league(self, league_id: u64, season: u16) -> League {
        let current_week = if self.scoring_period_id > 0 {
            self.scoring_period_id
        } else {
            self.status.current_matchup_period
        };

        let teams = self
            .teams
            .into_iter()
            .map(|raw| {
                let name = raw.display_name();
                let owners = raw.owner_ids();
                let roster = raw
                    .roster
                    .entries
                    .into_iter()
                    .map(|entry| {
                        entry
                            .player_pool_entry
                            .player
                            .into_player(Some(entry.lineup_slot_id))
                    })
                    .collect();
                Team {
                    id: raw.id,
                    name,
                    wins: raw.record.overall.wins,
                    losses: raw.record.overall.losses,
                    points_for: raw.record.overall.points_for,
                    points_against: raw.record.overall.points_against,
                    owners,
                    roster,
                }
            })
            .collect();

        let schedule = self
            .schedule
            .into_iter()
            .filter_map(|m| {
                let home = m.home?;
                let away = m.away?;
                Some(Matchup {
                    week: m.matchup_period_id,
                    home_team: home.team_id,
                    away_team: away.team_id,
                    home_points: home.total_points,
                    away_points: away.total_points,
                })
            })
            .collect();

        League {
            id: league_id,
            season,
            name: self.settings.name,
            current_week,
            teams,
            schedule,
        }
    }
}
