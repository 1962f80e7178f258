//! Normalized league model built from the provider's raw JSON.
//!
//! Everything downstream (prompt summaries, tool payloads) reads these
//! structs; the raw ESPN field layout never leaks past `raw.rs`.

use std::collections::BTreeMap;

// ============================================================================
// Id tables
// ============================================================================

/// ESPN `defaultPositionId` → position label.
pub fn position_name(id: i32) -> &'static str {
    match id {
        1 => "QB",
        2 => "RB",
        3 => "WR",
        4 => "TE",
        5 => "K",
        16 => "D/ST",
        _ => "N/A",
    }
}

/// ESPN `lineupSlotId` → slot label. Bench is "BE", injured reserve "IR".
pub fn lineup_slot_name(id: i32) -> &'static str {
    match id {
        0 => "QB",
        2 => "RB",
        4 => "WR",
        6 => "TE",
        7 => "OP",
        16 => "D/ST",
        17 => "K",
        20 => "BE",
        21 => "IR",
        23 => "RB/WR/TE",
        _ => "BE",
    }
}

/// ESPN `proTeamId` → NFL team abbreviation.
pub fn pro_team_abbrev(id: i32) -> &'static str {
    match id {
        1 => "ATL",
        2 => "BUF",
        3 => "CHI",
        4 => "CIN",
        5 => "CLE",
        6 => "DAL",
        7 => "DEN",
        8 => "DET",
        9 => "GB",
        10 => "TEN",
        11 => "IND",
        12 => "KC",
        13 => "LV",
        14 => "LAR",
        15 => "MIA",
        16 => "MIN",
        17 => "NE",
        18 => "NO",
        19 => "NYG",
        20 => "NYJ",
        21 => "PHI",
        22 => "ARI",
        23 => "PIT",
        24 => "LAC",
        25 => "SF",
        26 => "SEA",
        27 => "TB",
        28 => "WSH",
        29 => "CAR",
        30 => "JAX",
        33 => "BAL",
        34 => "HOU",
        _ => "FA",
    }
}

/// 2025 NFL bye weeks, keyed by team abbreviation.
pub fn nfl_bye_week(team: &str) -> Option<u32> {
    let week = match team {
        "PIT" | "CHI" | "GB" | "ATL" => 5,
        "HOU" | "MIN" => 6,
        "BAL" | "BUF" => 7,
        "ARI" | "DET" | "JAX" | "LV" | "LAR" | "SEA" => 8,
        "CLE" | "NYJ" | "PHI" | "TB" => 9,
        "CIN" | "DAL" | "KC" | "TEN" => 10,
        "IND" | "NO" => 11,
        "DEN" | "LAC" | "MIA" | "WSH" => 12,
        "CAR" | "NE" | "NYG" | "SF" => 14,
        _ => return None,
    };
    Some(week)
}

/// Display order for starting lineup slots.
pub fn slot_order(slot: &str) -> usize {
    const ORDER: [&str; 7] = ["QB", "RB", "WR", "TE", "RB/WR/TE", "K", "D/ST"];
    ORDER.iter().position(|s| *s == slot).unwrap_or(999)
}

// ============================================================================
// Model
// ============================================================================

/// Per-week projected/actual fantasy points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeekStat {
    pub projected: f64,
    pub actual: f64,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub position: String,
    pub pro_team: String,
    pub lineup_slot: String,
    pub injury_status: Option<String>,
    /// Season-level projected average points per week.
    pub projected_avg: f64,
    /// Weekly stat lines keyed by scoring period. Week 0 entries are season
    /// aggregates on the wire and are never stored here.
    pub weekly: BTreeMap<u32, WeekStat>,
}

impl Player {
    pub fn bye_week(&self) -> Option<u32> {
        nfl_bye_week(&self.pro_team)
    }

    /// Projection for a specific week, falling back to the season average
    /// when the provider has no weekly line yet.
    pub fn projected_for(&self, week: u32) -> f64 {
        match self.weekly.get(&week) {
            Some(stat) if stat.projected > 0.0 => stat.projected,
            _ => self.projected_avg,
        }
    }

    pub fn is_starter(&self) -> bool {
        self.lineup_slot != "BE" && self.lineup_slot != "IR"
    }
}

#[derive(Debug, Clone)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub points_for: f64,
    pub points_against: f64,
    /// Normalized owner ids (uppercase, braces stripped).
    pub owners: Vec<String>,
    pub roster: Vec<Player>,
}

impl Team {
    pub fn record(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }

    /// Sum of season-average projections across the roster.
    pub fn roster_strength(&self) -> f64 {
        let total: f64 = self.roster.iter().map(|p| p.projected_avg).sum();
        (total * 100.0).round() / 100.0
    }

    /// Sum of this week's projections across starters.
    pub fn projected_starter_total(&self, week: u32) -> f64 {
        self.roster
            .iter()
            .filter(|p| p.is_starter())
            .map(|p| p.projected_for(week))
            .sum()
    }
}

/// Head-to-head pairing for one scoring period.
#[derive(Debug, Clone)]
pub struct Matchup {
    pub week: u32,
    pub home_team: u32,
    pub away_team: u32,
    pub home_points: f64,
    pub away_points: f64,
}

/// Whether the season has started. Derived once from the provider's scoring
/// period counter; downstream code matches on this instead of inferring the
/// phase from empty rosters or missing matchups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonPhase {
    Preseason,
    InSeason { week: u32 },
}

#[derive(Debug, Clone)]
pub struct League {
    pub id: u64,
    pub season: u16,
    pub name: String,
    /// Current scoring period; 0 before the season starts.
    pub current_week: u32,
    pub teams: Vec<Team>,
    pub schedule: Vec<Matchup>,
}

impl League {
    pub fn season_phase(&self) -> SeasonPhase {
        if self.current_week == 0 {
            SeasonPhase::Preseason
        } else {
            SeasonPhase::InSeason {
                week: self.current_week,
            }
        }
    }

    pub fn team(&self, id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Search every roster for a player id.
    pub fn find_player(&self, player_id: u64) -> Option<(&Team, &Player)> {
        self.teams.iter().find_map(|team| {
            team.roster
                .iter()
                .find(|p| p.id == player_id)
                .map(|p| (team, p))
        })
    }

    /// The team facing `team_id` in the current week, if any.
    pub fn opponent_of(&self, team_id: u32) -> Option<&Team> {
        let week = match self.season_phase() {
            SeasonPhase::Preseason => return None,
            SeasonPhase::InSeason { week } => week,
        };
        self.schedule
            .iter()
            .filter(|m| m.week == week)
            .find_map(|m| {
                if m.home_team == team_id {
                    self.team(m.away_team)
                } else if m.away_team == team_id {
                    self.team(m.home_team)
                } else {
                    None
                }
            })
    }

    /// Identify the caller's team by SWID owner match. Brace and case
    /// differences between the cookie and the roster data are normalized away.
    pub fn identify_my_team(&self, swid: &str) -> Option<&Team> {
        let target = normalize_owner_id(swid);
        self.teams
            .iter()
            .find(|t| t.owners.iter().any(|o| *o == target))
    }

    /// Average points per completed week, 0 before week 2.
    pub fn avg_points_per_week(&self, team: &Team) -> f64 {
        if self.current_week > 1 {
            team.points_for / (self.current_week - 1).max(1) as f64
        } else {
            0.0
        }
    }
}

pub fn normalize_owner_id(id: &str) -> String {
    id.trim_matches(|c| c == '{' || c == '}').to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u64, slot: &str, pro_team: &str, avg: f64) -> Player {
        Player {
            id,
            name: format!("Player {}", id),
            position: "RB".into(),
            pro_team: pro_team.into(),
            lineup_slot: slot.into(),
            injury_status: None,
            projected_avg: avg,
            weekly: BTreeMap::new(),
        }
    }

    fn team(id: u32, owners: Vec<&str>) -> Team {
        Team {
            id,
            name: format!("Team {}", id),
            wins: 0,
            losses: 0,
            points_for: 0.0,
            points_against: 0.0,
            owners: owners.into_iter().map(String::from).collect(),
            roster: vec![],
        }
    }

    fn league(week: u32, teams: Vec<Team>) -> League {
        League {
            id: 1,
            season: 2025,
            name: "Test League".into(),
            current_week: week,
            teams,
            schedule: vec![],
        }
    }

    #[test]
    fn test_season_phase() {
        assert_eq!(league(0, vec![]).season_phase(), SeasonPhase::Preseason);
        assert_eq!(
            league(3, vec![]).season_phase(),
            SeasonPhase::InSeason { week: 3 }
        );
    }

    #[test]
    fn test_projected_for_falls_back_to_average() {
        let mut p = player(1, "RB", "KC", 11.5);
        assert_eq!(p.projected_for(4), 11.5);
        p.weekly.insert(
            4,
            WeekStat {
                projected: 17.2,
                actual: 0.0,
            },
        );
        assert_eq!(p.projected_for(4), 17.2);
    }

    #[test]
    fn test_identify_my_team_normalizes_swid() {
        let lg = league(
            1,
            vec![
                team(1, vec!["AAAA-BBBB"]),
                team(2, vec!["CCCC-DDDD", "EEEE-FFFF"]),
            ],
        );
        let found = lg.identify_my_team("{cccc-dddd}").unwrap();
        assert_eq!(found.id, 2);
        assert!(lg.identify_my_team("{9999}").is_none());
    }

    #[test]
    fn test_opponent_of_uses_current_week() {
        let mut lg = league(2, vec![team(1, vec![]), team(2, vec![]), team(3, vec![])]);
        lg.schedule = vec![
            Matchup {
                week: 1,
                home_team: 1,
                away_team: 3,
                home_points: 0.0,
                away_points: 0.0,
            },
            Matchup {
                week: 2,
                home_team: 2,
                away_team: 1,
                home_points: 0.0,
                away_points: 0.0,
            },
        ];
        assert_eq!(lg.opponent_of(1).unwrap().id, 2);
        assert!(lg.opponent_of(3).is_none());
    }

    #[test]
    fn test_opponent_of_preseason_is_none() {
        let mut lg = league(0, vec![team(1, vec![]), team(2, vec![])]);
        lg.schedule = vec![Matchup {
            week: 1,
            home_team: 1,
            away_team: 2,
            home_points: 0.0,
            away_points: 0.0,
        }];
        assert!(lg.opponent_of(1).is_none());
    }

    #[test]
    fn test_starter_projection_total() {
        let mut t = team(1, vec![]);
        t.roster = vec![
            player(1, "QB", "BUF", 20.0),
            player(2, "RB", "KC", 15.0),
            player(3, "BE", "DET", 12.0),
            player(4, "IR", "SF", 18.0),
        ];
        assert_eq!(t.projected_starter_total(1), 35.0);
    }

    #[test]
    fn test_bye_week_table() {
        assert_eq!(nfl_bye_week("KC"), Some(10));
        assert_eq!(nfl_bye_week("PIT"), Some(5));
        assert_eq!(nfl_bye_week("FA"), None);
    }
}
