//! HTTP client for the ESPN fantasy football read API.
//!
//! Authentication is the session cookie pair (`espn_s2`, `SWID`); public
//! leagues work without it. Errors are split into the retryable
//! `Unavailable` class (network, auth, throttling, 5xx) and the terminal
//! `NotFound` class so callers can apply backoff only where it helps.

use crate::model::{League, Player};
use crate::raw::{FreeAgentDoc, LeagueDoc};
use reqwest::StatusCode;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl";

/// Filter sent via `x-fantasy-filter` for the free-agent pool: unrostered
/// players only, sorted by ownership so the relevant names come back first.
fn free_agent_filter(limit: usize) -> String {
    serde_json::json!({
        "players": {
            "filterStatus": {"value": ["FREEAGENT", "WAIVERS"]},
            "limit": limit,
            "sortPercOwned": {"sortAsc": false, "sortPriority": 1}
        }
    })
    .to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    /// Network, auth, or server-side trouble. Worth retrying.
    #[error("fantasy provider unavailable: {0}")]
    Unavailable(String),
    /// The requested entity does not exist. Retrying won't help.
    #[error("{0} not found")]
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct EspnClient {
    http: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
    league_id: u64,
    season: u16,
}

impl EspnClient {
    pub fn new(
        league_id: u64,
        season: u16,
        credentials: Option<(&str, &str)>,
    ) -> anyhow::Result<Self> {
        let cookie =
            credentials.map(|(espn_s2, swid)| format!("espn_s2={}; SWID={}", espn_s2, swid));
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie,
            league_id,
            season,
        })
    }

    /// Point the client at a different host (tests, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn league_id(&self) -> u64 {
        self.league_id
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    fn league_url(&self) -> String {
        format!(
            "{}/seasons/{}/segments/0/leagues/{}",
            self.base_url, self.season, self.league_id
        )
    }

    /// Fetch the full league document: teams, rosters, matchups, settings.
    pub async fn fetch_league(&self) -> Result<League, LeagueError> {
        let request = self
            .http
            .get(self.league_url())
            .query(&[
                ("view", "mTeam"),
                ("view", "mRoster"),
                ("view", "mMatchup"),
                ("view", "mSettings"),
            ])
            .header("Accept", "application/json");
        let request = match &self.cookie {
            Some(cookie) => request.header("Cookie", cookie.clone()),
            None => request,
        };

        tracing::debug!("Fetching league {} ({})", self.league_id, self.season);
        let response = request
            .send()
            .await
            .map_err(|e| LeagueError::Unavailable(e.to_string()))?;
        let response = self.check_status(response, &format!("league {}", self.league_id))?;

        let doc: LeagueDoc = response
            .json()
            .await
            .map_err(|e| LeagueError::Unavailable(format!("malformed league response: {}", e)))?;
        Ok(doc.into_league(self.league_id, self.season))
    }

    /// Fetch the unrostered player pool for the given scoring period.
    /// Position filtering happens caller-side on the normalized players.
    pub async fn fetch_free_agents(
        &self,
        week: u32,
        limit: usize,
    ) -> Result<Vec<Player>, LeagueError> {
        let week_param = week.to_string();
        let request = self
            .http
            .get(self.league_url())
            .query(&[
                ("view", "kona_player_info"),
                ("scoringPeriodId", week_param.as_str()),
            ])
            .header("Accept", "application/json")
            .header("x-fantasy-filter", free_agent_filter(limit));
        let request = match &self.cookie {
            Some(cookie) => request.header("Cookie", cookie.clone()),
            None => request,
        };

        tracing::debug!("Fetching free agents for week {} (limit {})", week, limit);
        let response = request
            .send()
            .await
            .map_err(|e| LeagueError::Unavailable(e.to_string()))?;
        let response = self.check_status(response, "free agent pool")?;

        let doc: FreeAgentDoc = response.json().await.map_err(|e| {
            LeagueError::Unavailable(format!("malformed free agent response: {}", e))
        })?;
        Ok(doc
            .players
            .into_iter()
            .map(|entry| entry.player.into_player(None))
            .collect())
    }

    fn check_status(
        &self,
        response: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response, LeagueError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::NOT_FOUND => Err(LeagueError::NotFound(what.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(LeagueError::Unavailable(
                format!("authentication rejected ({}); check ESPN_S2 and SWID", status),
            )),
            _ => Err(LeagueError::Unavailable(format!(
                "provider returned {} for {}",
                status, what
            ))),
        }
    }
}
