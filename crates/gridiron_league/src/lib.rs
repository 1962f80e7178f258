pub mod client;
pub mod model;
pub mod raw;
pub mod summary;

pub use client::{EspnClient, LeagueError};
pub use model::{League, Matchup, Player, SeasonPhase, Team, WeekStat};
