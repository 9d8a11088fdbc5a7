//! Voxyl API response types
//!
//! Only the fields the stats pipeline reads are modelled; everything else in
//! a response is ignored. Missing counters decode as zero.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::stats::StatsSnapshot;

/// `player/stats/overall/{uuid}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OverallStats {
    #[serde(default)]
    pub level: u32,
    /// Experience earned inside the current level
    #[serde(default)]
    pub exp: u32,
    #[serde(default, rename = "weightedwins")]
    pub weighted_wins: u32,
}

/// `player/stats/game/{uuid}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameStats {
    /// Counters per game mode
    #[serde(default)]
    pub stats: HashMap<String, ModeStats>,
}

/// Counters for one game mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ModeStats {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub finals: u32,
    #[serde(default)]
    pub beds: u32,
}

impl GameStats {
    /// Counters summed over every game mode
    pub fn totals(&self) -> ModeStats {
        self.stats
            .values()
            .fold(ModeStats::default(), |acc, mode| ModeStats {
                wins: acc.wins.saturating_add(mode.wins),
                kills: acc.kills.saturating_add(mode.kills),
                finals: acc.finals.saturating_add(mode.finals),
                beds: acc.beds.saturating_add(mode.beds),
            })
    }
}

/// Combine the two stats responses into one snapshot
pub fn snapshot_from(overall: &OverallStats, game: &GameStats) -> StatsSnapshot {
    let totals = game.totals();
    StatsSnapshot {
        wins: totals.wins,
        weighted_wins: overall.weighted_wins,
        kills: totals.kills,
        finals: totals.finals,
        beds_broken: totals.beds,
        level: overall.level,
        partial_experience: overall.exp,
    }
}

/// `player/info/{uuid}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    #[serde(default)]
    pub last_login_name: Option<String>,
    /// Unix seconds; absent for players who never joined
    #[serde(default)]
    pub last_login_time: Option<i64>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Discord IDs arrive as either JSON numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum DiscordIdValue {
    Number(u64),
    Text(String),
}

impl DiscordIdValue {
    pub(crate) fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(id) => Some(*id),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// `integration/discord_from_player/{uuid}`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DiscordLookup {
    #[serde(default)]
    pub id: Option<DiscordIdValue>,
}

/// `integration/player_from_discord/{discord_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PlayerLookup {
    #[serde(default)]
    pub uuid: Option<String>,
}
