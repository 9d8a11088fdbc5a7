//! Voxyl API routes used for session snapshots and account integration

/// A Voxyl API route with its path parameters filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    PlayerInfo(&'a str),
    PlayerOverall(&'a str),
    PlayerGameStats(&'a str),
    DiscordFromPlayer(&'a str),
    PlayerFromDiscord(u64),
}

impl Endpoint<'_> {
    /// Path relative to the API base URL, without a leading slash
    pub fn path(&self) -> String {
        match self {
            Self::PlayerInfo(uuid) => format!("player/info/{}", uuid),
            Self::PlayerOverall(uuid) => format!("player/stats/overall/{}", uuid),
            Self::PlayerGameStats(uuid) => format!("player/stats/game/{}", uuid),
            Self::DiscordFromPlayer(uuid) => format!("integration/discord_from_player/{}", uuid),
            Self::PlayerFromDiscord(id) => format!("integration/player_from_discord/{}", id),
        }
    }
}
