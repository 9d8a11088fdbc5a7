//! Link entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::player::PlayerId;

/// A Discord account linked to a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLink {
    pub discord_id: u64,
    pub player_id: PlayerId,
    pub linked_at: DateTime<Utc>,
}
