//! Stats source trait

use async_trait::async_trait;

use crate::domain::player::PlayerId;
use crate::error::Result;

use super::snapshot::StatsSnapshot;

/// Provider of current cumulative stats for a player
///
/// Implementations return [`crate::Error::SourceUnavailable`] when the
/// player has no record; callers must not substitute zeroes. Retrying
/// transient failures is the implementation's responsibility.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch one complete snapshot for `player`
    async fn fetch(&self, player: &PlayerId) -> Result<StatsSnapshot>;
}
