//! Session delta reports
//!
//! Combines a stored baseline with a live snapshot. Nothing here writes to
//! storage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::repository::SessionRepository;
use super::session::SessionSlot;
use super::store::not_active;
use crate::domain::player::PlayerId;
use crate::domain::progression::ProgressionDelta;
use crate::domain::stats::{CounterDeltas, StatsSnapshot, StatsSource};
use crate::error::Result;

/// Display-ready progress for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub player_id: PlayerId,
    pub slot: SessionSlot,
    pub counters: CounterDeltas,
    pub progression: ProgressionDelta,
    /// When the session's baseline was captured
    pub active_since: DateTime<Utc>,
    pub baseline: StatsSnapshot,
    pub live: StatsSnapshot,
}

impl SessionReport {
    /// Build a report from a baseline and a live snapshot
    pub fn compute(
        player_id: PlayerId,
        slot: SessionSlot,
        baseline: StatsSnapshot,
        live: StatsSnapshot,
        active_since: DateTime<Utc>,
    ) -> Self {
        Self {
            player_id,
            slot,
            counters: live.counter_deltas_since(&baseline),
            progression: live.progression_since(&baseline),
            active_since,
            baseline,
            live,
        }
    }
}

/// Builds [`SessionReport`]s from stored sessions and live stats
#[derive(Clone)]
pub struct SessionReporter {
    repository: SessionRepository,
    source: Arc<dyn StatsSource>,
}

impl std::fmt::Debug for SessionReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionReporter")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

impl SessionReporter {
    pub fn new(repository: SessionRepository, source: Arc<dyn StatsSource>) -> Self {
        Self { repository, source }
    }

    /// Report progress for an active session
    ///
    /// Fails with `SessionNotActive` before touching the stats source when
    /// the slot is empty.
    pub async fn build_report(&self, player: &PlayerId, slot: SessionSlot) -> Result<SessionReport> {
        let session = self
            .repository
            .get(player, slot)
            .await?
            .ok_or_else(|| not_active(player, slot))?;

        let live = self.source.fetch(player).await?;

        debug!(player = %player, slot = %slot, "Built session report");
        Ok(SessionReport::compute(
            session.player_id,
            session.slot,
            session.baseline,
            live,
            session.created_at,
        ))
    }
}
