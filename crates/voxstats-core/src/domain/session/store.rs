//! Session store
//!
//! Owns the per-(player, slot) lifecycle: `absent -> active` on create,
//! `active -> active` with a fresh baseline on reset, `active -> absent`
//! on end. Stats are fetched before any row is written, so a source failure
//! leaves storage untouched.

use std::collections::BTreeSet;
use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::report::SessionReporter;
use super::repository::SessionRepository;
use super::session::{Session, SessionSlot, capture_time};
use crate::domain::player::PlayerId;
use crate::domain::stats::StatsSource;
use crate::error::{Error, Result};

/// Session lifecycle operations keyed by (player, slot)
#[derive(Clone)]
pub struct SessionStore {
    repository: SessionRepository,
    source: Arc<dyn StatsSource>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store over `pool`, taking snapshots from `source`
    pub fn new(pool: SqlitePool, source: Arc<dyn StatsSource>) -> Self {
        Self {
            repository: SessionRepository::new(pool),
            source,
        }
    }

    /// Get the underlying repository
    pub fn repository(&self) -> &SessionRepository {
        &self.repository
    }

    /// Reporter sharing this store's repository and stats source
    pub fn reporter(&self) -> SessionReporter {
        SessionReporter::new(self.repository.clone(), Arc::clone(&self.source))
    }

    /// Look up a session without side effects
    pub async fn get(&self, player: &PlayerId, slot: SessionSlot) -> Result<Option<Session>> {
        self.repository.get(player, slot).await
    }

    /// Start a session with a freshly fetched baseline
    ///
    /// Fails with `SessionAlreadyActive` if the slot is occupied, leaving
    /// the existing row unchanged. Two racing creates for the same key
    /// produce exactly one row; the loser also gets `SessionAlreadyActive`.
    pub async fn create(&self, player: &PlayerId, slot: SessionSlot) -> Result<Session> {
        if self.repository.get(player, slot).await?.is_some() {
            debug!(player = %player, slot = %slot, "Session already active");
            return Err(already_active(player, slot));
        }

        let snapshot = self.source.fetch(player).await?;
        let session = Session::new(player.clone(), slot, snapshot);

        if !self.repository.insert(&session).await? {
            warn!(player = %player, slot = %slot, "Lost session create race");
            return Err(already_active(player, slot));
        }

        info!(player = %player, slot = %slot, "Session started");
        Ok(session)
    }

    /// Replace a session's baseline with a freshly fetched snapshot
    ///
    /// The previous baseline is discarded, so any progress not yet viewed
    /// through a report is lost. Callers that want to show the finished
    /// window must build the report before resetting.
    pub async fn reset(&self, player: &PlayerId, slot: SessionSlot) -> Result<Session> {
        if self.repository.get(player, slot).await?.is_none() {
            return Err(not_active(player, slot));
        }

        let snapshot = self.source.fetch(player).await?;
        let created_at = capture_time();

        if !self
            .repository
            .replace_baseline(player, slot, &snapshot, created_at)
            .await?
        {
            warn!(player = %player, slot = %slot, "Session ended during reset");
            return Err(not_active(player, slot));
        }

        info!(player = %player, slot = %slot, "Session reset");
        Ok(Session {
            player_id: player.clone(),
            slot,
            baseline: snapshot,
            created_at,
        })
    }

    /// End a session by deleting its row
    ///
    /// Ending an empty slot is reported as `SessionNotActive`, not treated
    /// as success.
    pub async fn end(&self, player: &PlayerId, slot: SessionSlot) -> Result<()> {
        self.repository.end(player, slot).await
    }

    /// Slots with an active session for `player`
    pub async fn list_active(&self, player: &PlayerId) -> Result<BTreeSet<SessionSlot>> {
        self.repository.list_active(player).await
    }
}

fn already_active(player: &PlayerId, slot: SessionSlot) -> Error {
    Error::SessionAlreadyActive {
        player: player.to_string(),
        slot: slot.number(),
    }
}

pub(crate) fn not_active(player: &PlayerId, slot: SessionSlot) -> Error {
    Error::SessionNotActive {
        player: player.to_string(),
        slot: slot.number(),
    }
}
