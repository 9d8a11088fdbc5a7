//! In-memory stats source
//!
//! Holds snapshots keyed by player, for tests and callers that supply stats
//! themselves.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::player::PlayerId;
use crate::error::{Error, Result};

use super::snapshot::StatsSnapshot;
use super::source::StatsSource;

/// Stats source backed by a shared map
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatsSource {
    snapshots: Arc<RwLock<HashMap<PlayerId, StatsSnapshot>>>,
    fetches: Arc<AtomicUsize>,
}

impl InMemoryStatsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the live snapshot returned for `player`
    pub async fn set(&self, player: &PlayerId, snapshot: StatsSnapshot) {
        self.snapshots.write().await.insert(player.clone(), snapshot);
    }

    /// Forget `player`, making later fetches fail with `SourceUnavailable`
    pub async fn remove(&self, player: &PlayerId) {
        self.snapshots.write().await.remove(player);
    }

    /// Number of fetches served so far, successful or not
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsSource for InMemoryStatsSource {
    async fn fetch(&self, player: &PlayerId) -> Result<StatsSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.snapshots
            .read()
            .await
            .get(player)
            .copied()
            .ok_or_else(|| Error::SourceUnavailable(player.to_string()))
    }
}
