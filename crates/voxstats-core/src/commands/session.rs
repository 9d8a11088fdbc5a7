//! Session commands
//!
//! Every command acts on the player linked to `discord_id`, except `view`,
//! which may also target an explicit player.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::linking::LinkRepository;
use crate::domain::player::PlayerId;
use crate::domain::session::{
    Session, SessionReport, SessionRepository, SessionSlot, SessionStore,
};
use crate::domain::stats::StatsSource;
use crate::error::{Error, Result};

/// Result of viewing a slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ViewOutcome {
    /// The slot was active; here is its progress
    Report(SessionReport),
    /// The slot was empty, so a session was started in it
    Created(Session),
}

/// Result of resetting with a summary of the finished window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetSummary {
    /// Progress up to the moment of the reset
    pub finished: SessionReport,
    /// The session with its new baseline
    pub session: Session,
}

/// Player linked to a Discord account
pub async fn linked_player(pool: &SqlitePool, discord_id: u64) -> Result<PlayerId> {
    LinkRepository::new(pool.clone()).require(discord_id).await
}

/// Start a session in `slot`
pub async fn start(
    pool: &SqlitePool,
    source: Arc<dyn StatsSource>,
    discord_id: u64,
    slot: SessionSlot,
) -> Result<Session> {
    let player = linked_player(pool, discord_id).await?;
    SessionStore::new(pool.clone(), source)
        .create(&player, slot)
        .await
}

/// End the session in `slot`
pub async fn end(pool: &SqlitePool, discord_id: u64, slot: SessionSlot) -> Result<()> {
    let player = linked_player(pool, discord_id).await?;
    SessionRepository::new(pool.clone()).end(&player, slot).await
}

/// Re-baseline the session in `slot`, discarding its progress
pub async fn reset(
    pool: &SqlitePool,
    source: Arc<dyn StatsSource>,
    discord_id: u64,
    slot: SessionSlot,
) -> Result<Session> {
    let player = linked_player(pool, discord_id).await?;
    SessionStore::new(pool.clone(), source)
        .reset(&player, slot)
        .await
}

/// Report the finished window, then re-baseline the session
///
/// The report is built before the reset; once the baseline is replaced the
/// old progress cannot be recovered.
pub async fn reset_with_summary(
    pool: &SqlitePool,
    source: Arc<dyn StatsSource>,
    discord_id: u64,
    slot: SessionSlot,
) -> Result<ResetSummary> {
    let player = linked_player(pool, discord_id).await?;
    let store = SessionStore::new(pool.clone(), source);

    let finished = store.reporter().build_report(&player, slot).await?;
    let session = store.reset(&player, slot).await?;

    Ok(ResetSummary { finished, session })
}

/// Slots with an active session
pub async fn active(pool: &SqlitePool, discord_id: u64) -> Result<BTreeSet<SessionSlot>> {
    let player = linked_player(pool, discord_id).await?;
    SessionRepository::new(pool.clone()).list_active(&player).await
}

/// View a slot's progress, starting a session there if it is empty
///
/// `player` overrides the linked account; without it the caller must be
/// linked.
pub async fn view(
    pool: &SqlitePool,
    source: Arc<dyn StatsSource>,
    discord_id: u64,
    player: Option<PlayerId>,
    slot: SessionSlot,
) -> Result<ViewOutcome> {
    let player = match player {
        Some(player) => player,
        None => linked_player(pool, discord_id).await?,
    };
    let store = SessionStore::new(pool.clone(), source);

    if store.get(&player, slot).await?.is_none() {
        match store.create(&player, slot).await {
            Ok(session) => return Ok(ViewOutcome::Created(session)),
            // Someone else started it meanwhile; report on theirs
            Err(Error::SessionAlreadyActive { .. }) => {
                debug!(player = %player, slot = %slot, "Session appeared during view");
            }
            Err(e) => return Err(e),
        }
    }

    store
        .reporter()
        .build_report(&player, slot)
        .await
        .map(ViewOutcome::Report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stats::{InMemoryStatsSource, StatsSnapshot};
    use crate::storage::Database;

    const DISCORD_ID: u64 = 111_222_333;

    fn start_stats() -> StatsSnapshot {
        StatsSnapshot {
            wins: 10,
            weighted_wins: 20,
            kills: 5,
            finals: 1,
            beds_broken: 0,
            level: 4,
            partial_experience: 500,
        }
    }

    fn later_stats() -> StatsSnapshot {
        StatsSnapshot {
            wins: 15,
            weighted_wins: 28,
            kills: 9,
            finals: 3,
            beds_broken: 1,
            level: 5,
            partial_experience: 200,
        }
    }

    async fn setup() -> (Database, InMemoryStatsSource, PlayerId) {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        let player = PlayerId::new("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap();
        LinkRepository::new(db.pool().clone())
            .link(DISCORD_ID, &player)
            .await
            .unwrap();
        let source = InMemoryStatsSource::new();
        source.set(&player, start_stats()).await;
        (db, source, player)
    }

    #[tokio::test]
    async fn test_commands_require_link() {
        let (db, source, _) = setup().await;
        let source: Arc<dyn StatsSource> = Arc::new(source);

        let result = start(db.pool(), Arc::clone(&source), 42, SessionSlot::One).await;
        assert!(matches!(result, Err(Error::NotLinked(42))));

        let result = view(db.pool(), source, 42, None, SessionSlot::One).await;
        assert!(matches!(result, Err(Error::NotLinked(42))));
    }

    #[tokio::test]
    async fn test_start_active_end() {
        let (db, source, _) = setup().await;
        let source: Arc<dyn StatsSource> = Arc::new(source);

        start(db.pool(), Arc::clone(&source), DISCORD_ID, SessionSlot::Two)
            .await
            .unwrap();
        let slots = active(db.pool(), DISCORD_ID).await.unwrap();
        assert!(slots.contains(&SessionSlot::Two));

        end(db.pool(), DISCORD_ID, SessionSlot::Two).await.unwrap();
        let result = end(db.pool(), DISCORD_ID, SessionSlot::Two).await;
        assert!(matches!(result, Err(Error::SessionNotActive { .. })));
        assert!(active(db.pool(), DISCORD_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_end_and_active_never_fetch_stats() {
        let (db, source, _) = setup().await;
        let shared: Arc<dyn StatsSource> = Arc::new(source.clone());
        start(db.pool(), shared, DISCORD_ID, SessionSlot::One)
            .await
            .unwrap();
        let fetches = source.fetch_count();

        active(db.pool(), DISCORD_ID).await.unwrap();
        end(db.pool(), DISCORD_ID, SessionSlot::One).await.unwrap();

        assert_eq!(source.fetch_count(), fetches);
    }

    #[tokio::test]
    async fn test_view_creates_then_reports() {
        let (db, source, player) = setup().await;
        let shared: Arc<dyn StatsSource> = Arc::new(source.clone());

        let first = view(db.pool(), Arc::clone(&shared), DISCORD_ID, None, SessionSlot::One)
            .await
            .unwrap();
        assert!(matches!(first, ViewOutcome::Created(ref s) if s.baseline == start_stats()));

        source.set(&player, later_stats()).await;
        let second = view(db.pool(), shared, DISCORD_ID, None, SessionSlot::One)
            .await
            .unwrap();
        match second {
            ViewOutcome::Report(report) => {
                assert_eq!(report.counters.wins, 5);
                assert_eq!(report.progression.experience_gained, 4700);
                assert_eq!(report.progression.stars_gained, 0.94);
            }
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_view_explicit_player_without_link() {
        let (db, source, _) = setup().await;
        let other = PlayerId::new("someone-else").unwrap();
        source.set(&other, later_stats()).await;

        let outcome = view(
            db.pool(),
            Arc::new(source),
            42,
            Some(other.clone()),
            SessionSlot::Three,
        )
        .await
        .unwrap();
        assert!(matches!(outcome, ViewOutcome::Created(ref s) if s.player_id == other));
    }

    #[tokio::test]
    async fn test_reset_with_summary_reports_before_reset() {
        let (db, source, player) = setup().await;
        let shared: Arc<dyn StatsSource> = Arc::new(source.clone());
        start(db.pool(), Arc::clone(&shared), DISCORD_ID, SessionSlot::One)
            .await
            .unwrap();

        source.set(&player, later_stats()).await;
        let summary = reset_with_summary(db.pool(), Arc::clone(&shared), DISCORD_ID, SessionSlot::One)
            .await
            .unwrap();

        assert_eq!(summary.finished.counters.wins, 5);
        assert_eq!(summary.session.baseline, later_stats());

        match view(db.pool(), shared, DISCORD_ID, None, SessionSlot::One)
            .await
            .unwrap()
        {
            ViewOutcome::Report(report) => assert_eq!(report.counters.wins, 0),
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reset_discards_progress() {
        let (db, source, player) = setup().await;
        let shared: Arc<dyn StatsSource> = Arc::new(source.clone());
        start(db.pool(), Arc::clone(&shared), DISCORD_ID, SessionSlot::One)
            .await
            .unwrap();

        source.set(&player, later_stats()).await;
        let session = reset(db.pool(), shared, DISCORD_ID, SessionSlot::One)
            .await
            .unwrap();
        assert_eq!(session.baseline, later_stats());
    }
}
