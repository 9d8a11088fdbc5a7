//! Session repository for database operations
//!
//! Every mutation runs inside its own transaction. A transaction that is
//! dropped before `commit` (early return, `?`, cancellation) rolls back.

use std::collections::BTreeSet;

use super::session::{Session, SessionSlot};
use super::store::not_active;
use crate::domain::player::PlayerId;
use crate::domain::stats::StatsSnapshot;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

/// Repository for session rows keyed by (player, slot)
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the session for a key
    pub async fn get(&self, player: &PlayerId, slot: SessionSlot) -> Result<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT player_id, slot, wins, weighted_wins, kills, finals, beds_broken,
                   level, partial_experience, created_at
            FROM sessions
            WHERE player_id = ? AND slot = ?
            "#,
        )
        .bind(player.as_str())
        .bind(i64::from(slot.number()))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        row.map(SessionRow::into_session).transpose()
    }

    /// Insert a new session
    ///
    /// Returns `false` without touching the stored row when the key is
    /// already taken, including by a concurrent writer.
    pub async fn insert(&self, session: &Session) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;
        let snapshot = &session.baseline;

        let result = sqlx::query(
            r#"
            INSERT INTO sessions (
                player_id, slot, wins, weighted_wins, kills, finals, beds_broken,
                level, partial_experience, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(player_id, slot) DO NOTHING
            "#,
        )
        .bind(session.player_id.as_str())
        .bind(i64::from(session.slot.number()))
        .bind(i64::from(snapshot.wins))
        .bind(i64::from(snapshot.weighted_wins))
        .bind(i64::from(snapshot.kills))
        .bind(i64::from(snapshot.finals))
        .bind(i64::from(snapshot.beds_broken))
        .bind(i64::from(snapshot.level))
        .bind(i64::from(snapshot.partial_experience))
        .bind(session.created_at)
        .execute(&mut *tx)
        .await
        .map_err(Error::DatabaseError)?;

        tx.commit().await.map_err(Error::DatabaseError)?;

        Ok(result.rows_affected() == 1)
    }

    /// Overwrite the baseline and capture time of an existing session
    ///
    /// All fields are written by one statement, so concurrent replacements
    /// resolve to one whole snapshot. Returns `false` when no row exists.
    pub async fn replace_baseline(
        &self,
        player: &PlayerId,
        slot: SessionSlot,
        snapshot: &StatsSnapshot,
        created_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;

        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                wins = ?,
                weighted_wins = ?,
                kills = ?,
                finals = ?,
                beds_broken = ?,
                level = ?,
                partial_experience = ?,
                created_at = ?
            WHERE player_id = ? AND slot = ?
            "#,
        )
        .bind(i64::from(snapshot.wins))
        .bind(i64::from(snapshot.weighted_wins))
        .bind(i64::from(snapshot.kills))
        .bind(i64::from(snapshot.finals))
        .bind(i64::from(snapshot.beds_broken))
        .bind(i64::from(snapshot.level))
        .bind(i64::from(snapshot.partial_experience))
        .bind(created_at)
        .bind(player.as_str())
        .bind(i64::from(slot.number()))
        .execute(&mut *tx)
        .await
        .map_err(Error::DatabaseError)?;

        tx.commit().await.map_err(Error::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a session; returns `false` when there was nothing to delete
    pub async fn delete(&self, player: &PlayerId, slot: SessionSlot) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;

        let result = sqlx::query("DELETE FROM sessions WHERE player_id = ? AND slot = ?")
            .bind(player.as_str())
            .bind(i64::from(slot.number()))
            .execute(&mut *tx)
            .await
            .map_err(Error::DatabaseError)?;

        tx.commit().await.map_err(Error::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    /// End a session; an empty slot is `SessionNotActive`, not a no-op
    ///
    /// Needs no stats source, so callers that only end sessions never touch
    /// the API.
    pub async fn end(&self, player: &PlayerId, slot: SessionSlot) -> Result<()> {
        if !self.delete(player, slot).await? {
            return Err(not_active(player, slot));
        }

        info!(player = %player, slot = %slot, "Session ended");
        Ok(())
    }

    /// Set of active slots for a player
    pub async fn list_active(&self, player: &PlayerId) -> Result<BTreeSet<SessionSlot>> {
        Ok(self.list_slots(player).await?.into_iter().collect())
    }

    /// Slots with a stored session for a player, ascending
    pub async fn list_slots(&self, player: &PlayerId) -> Result<Vec<SessionSlot>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT slot FROM sessions WHERE player_id = ? ORDER BY slot")
                .bind(player.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(Error::DatabaseError)?;

        rows.into_iter()
            .map(|(slot,)| {
                SessionSlot::new(slot)
                    .map_err(|_| Error::Parse(format!("Invalid stored slot: {}", slot)))
            })
            .collect()
    }

    /// All sessions stored for a player, ordered by slot
    pub async fn list_for_player(&self, player: &PlayerId) -> Result<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            r#"
            SELECT player_id, slot, wins, weighted_wins, kills, finals, beds_broken,
                   level, partial_experience, created_at
            FROM sessions
            WHERE player_id = ?
            ORDER BY slot
            "#,
        )
        .bind(player.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        rows.into_iter().map(SessionRow::into_session).collect()
    }
}

/// Database row for a session
#[derive(sqlx::FromRow)]
struct SessionRow {
    player_id: String,
    slot: i64,
    wins: i64,
    weighted_wins: i64,
    kills: i64,
    finals: i64,
    beds_broken: i64,
    level: i64,
    partial_experience: i64,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Result<Session> {
        let player_id = PlayerId::new(&self.player_id)
            .map_err(|e| Error::Parse(format!("Invalid player ID: {}", e)))?;
        let slot = SessionSlot::new(self.slot)
            .map_err(|_| Error::Parse(format!("Invalid stored slot: {}", self.slot)))?;

        Ok(Session {
            player_id,
            slot,
            baseline: StatsSnapshot {
                wins: counter("wins", self.wins)?,
                weighted_wins: counter("weighted_wins", self.weighted_wins)?,
                kills: counter("kills", self.kills)?,
                finals: counter("finals", self.finals)?,
                beds_broken: counter("beds_broken", self.beds_broken)?,
                level: counter("level", self.level)?,
                partial_experience: counter("partial_experience", self.partial_experience)?,
            },
            created_at: self.created_at,
        })
    }
}

fn counter(column: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Parse(format!("Invalid {}: {}", column, value)))
}
