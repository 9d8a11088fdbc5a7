//! Link repository for database operations

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::SqlitePool;
use tracing::info;

use super::link::PlayerLink;
use crate::domain::player::PlayerId;
use crate::error::{Error, Result};

/// Repository for Discord account links
#[derive(Debug, Clone)]
pub struct LinkRepository {
    pool: SqlitePool,
}

impl LinkRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the link for a Discord account
    pub async fn get(&self, discord_id: u64) -> Result<Option<PlayerLink>> {
        let row: Option<LinkRow> = sqlx::query_as(
            "SELECT discord_id, player_id, linked_at FROM linked_accounts WHERE discord_id = ?",
        )
        .bind(discord_key(discord_id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        row.map(LinkRow::into_link).transpose()
    }

    /// Resolve the player for a Discord account, failing with `NotLinked`
    pub async fn require(&self, discord_id: u64) -> Result<PlayerId> {
        self.get(discord_id)
            .await?
            .map(|link| link.player_id)
            .ok_or(Error::NotLinked(discord_id))
    }

    /// Link a Discord account to a player, replacing any previous link
    pub async fn link(&self, discord_id: u64, player: &PlayerId) -> Result<PlayerLink> {
        let linked_at = Utc::now().trunc_subsecs(3);
        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;

        sqlx::query(
            r#"
            INSERT INTO linked_accounts (discord_id, player_id, linked_at)
            VALUES (?, ?, ?)
            ON CONFLICT(discord_id) DO UPDATE SET
                player_id = excluded.player_id,
                linked_at = excluded.linked_at
            "#,
        )
        .bind(discord_key(discord_id)?)
        .bind(player.as_str())
        .bind(linked_at)
        .execute(&mut *tx)
        .await
        .map_err(Error::DatabaseError)?;

        tx.commit().await.map_err(Error::DatabaseError)?;

        info!(discord_id, player = %player, "Linked account");
        Ok(PlayerLink {
            discord_id,
            player_id: player.clone(),
            linked_at,
        })
    }

    /// Remove a link; returns `false` when the account was not linked
    pub async fn unlink(&self, discord_id: u64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::DatabaseError)?;

        let result = sqlx::query("DELETE FROM linked_accounts WHERE discord_id = ?")
            .bind(discord_key(discord_id)?)
            .execute(&mut *tx)
            .await
            .map_err(Error::DatabaseError)?;

        tx.commit().await.map_err(Error::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    /// Discord accounts linked to a player
    pub async fn accounts_for(&self, player: &PlayerId) -> Result<Vec<u64>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT discord_id FROM linked_accounts WHERE player_id = ? ORDER BY discord_id",
        )
        .bind(player.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        rows.into_iter().map(|(id,)| discord_id_from_row(id)).collect()
    }
}

/// SQLite integers are signed; snowflakes fit below `i64::MAX`
fn discord_key(discord_id: u64) -> Result<i64> {
    i64::try_from(discord_id)
        .map_err(|_| Error::InvalidInput(format!("Discord ID out of range: {}", discord_id)))
}

fn discord_id_from_row(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::Parse(format!("Invalid Discord ID: {}", value)))
}

/// Database row for a link
#[derive(sqlx::FromRow)]
struct LinkRow {
    discord_id: i64,
    player_id: String,
    linked_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_link(self) -> Result<PlayerLink> {
        Ok(PlayerLink {
            discord_id: discord_id_from_row(self.discord_id)?,
            player_id: PlayerId::new(&self.player_id)
                .map_err(|e| Error::Parse(format!("Invalid player ID: {}", e)))?,
            linked_at: self.linked_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    async fn create_test_db() -> SqlitePool {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        db.pool().clone()
    }

    fn player(id: &str) -> PlayerId {
        PlayerId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_link_and_get() {
        let repo = LinkRepository::new(create_test_db().await);

        let link = repo.link(1234, &player("p1")).await.unwrap();
        let fetched = repo.get(1234).await.unwrap().expect("Link not found");

        assert_eq!(fetched, link);
        assert_eq!(repo.require(1234).await.unwrap(), player("p1"));
    }

    #[tokio::test]
    async fn test_relink_replaces_player() {
        let repo = LinkRepository::new(create_test_db().await);
        repo.link(1234, &player("p1")).await.unwrap();
        repo.link(1234, &player("p2")).await.unwrap();

        assert_eq!(repo.require(1234).await.unwrap(), player("p2"));
        assert!(repo.accounts_for(&player("p1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_require_unlinked() {
        let repo = LinkRepository::new(create_test_db().await);
        let result = repo.require(42).await;
        assert!(matches!(result, Err(Error::NotLinked(42))));
    }

    #[tokio::test]
    async fn test_unlink() {
        let repo = LinkRepository::new(create_test_db().await);
        repo.link(7, &player("p1")).await.unwrap();

        assert!(repo.unlink(7).await.unwrap());
        assert!(!repo.unlink(7).await.unwrap());
        assert!(repo.get(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_accounts_for_player() {
        let repo = LinkRepository::new(create_test_db().await);
        repo.link(20, &player("p1")).await.unwrap();
        repo.link(10, &player("p1")).await.unwrap();
        repo.link(30, &player("p2")).await.unwrap();

        assert_eq!(repo.accounts_for(&player("p1")).await.unwrap(), vec![10, 20]);
    }

    #[tokio::test]
    async fn test_out_of_range_discord_id() {
        let repo = LinkRepository::new(create_test_db().await);
        let result = repo.link(u64::MAX, &player("p1")).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
