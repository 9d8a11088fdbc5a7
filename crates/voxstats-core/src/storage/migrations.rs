//! Database migrations
//!
//! Migrations are versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 2;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Sessions and linked accounts
const MIGRATION_V1: &str = r#"
    -- One row per (player, slot); the row's existence is the "active" flag
    CREATE TABLE IF NOT EXISTS sessions (
        player_id TEXT NOT NULL,
        slot INTEGER NOT NULL CHECK (slot IN (1, 2, 3)),
        wins INTEGER NOT NULL CHECK (wins >= 0),
        weighted_wins INTEGER NOT NULL CHECK (weighted_wins >= 0),
        kills INTEGER NOT NULL CHECK (kills >= 0),
        finals INTEGER NOT NULL CHECK (finals >= 0),
        beds_broken INTEGER NOT NULL CHECK (beds_broken >= 0),
        level INTEGER NOT NULL CHECK (level >= 0),
        partial_experience INTEGER NOT NULL CHECK (partial_experience >= 0),
        created_at TIMESTAMP NOT NULL,
        PRIMARY KEY (player_id, slot)
    );

    -- Discord account -> player link, at most one per Discord account
    CREATE TABLE IF NOT EXISTS linked_accounts (
        discord_id INTEGER PRIMARY KEY NOT NULL,
        player_id TEXT NOT NULL,
        linked_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 2: Reverse lookup of links by player
const MIGRATION_V2: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_linked_accounts_player_id ON linked_accounts(player_id);
"#;

/// Get the current schema version from the database
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    // Ensure migrations table exists
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    let row: Option<(Option<i32>,)> = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(row.and_then(|(v,)| v).unwrap_or(0))
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    tracing::info!(
        current_version = current_version,
        target_version = CURRENT_VERSION,
        "Checking database migrations"
    );

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    if current_version < 1 {
        tracing::info!("Applying migration v1: Sessions and linked accounts");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    if current_version < 2 {
        tracing::info!("Applying migration v2: Linked account player index");
        sqlx::raw_sql(MIGRATION_V2).execute(pool).await?;
        record_migration(pool, 2).await?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to be run
    pub needs_migration: bool,
}
