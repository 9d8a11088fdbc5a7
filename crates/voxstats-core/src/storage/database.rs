//! Session database connection
//!
//! VoxStats keeps one SQLite file per installation. Opening it always brings
//! the schema up to date before any session or link query runs.

use crate::storage::migrations;
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::{Path, PathBuf};

/// Pool size for file databases; concurrent session writes contend on the
/// (player, slot) key, not on connections
const FILE_POOL_SIZE: u32 = 5;

/// Where the database lives and how many connections may share it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `None` for a private in-memory database
    path: Option<PathBuf>,
    max_connections: u32,
}

impl DatabaseConfig {
    /// File-backed database, created along with its directory if missing
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            max_connections: FILE_POOL_SIZE,
        }
    }

    /// In-memory database; a single connection so every query sees the same data
    pub fn in_memory() -> Self {
        Self {
            path: None,
            max_connections: 1,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions> {
        let options = match &self.path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory {}", parent.display())
                    })?;
                }
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
            }
            None => SqliteConnectOptions::new().in_memory(true),
        };
        Ok(options.foreign_keys(true))
    }
}

/// Default database file under the platform data directory
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("voxstats"))
        .unwrap_or_default()
        .join("voxstats.db")
}

/// Migrated SQLite pool holding sessions and account links
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the database and apply pending migrations
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        let location = config
            .path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string());

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await
            .with_context(|| format!("Failed to connect to database {}", location))?;

        migrations::run_migrations(&pool)
            .await
            .with_context(|| format!("Failed to migrate database {}", location))?;

        Ok(Self {
            pool,
            path: config.path,
        })
    }

    pub async fn in_memory() -> Result<Self> {
        Self::new(DatabaseConfig::in_memory()).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Schema version report, used by `doctor`
    pub async fn migration_status(&self) -> Result<migrations::MigrationStatus> {
        migrations::migration_status(&self.pool)
            .await
            .context("Failed to check migration status")
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
