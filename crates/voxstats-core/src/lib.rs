//! VoxStats Core Library
//!
//! This crate provides the core functionality for VoxStats, including:
//! - Session tracking (start, reset, end, view) per player and slot
//! - Level progression math (experience curve and star progress)
//! - Storage (SQLite with versioned migrations)
//! - Voxyl Network API client with retry and response caching
//! - Discord account linking
//! - Commands shared by every front end

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod voxyl;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::player::PlayerId;
    pub use crate::domain::session::{Session, SessionReport, SessionSlot, SessionStore};
    pub use crate::domain::stats::{StatsSnapshot, StatsSource};
    pub use crate::error::{Error, Result};
}
