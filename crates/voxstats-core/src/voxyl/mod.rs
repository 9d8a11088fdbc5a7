//! Voxyl Network API
//!
//! - `client`: HTTP client, retry policy and response cache
//! - `endpoints`: API routes
//! - `types`: response bodies and their conversion into snapshots
//!
//! `VoxylClient` implements [`StatsSource`](crate::domain::stats::StatsSource),
//! so sessions can be driven by live API data.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{RetryPolicy, VOXYL_BASE_URL, VoxylClient, VoxylClientBuilder};
pub use endpoints::Endpoint;
pub use types::{GameStats, ModeStats, OverallStats, PlayerInfo};
