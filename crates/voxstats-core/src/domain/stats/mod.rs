//! Stats snapshots and the sources that produce them
//!
//! A [`StatsSnapshot`] is one batched read of a player's cumulative counters.
//! Session creation, reset and reporting each take exactly one snapshot, so
//! a failed fetch never leaves a half-populated row behind.

pub mod memory;
pub mod snapshot;
pub mod source;

pub use memory::InMemoryStatsSource;
pub use snapshot::{CounterDeltas, StatsSnapshot};
pub use source::StatsSource;
