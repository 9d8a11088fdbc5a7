//! Snapshot of cumulative player statistics

use serde::{Deserialize, Serialize};

use crate::domain::progression::{ProgressionDelta, experience_and_progress_delta};

/// Cumulative counters and progression captured at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub wins: u32,
    pub weighted_wins: u32,
    pub kills: u32,
    pub finals: u32,
    pub beds_broken: u32,
    pub level: u32,
    /// Experience earned inside `level`
    pub partial_experience: u32,
}

/// Live-minus-baseline difference for each counter
///
/// Values are signed and never clamped; an upstream correction can make
/// them negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDeltas {
    pub wins: i64,
    pub weighted_wins: i64,
    pub kills: i64,
    pub finals: i64,
    pub beds_broken: i64,
}

impl StatsSnapshot {
    /// Counter deltas from `baseline` to `self`
    pub fn counter_deltas_since(&self, baseline: &StatsSnapshot) -> CounterDeltas {
        let diff = |live: u32, base: u32| i64::from(live) - i64::from(base);
        CounterDeltas {
            wins: diff(self.wins, baseline.wins),
            weighted_wins: diff(self.weighted_wins, baseline.weighted_wins),
            kills: diff(self.kills, baseline.kills),
            finals: diff(self.finals, baseline.finals),
            beds_broken: diff(self.beds_broken, baseline.beds_broken),
        }
    }

    /// Experience and stars gained from `baseline` to `self`
    pub fn progression_since(&self, baseline: &StatsSnapshot) -> ProgressionDelta {
        experience_and_progress_delta(
            baseline.level,
            u64::from(baseline.partial_experience),
            self.level,
            u64::from(self.partial_experience),
        )
    }
}
