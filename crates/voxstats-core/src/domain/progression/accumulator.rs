//! Lifetime experience and progression deltas

use serde::{Deserialize, Serialize};

use super::curve::experience_required;

/// Fixed conversion rate from experience to stars
///
/// Stars are a coarse unit and deliberately ignore the shape of the curve.
pub const EXPERIENCE_PER_STAR: f64 = 5000.0;

/// Total experience accumulated to reach `level` plus progress inside it
///
/// Sums the cost of advancing past each level in `1..level`; at level 0 or 1
/// only the partial experience counts.
pub fn total_experience(level: u32, partial_experience: u64) -> u64 {
    let completed: u64 = (1..level).map(|l| u64::from(experience_required(l))).sum();
    completed + partial_experience
}

/// Experience and stars gained between two progression snapshots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressionDelta {
    /// Experience gained; negative when the newer snapshot regressed
    pub experience_gained: i64,
    /// Experience expressed in stars, rounded to two decimals
    pub stars_gained: f64,
}

/// Compute the progression delta from an old to a new snapshot
pub fn experience_and_progress_delta(
    old_level: u32,
    old_partial: u64,
    new_level: u32,
    new_partial: u64,
) -> ProgressionDelta {
    let old = i128::from(total_experience(old_level, old_partial));
    let new = i128::from(total_experience(new_level, new_partial));
    let experience_gained = clamp_to_i64(new - old);

    ProgressionDelta {
        experience_gained,
        stars_gained: round_to_hundredths(experience_gained as f64 / EXPERIENCE_PER_STAR),
    }
}

fn clamp_to_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_is_empty_accumulation() {
        for partial in [0u64, 1, 499, 5000, 1_000_000] {
            assert_eq!(total_experience(1, partial), partial);
            assert_eq!(total_experience(0, partial), partial);
        }
    }

    #[test]
    fn test_total_experience_known_values() {
        assert_eq!(total_experience(2, 0), 2000);
        assert_eq!(total_experience(3, 0), 5000);
        assert_eq!(total_experience(4, 500), 9500);
        assert_eq!(total_experience(5, 200), 14_200);
        // Levels 1..=4 of the ramp (14000) plus 95 plateau levels at 5000
        assert_eq!(total_experience(100, 0), 14_000 + 95 * 5000);
        // Level 100 opens the next century's ramp
        assert_eq!(total_experience(101, 0), 14_000 + 95 * 5000 + 1000);
    }

    #[test]
    fn test_total_experience_monotonic_in_level() {
        let mut previous = 0;
        for level in 0..1500 {
            let total = total_experience(level, 0);
            assert!(total >= previous, "level {}", level);
            previous = total;
        }
    }

    #[test]
    fn test_no_movement_no_gain() {
        for level in [0u32, 1, 4, 57, 100, 999, 2500] {
            let delta = experience_and_progress_delta(level, 0, level, 0);
            assert_eq!(delta.experience_gained, 0);
            assert_eq!(delta.stars_gained, 0.0);
        }
    }

    #[test]
    fn test_delta_across_level_up() {
        let delta = experience_and_progress_delta(4, 500, 5, 200);
        assert_eq!(delta.experience_gained, 4700);
        assert_eq!(delta.stars_gained, 0.94);
    }

    #[test]
    fn test_level_up_from_full_progress_is_a_gain() {
        for level in [1u32, 4, 5, 99, 100, 104, 550, 1200] {
            let full = u64::from(experience_required(level)) - 1;
            let delta = experience_and_progress_delta(level, full, level + 1, 0);
            assert!(delta.experience_gained > 0, "level {}", level);
        }

        let delta = experience_and_progress_delta(4, 4999, 5, 0);
        assert_eq!(delta.experience_gained, 1);
    }

    #[test]
    fn test_delta_rounds_to_two_decimals() {
        let delta = experience_and_progress_delta(10, 0, 10, 1234);
        assert_eq!(delta.experience_gained, 1234);
        assert_eq!(delta.stars_gained, 0.25);
    }

    #[test]
    fn test_regression_is_not_clamped() {
        let delta = experience_and_progress_delta(5, 200, 4, 500);
        assert_eq!(delta.experience_gained, -4700);
        assert_eq!(delta.stars_gained, -0.94);
    }
}
