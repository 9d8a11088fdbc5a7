//! Experience curve
//!
//! Every century of levels opens with a five-level ramp (1000..=5000 XP)
//! followed by a plateau whose cost rises by 500 XP per century, capped at
//! 10000 XP from level 1000 onwards.

/// Experience for the ramp levels, indexed by `level % 100`
const RAMP: [u32; 5] = [1000, 2000, 3000, 4000, 5000];

/// Plateau cost for century 0
const PLATEAU_BASE: u32 = 5000;

/// Plateau increase per century
const PLATEAU_STEP: u32 = 500;

/// Plateau cost from century 10 onwards
const PLATEAU_CAP: u32 = 10_000;

/// Experience required to advance past `level`
pub fn experience_required(level: u32) -> u32 {
    let within = (level % 100) as usize;
    if let Some(&ramp) = RAMP.get(within) {
        return ramp;
    }

    match level / 100 {
        century @ 0..=9 => PLATEAU_BASE + PLATEAU_STEP * century,
        _ => PLATEAU_CAP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_levels() {
        assert_eq!(experience_required(0), 1000);
        assert_eq!(experience_required(1), 2000);
        assert_eq!(experience_required(2), 3000);
        assert_eq!(experience_required(3), 4000);
        assert_eq!(experience_required(4), 5000);
    }

    #[test]
    fn test_ramp_repeats_every_century() {
        for century in [1u32, 5, 9, 10, 42, 400] {
            for (offset, expected) in RAMP.iter().enumerate() {
                let level = century * 100 + offset as u32;
                assert_eq!(experience_required(level), *expected, "level {}", level);
            }
        }
    }

    #[test]
    fn test_plateaus() {
        assert_eq!(experience_required(5), 5000);
        assert_eq!(experience_required(99), 5000);
        assert_eq!(experience_required(105), 5500);
        assert_eq!(experience_required(250), 6000);
        assert_eq!(experience_required(399), 6500);
        assert_eq!(experience_required(450), 7000);
        assert_eq!(experience_required(500), 1000);
        assert_eq!(experience_required(505), 7500);
        assert_eq!(experience_required(650), 8000);
        assert_eq!(experience_required(777), 8500);
        assert_eq!(experience_required(899), 9000);
        assert_eq!(experience_required(999), 9500);
        assert_eq!(experience_required(1005), 10_000);
        assert_eq!(experience_required(25_050), 10_000);
    }

    #[test]
    fn test_always_positive() {
        for level in (0..3000).chain([u32::MAX - 1, u32::MAX]) {
            assert!(experience_required(level) > 0, "level {}", level);
        }
    }
}
