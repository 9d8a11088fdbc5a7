//! Session entity and slot type

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::player::PlayerId;
use crate::domain::stats::StatsSnapshot;
use crate::error::{Error, Result};

/// One of the fixed parallel tracking lanes a player can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SessionSlot {
    One,
    Two,
    Three,
}

impl SessionSlot {
    /// Every slot, in ascending order
    pub const ALL: [SessionSlot; 3] = [Self::One, Self::Two, Self::Three];

    /// Parse a slot number
    pub fn new(number: i64) -> Result<Self> {
        match number {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(Error::InvalidSlot(other)),
        }
    }

    /// Slot number as stored and displayed
    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl Default for SessionSlot {
    fn default() -> Self {
        Self::One
    }
}

impl TryFrom<u8> for SessionSlot {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(i64::from(value))
    }
}

impl From<SessionSlot> for u8 {
    fn from(slot: SessionSlot) -> Self {
        slot.number()
    }
}

impl fmt::Display for SessionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// An active tracking session
///
/// The baseline is captured when the session starts and replaced wholesale
/// on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub player_id: PlayerId,
    pub slot: SessionSlot,
    pub baseline: StatsSnapshot,
    /// When the baseline was captured
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a session whose baseline was captured now
    pub fn new(player_id: PlayerId, slot: SessionSlot, baseline: StatsSnapshot) -> Self {
        Self {
            player_id,
            slot,
            baseline,
            created_at: capture_time(),
        }
    }
}

/// Current time at the precision the store keeps
pub(crate) fn capture_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_parse() {
        assert_eq!(SessionSlot::new(1).unwrap(), SessionSlot::One);
        assert_eq!(SessionSlot::new(3).unwrap(), SessionSlot::Three);
        assert!(matches!(SessionSlot::new(0), Err(Error::InvalidSlot(0))));
        assert!(matches!(SessionSlot::new(4), Err(Error::InvalidSlot(4))));
    }

    #[test]
    fn test_slot_number_round_trip() {
        for slot in SessionSlot::ALL {
            assert_eq!(SessionSlot::new(i64::from(slot.number())).unwrap(), slot);
        }
    }

    #[test]
    fn test_slot_serializes_as_number() {
        assert_eq!(serde_json::to_string(&SessionSlot::Two).unwrap(), "2");
        let slot: SessionSlot = serde_json::from_str("3").unwrap();
        assert_eq!(slot, SessionSlot::Three);
        assert!(serde_json::from_str::<SessionSlot>("9").is_err());
    }

    #[test]
    fn test_new_session_captures_now() {
        let before = Utc::now() - chrono::Duration::seconds(1);
        let session = Session::new(
            PlayerId::new("p1").unwrap(),
            SessionSlot::One,
            StatsSnapshot::default(),
        );
        assert!(session.created_at >= before);
        assert!(session.created_at <= Utc::now());
    }
}
