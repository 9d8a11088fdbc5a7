//! Error types for VoxStats

use thiserror::Error;

/// Result type alias using VoxStats' Error
pub type Result<T> = std::result::Result<T, Error>;

/// VoxStats error types
///
/// The core never renders user-facing text beyond these messages; command
/// handlers match on the variant and compose their own responses.
#[derive(Error, Debug)]
pub enum Error {
    // Session state errors (E001-E099)
    #[error("Session {slot} is already active for player '{player}'")]
    SessionAlreadyActive { player: String, slot: u8 },

    #[error("No active session {slot} for player '{player}'")]
    SessionNotActive { player: String, slot: u8 },

    #[error("Invalid session slot {0}. Valid slots are 1, 2 and 3.")]
    InvalidSlot(i64),

    // Linking errors (E100-E199)
    #[error("Discord account {0} is not linked to a player")]
    NotLinked(u64),

    // Stats source errors (E200-E299)
    #[error("No stats recorded for player '{0}'")]
    SourceUnavailable(String),

    #[error("Stats source failed after {attempts} attempts: {reason}")]
    TransientSourceFailure { attempts: u32, reason: String },

    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("Rate limited by the stats API: {0}")]
    RateLimited(String),

    #[error("Unexpected status {0} from the stats API: {1}")]
    UnexpectedStatus(u16, String),

    #[error("Malformed response from the stats API: {0}")]
    BadResponse(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Failed to parse stored value: {0}")]
    Parse(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::SessionAlreadyActive { .. } => "E001",
            Self::SessionNotActive { .. } => "E002",
            Self::InvalidSlot(_) => "E003",
            Self::NotLinked(_) => "E100",
            Self::SourceUnavailable(_) => "E200",
            Self::TransientSourceFailure { .. } => "E201",
            Self::NetworkError(_) => "E202",
            Self::RateLimited(_) => "E203",
            Self::UnexpectedStatus(..) => "E204",
            Self::BadResponse(_) => "E205",
            Self::DatabaseError(_) => "E400",
            Self::Parse(_) => "E401",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Whether a retry of the same stats request may succeed
    ///
    /// Only connectivity errors, rate limits, timeouts (408) and server errors
    /// (5xx) qualify; other client errors fail on the first attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::RateLimited(_) => true,
            Self::UnexpectedStatus(status, _) => *status == 408 || *status >= 500,
            _ => false,
        }
    }

    /// Whether the caller can recover by offering the user another action
    ///
    /// Persistence and exhausted-retry failures are not recoverable locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SessionAlreadyActive { .. }
                | Self::SessionNotActive { .. }
                | Self::SourceUnavailable(_)
                | Self::NotLinked(_)
                | Self::InvalidSlot(_)
        )
    }
}
