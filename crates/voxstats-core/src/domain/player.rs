//! Player identifier

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Opaque player identifier, stable across renames
///
/// Sessions and links store whatever string this wraps; only
/// [`PlayerId::from_uuid_str`] imposes a format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap an identifier, trimming surrounding whitespace
    pub fn new(id: impl AsRef<str>) -> Result<Self> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput(
                "player identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse a Minecraft UUID (dashed or undashed) into its hyphenated form
    pub fn from_uuid_str(value: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(value.trim())
            .map_err(|e| Error::InvalidInput(format!("Invalid player UUID '{}': {}", value, e)))?;
        Ok(Self(uuid.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims() {
        let id = PlayerId::new("  abc  ").unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn test_new_rejects_blank() {
        assert!(PlayerId::new("   ").is_err());
    }

    #[test]
    fn test_uuid_normalisation() {
        let undashed = PlayerId::from_uuid_str("069A79F444E94726A5BEFCA90E38AAF5").unwrap();
        let dashed = PlayerId::from_uuid_str("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap();
        assert_eq!(undashed, dashed);
        assert_eq!(dashed.as_str(), "069a79f4-44e9-4726-a5be-fca90e38aaf5");
    }

    #[test]
    fn test_uuid_rejects_garbage() {
        assert!(matches!(
            PlayerId::from_uuid_str("Notch"),
            Err(Error::InvalidInput(_))
        ));
    }
}
