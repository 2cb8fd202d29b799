//! Actor label recorded on movements and audit entries.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Who performed an action.
///
/// Always passed explicitly by the caller; nothing in Nexium reads an ambient
/// session to find out who is acting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Label used for actions performed by the system itself (imports, jobs).
    pub const SYSTEM: &'static str = "sistema";

    pub fn new(label: impl Into<String>) -> Result<Self, DomainError> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("actor cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn system() -> Self {
        Self(Self::SYSTEM.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Actor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_is_trimmed() {
        let a = Actor::new("  maria  ").unwrap();
        assert_eq!(a.as_str(), "maria");
    }

    #[test]
    fn blank_actor_is_rejected() {
        assert!(matches!(Actor::new("   "), Err(DomainError::Validation(_))));
    }

    #[test]
    fn actor_serializes_as_plain_string() {
        let json = serde_json::to_string(&Actor::system()).unwrap();
        assert_eq!(json, "\"sistema\"");
    }
}
