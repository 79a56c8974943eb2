//! Identifiers for owners and credential records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{QrVaultError, Result};

/// Opaque identity of a verified caller, as supplied by the identity
/// provider.  QrVault never authenticates it, only compares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap a caller identity.  Blank identities are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(QrVaultError::Validation(
                "owner identity cannot be empty".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one stored credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(Uuid);

impl CredentialId {
    /// Allocate a new random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CredentialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CredentialId {
    type Err = QrVaultError;

    /// An unparseable id cannot name any record, so it reports the same
    /// outcome as a lookup miss.
    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| QrVaultError::NotFoundOrForbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_id_is_trimmed() {
        assert_eq!(OwnerId::new("  alice ").unwrap().as_str(), "alice");
    }

    #[test]
    fn blank_owner_id_rejected() {
        assert!(matches!(
            OwnerId::new("   "),
            Err(QrVaultError::Validation(_))
        ));
    }

    #[test]
    fn credential_id_display_parses_back() {
        let id = CredentialId::new();
        let parsed: CredentialId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn garbage_credential_id_is_not_found() {
        let result = "not-a-uuid".parse::<CredentialId>();
        assert!(matches!(result, Err(QrVaultError::NotFoundOrForbidden)));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = CredentialId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        assert_eq!(serde_json::from_str::<CredentialId>(&json).unwrap(), id);

        let owner = OwnerId::new("alice").unwrap();
        assert_eq!(serde_json::to_string(&owner).unwrap(), "\"alice\"");
    }
}
