//! Credential records and the views handed back to callers.
//!
//! A `CredentialRecord` is what the store holds: plaintext title and
//! timestamps, sealed envelopes for everything sensitive.  Callers only
//! ever see a `CredentialSummary` (list views, no envelopes) or, once, a
//! `CredentialView` with the decrypted fields.

use chrono::{DateTime, Utc};
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::Envelope;
use crate::identity::{CredentialId, OwnerId};

/// One stored secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: CredentialId,

    /// The only identity allowed to read or share this record.
    pub owner: OwnerId,

    /// Display title (not sensitive).
    pub title: String,

    pub username: Envelope,
    pub password: Envelope,

    /// `Envelope::Empty` when no notes were given.
    pub notes: Envelope,

    /// Business-level expiry, unrelated to share-token deadlines.
    pub expiry: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Input to `VaultService::save_credential`.
///
/// Holds plaintext; callers wipe it with `zeroize()` once it is saved.
#[derive(Debug, Clone, Default, Zeroize)]
pub struct NewCredential {
    pub title: String,
    pub username: String,
    pub password: String,
    pub notes: Option<String>,
    #[zeroize(skip)]
    pub expiry: Option<DateTime<Utc>>,
}

/// Metadata about a credential (no envelopes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialSummary {
    pub id: CredentialId,
    pub title: String,
    pub expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&CredentialRecord> for CredentialSummary {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            expiry: record.expiry,
            created_at: record.created_at,
        }
    }
}

/// Decrypted credential returned by a successful token redemption.
///
/// Plaintext fields are wiped when the view is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct CredentialView {
    pub title: String,
    pub username: String,
    pub password: String,

    /// `""` when the credential has no notes.
    pub notes: String,

    #[zeroize(skip)]
    pub expiry: Option<DateTime<Utc>>,
}
