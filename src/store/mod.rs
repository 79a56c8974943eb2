//! Storage contract for credentials and share tokens.
//!
//! The service relies on a handful of single-record primitives and on
//! the store's own atomicity: `take_token` must find and delete in one
//! step so that only one caller ever observes a given token.  There are
//! no cross-record transactions.
//!
//! Two implementations ship with the crate:
//! - `MemoryStore`: process-local maps behind locks (`memory`)
//! - `SqliteStore`: a single SQLite database file (`sqlite`)

pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::identity::{CredentialId, OwnerId};
use crate::share::ShareToken;
use crate::vault::{CredentialRecord, CredentialSummary};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistent credential records, always addressed through their owner.
pub trait CredentialStore: Send + Sync {
    /// Insert a new record.
    fn insert_credential(&self, record: &CredentialRecord) -> Result<()>;

    /// Find a record by id, but only if `owner` owns it.
    fn find_credential(
        &self,
        id: &CredentialId,
        owner: &OwnerId,
    ) -> Result<Option<CredentialRecord>>;

    /// Metadata for every record owned by `owner`, oldest first.
    fn list_credentials(&self, owner: &OwnerId) -> Result<Vec<CredentialSummary>>;
}

/// Write-once, read-once share tokens with deadline-based expiry.
pub trait TokenStore: Send + Sync {
    /// Insert a token.  A duplicate token value is an error.
    ///
    /// Implementations sweep records past their deadline as part of this
    /// call, standing in for a native TTL index.
    fn insert_token(&self, token: &ShareToken) -> Result<()>;

    /// Atomically find and delete the record with this exact token value.
    fn take_token(&self, token: &str) -> Result<Option<ShareToken>>;

    /// Delete every token whose deadline is at or before `now`.
    /// Returns how many were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}
