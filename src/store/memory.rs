//! In-process store backed by hash maps.
//!
//! Each map sits behind its own lock; every operation takes the lock
//! once, so `take_token` is a single `remove` and cannot hand the same
//! record to two callers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};

use crate::errors::{QrVaultError, Result};
use crate::identity::{CredentialId, OwnerId};
use crate::share::ShareToken;
use crate::vault::{CredentialRecord, CredentialSummary};

use super::{CredentialStore, TokenStore};

/// Store that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    credentials: RwLock<HashMap<CredentialId, CredentialRecord>>,
    tokens: Mutex<HashMap<String, ShareToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of token records currently held, expired or not.
    pub fn token_count(&self) -> Result<usize> {
        Ok(self.lock_tokens()?.len())
    }

    fn lock_tokens(&self) -> Result<MutexGuard<'_, HashMap<String, ShareToken>>> {
        self.tokens
            .lock()
            .map_err(|_| QrVaultError::Storage("token map lock poisoned".into()))
    }
}

fn sweep(tokens: &mut HashMap<String, ShareToken>, now: DateTime<Utc>) -> usize {
    let before = tokens.len();
    tokens.retain(|_, t| !t.is_expired(now));
    before - tokens.len()
}

impl CredentialStore for MemoryStore {
    fn insert_credential(&self, record: &CredentialRecord) -> Result<()> {
        let mut map = self
            .credentials
            .write()
            .map_err(|_| QrVaultError::Storage("credential map lock poisoned".into()))?;
        if map.contains_key(&record.id) {
            return Err(QrVaultError::Storage(format!(
                "credential {} already exists",
                record.id
            )));
        }
        map.insert(record.id, record.clone());
        Ok(())
    }

    fn find_credential(
        &self,
        id: &CredentialId,
        owner: &OwnerId,
    ) -> Result<Option<CredentialRecord>> {
        let map = self
            .credentials
            .read()
            .map_err(|_| QrVaultError::Storage("credential map lock poisoned".into()))?;
        Ok(map.get(id).filter(|r| &r.owner == owner).cloned())
    }

    fn list_credentials(&self, owner: &OwnerId) -> Result<Vec<CredentialSummary>> {
        let map = self
            .credentials
            .read()
            .map_err(|_| QrVaultError::Storage("credential map lock poisoned".into()))?;

        let mut list: Vec<CredentialSummary> = map
            .values()
            .filter(|r| &r.owner == owner)
            .map(CredentialSummary::from)
            .collect();

        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }
}

impl TokenStore for MemoryStore {
    fn insert_token(&self, token: &ShareToken) -> Result<()> {
        let mut tokens = self.lock_tokens()?;
        sweep(&mut tokens, Utc::now());
        if tokens.contains_key(&token.token) {
            return Err(QrVaultError::Storage("duplicate share token".into()));
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    fn take_token(&self, token: &str) -> Result<Option<ShareToken>> {
        Ok(self.lock_tokens()?.remove(token))
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut tokens = self.lock_tokens()?;
        Ok(sweep(&mut tokens, now))
    }
}
