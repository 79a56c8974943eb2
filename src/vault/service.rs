//! The four operations the surrounding application exposes.
//!
//! `VaultService` ties the envelope cipher to a store.  It holds no
//! locks of its own: every method takes `&self`, and the one
//! race that matters (two redemptions of the same token) is settled by
//! the store's atomic `take_token`.

use chrono::Utc;
use tracing::{debug, error, warn};

use crate::crypto::EnvelopeCipher;
use crate::errors::{QrVaultError, Result};
use crate::identity::{CredentialId, OwnerId};
use crate::share::{IssuedToken, ShareToken};
use crate::store::{CredentialStore, TokenStore};

use super::credential::{CredentialRecord, CredentialSummary, CredentialView, NewCredential};

/// Credential vault with single-use sharing.
pub struct VaultService<S> {
    cipher: EnvelopeCipher,
    store: S,
}

impl<S> VaultService<S>
where
    S: CredentialStore + TokenStore,
{
    pub fn new(cipher: EnvelopeCipher, store: S) -> Self {
        Self { cipher, store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    /// Seal and persist a new credential owned by `owner`.
    ///
    /// Title, username and password are required.  Empty notes are
    /// stored as "nothing stored", same as absent notes.
    pub fn save_credential(&self, owner: &OwnerId, input: &NewCredential) -> Result<CredentialId> {
        let title = input.title.trim();
        if title.is_empty() || input.username.is_empty() || input.password.is_empty() {
            return Err(QrVaultError::Validation(
                "title, username, and password are required".into(),
            ));
        }

        let notes = input.notes.as_deref().filter(|n| !n.is_empty());

        let record = CredentialRecord {
            id: CredentialId::new(),
            owner: owner.clone(),
            title: title.to_string(),
            username: self.cipher.seal(Some(&input.username))?,
            password: self.cipher.seal(Some(&input.password))?,
            notes: self.cipher.seal(notes)?,
            expiry: input.expiry,
            created_at: Utc::now(),
        };

        self.store.insert_credential(&record)?;
        debug!(credential = %record.id, owner = %owner, "credential saved");
        Ok(record.id)
    }

    /// Titles and dates of everything `owner` has stored.
    pub fn list_credentials(&self, owner: &OwnerId) -> Result<Vec<CredentialSummary>> {
        self.store.list_credentials(owner)
    }

    // ------------------------------------------------------------------
    // Sharing
    // ------------------------------------------------------------------

    /// Issue a single-use token for one of `owner`'s credentials.
    ///
    /// Fails with `NotFoundOrForbidden` whether the credential is missing
    /// or belongs to someone else; no token is written in either case.
    pub fn issue_share_token(
        &self,
        owner: &OwnerId,
        credential_id: &CredentialId,
    ) -> Result<IssuedToken> {
        if self.store.find_credential(credential_id, owner)?.is_none() {
            debug!(credential = %credential_id, owner = %owner, "share refused");
            return Err(QrVaultError::NotFoundOrForbidden);
        }

        let record = ShareToken::issue(*credential_id, owner.clone(), Utc::now());
        self.store.insert_token(&record)?;

        debug!(
            credential = %credential_id,
            expires_at = %record.expires_at,
            "share token issued"
        );
        Ok(IssuedToken::from(&record))
    }

    /// Redeem a token, consuming it, and return the decrypted credential.
    ///
    /// The token is removed from the store the moment it is found, before
    /// the deadline check and before decryption, so it can never be
    /// redeemed twice even if a later step fails.  Blank, unknown, expired
    /// and already-used tokens all yield `TokenInvalidOrExpired`.
    pub fn redeem_share_token(&self, token: &str) -> Result<CredentialView> {
        let token = token.trim();
        if token.is_empty() {
            debug!("redemption of blank token");
            return Err(QrVaultError::TokenInvalidOrExpired);
        }

        let Some(record) = self.store.take_token(token)? else {
            debug!("redemption of unknown or consumed token");
            return Err(QrVaultError::TokenInvalidOrExpired);
        };

        // The store may not have swept this record yet.
        if record.is_expired(Utc::now()) {
            warn!(
                credential = %record.credential_id,
                expired_at = %record.expires_at,
                "redemption of expired token"
            );
            return Err(QrVaultError::TokenInvalidOrExpired);
        }

        let credential = self
            .store
            .find_credential(&record.credential_id, &record.owner)
            .map_err(|e| log_open_failure(&record, e))?
            .ok_or(QrVaultError::TokenInvalidOrExpired)?;

        let view = self
            .open_credential(&credential)
            .map_err(|e| log_open_failure(&record, e))?;

        debug!(credential = %record.credential_id, "share token redeemed");
        Ok(view)
    }

    /// Run the store's expiry sweep now.  Returns how many tokens went.
    pub fn purge_expired_tokens(&self) -> Result<usize> {
        self.store.purge_expired(Utc::now())
    }

    fn open_credential(&self, credential: &CredentialRecord) -> Result<CredentialView> {
        Ok(CredentialView {
            title: credential.title.clone(),
            username: self.cipher.open(&credential.username)?,
            password: self.cipher.open(&credential.password)?,
            notes: self.cipher.open(&credential.notes)?,
            expiry: credential.expiry,
        })
    }
}

/// Integrity and envelope failures mean tampering, a key mismatch or a
/// data bug; operators get the detail, callers get the opaque error.
fn log_open_failure(record: &ShareToken, e: QrVaultError) -> QrVaultError {
    match &e {
        QrVaultError::IntegrityError | QrVaultError::MalformedEnvelope(_) => {
            error!(
                credential = %record.credential_id,
                owner = %record.owner,
                error = %e,
                "failed to open shared credential"
            );
        }
        other => {
            error!(credential = %record.credential_id, error = %other, "store failure during redemption");
        }
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{EncryptionKey, Envelope};
    use crate::store::MemoryStore;

    fn service() -> VaultService<MemoryStore> {
        let cipher = EnvelopeCipher::new(EncryptionKey::new([7; 32]));
        VaultService::new(cipher, MemoryStore::new())
    }

    fn alice() -> OwnerId {
        OwnerId::new("alice").unwrap()
    }

    fn bank() -> NewCredential {
        NewCredential {
            title: "  Bank ".into(),
            username: "alice".into(),
            password: "p@ss".into(),
            notes: None,
            expiry: None,
        }
    }

    #[test]
    fn save_trims_title_and_seals_fields() {
        let svc = service();
        let id = svc.save_credential(&alice(), &bank()).unwrap();

        let rec = svc.store().find_credential(&id, &alice()).unwrap().unwrap();
        assert_eq!(rec.title, "Bank");
        assert!(!rec.username.is_empty());
        assert!(!rec.password.is_empty());
        assert_eq!(rec.notes, Envelope::Empty);
    }

    #[test]
    fn save_treats_empty_notes_as_absent() {
        let svc = service();
        let mut input = bank();
        input.notes = Some(String::new());
        let id = svc.save_credential(&alice(), &input).unwrap();

        let rec = svc.store().find_credential(&id, &alice()).unwrap().unwrap();
        assert_eq!(rec.notes, Envelope::Empty);
    }

    #[test]
    fn save_rejects_missing_fields() {
        let svc = service();
        let mutations: [fn(&mut NewCredential); 3] = [
            |c| c.title = "   ".into(),
            |c| c.username.clear(),
            |c| c.password.clear(),
        ];
        for mutate in mutations {
            let mut input = bank();
            mutate(&mut input);
            assert!(matches!(
                svc.save_credential(&alice(), &input),
                Err(QrVaultError::Validation(_))
            ));
        }
        assert!(svc.list_credentials(&alice()).unwrap().is_empty());
    }

    #[test]
    fn blank_token_is_refused_like_unknown_token() {
        let svc = service();
        for blank in ["", "  ", "\t\n"] {
            assert!(matches!(
                svc.redeem_share_token(blank),
                Err(QrVaultError::TokenInvalidOrExpired)
            ));
        }
    }

    #[test]
    fn tampered_credential_consumes_token_and_fails_closed() {
        let svc = service();
        let id = svc.save_credential(&alice(), &bank()).unwrap();
        let issued = svc.issue_share_token(&alice(), &id).unwrap();

        // Swap in a record whose password envelope was sealed under another key.
        let other = EnvelopeCipher::new(EncryptionKey::new([8; 32]));
        let mut rec = svc.store().find_credential(&id, &alice()).unwrap().unwrap();
        rec.id = CredentialId::new();
        rec.password = other.seal(Some("p@ss")).unwrap();
        svc.store().insert_credential(&rec).unwrap();
        let forged = ShareToken::issue(rec.id, alice(), Utc::now());
        svc.store().insert_token(&forged).unwrap();

        assert!(matches!(
            svc.redeem_share_token(&forged.token),
            Err(QrVaultError::IntegrityError)
        ));
        assert!(matches!(
            svc.redeem_share_token(&forged.token),
            Err(QrVaultError::TokenInvalidOrExpired)
        ));

        // The untouched sibling token still works.
        assert_eq!(svc.redeem_share_token(&issued.token).unwrap().password, "p@ss");
    }
}
