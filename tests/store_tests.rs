//! Behaviour shared by every store implementation, plus SQLite persistence.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use qrvault::crypto::{EncryptionKey, EnvelopeCipher};
use qrvault::identity::{CredentialId, OwnerId};
use qrvault::share::ShareToken;
use qrvault::store::{CredentialStore, MemoryStore, SqliteStore, TokenStore};
use qrvault::vault::CredentialRecord;

fn record(owner: &str, title: &str, created_at: DateTime<Utc>) -> CredentialRecord {
    let cipher = EnvelopeCipher::new(EncryptionKey::new([9u8; 32]));
    CredentialRecord {
        id: CredentialId::new(),
        owner: OwnerId::new(owner).unwrap(),
        title: title.into(),
        username: cipher.seal(Some("user")).unwrap(),
        password: cipher.seal(Some("secret")).unwrap(),
        notes: cipher.seal(None).unwrap(),
        expiry: None,
        created_at,
    }
}

fn check_credential_contract<S: CredentialStore>(store: &S) {
    let now = Utc::now().trunc_subsecs(0);
    let older = record("alice", "Older", now - Duration::hours(1));
    let newer = record("alice", "Newer", now);
    let foreign = record("bob", "Bob's", now);

    store.insert_credential(&newer).unwrap();
    store.insert_credential(&older).unwrap();
    store.insert_credential(&foreign).unwrap();

    let alice = OwnerId::new("alice").unwrap();
    let titles: Vec<_> = store
        .list_credentials(&alice)
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, ["Older", "Newer"]);

    let found = store.find_credential(&newer.id, &alice).unwrap().unwrap();
    assert_eq!(found, newer);
    assert!(store.find_credential(&foreign.id, &alice).unwrap().is_none());
    assert!(store.insert_credential(&newer).is_err());
}

fn check_token_contract<S: TokenStore>(store: &S) {
    let now = Utc::now();
    let owner = OwnerId::new("alice").unwrap();
    let live = ShareToken::issue(CredentialId::new(), owner.clone(), now);
    let mut stale = ShareToken::issue(CredentialId::new(), owner, now);
    stale.expires_at = now - Duration::seconds(1);

    store.insert_token(&live).unwrap();
    store.insert_token(&stale).unwrap();

    // Purge first: every later insert sweeps expired records on its own.
    assert_eq!(store.purge_expired(now).unwrap(), 1);
    assert!(store.take_token(&stale.token).unwrap().is_none());
    assert!(store.insert_token(&live).is_err());

    let taken = store.take_token(&live.token).unwrap().unwrap();
    assert_eq!(taken.token, live.token);
    assert_eq!(taken.credential_id, live.credential_id);
    assert!(taken.single_use);
    assert!(store.take_token(&live.token).unwrap().is_none());
}

fn check_insert_sweeps_expired<S: TokenStore>(store: &S) {
    let now = Utc::now();
    let owner = OwnerId::new("alice").unwrap();
    let mut stale = ShareToken::issue(CredentialId::new(), owner.clone(), now);
    stale.expires_at = now - Duration::seconds(1);
    store.insert_token(&stale).unwrap();

    // Inserting any token sweeps the stale one out.
    let fresh = ShareToken::issue(CredentialId::new(), owner, now);
    store.insert_token(&fresh).unwrap();
    assert!(store.insert_token(&fresh).is_err());

    assert_eq!(store.purge_expired(Utc::now()).unwrap(), 0);
    assert!(store.take_token(&stale.token).unwrap().is_none());
    assert!(store.take_token(&fresh.token).unwrap().is_some());
}

#[test]
fn memory_store_honours_contract() {
    let store = MemoryStore::new();
    check_credential_contract(&store);
    check_token_contract(&store);
    check_insert_sweeps_expired(&store);
}

#[test]
fn sqlite_store_honours_contract() {
    let store = SqliteStore::open_in_memory().unwrap();
    check_credential_contract(&store);
    check_token_contract(&store);
    check_insert_sweeps_expired(&store);
}

#[test]
fn sqlite_data_survives_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("vault.db");
    let rec = record("alice", "Bank", Utc::now().trunc_subsecs(0));
    let token = ShareToken::issue(rec.id, rec.owner.clone(), Utc::now());

    {
        let store = SqliteStore::open(&path).unwrap();
        store.insert_credential(&rec).unwrap();
        store.insert_token(&token).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let found = store.find_credential(&rec.id, &rec.owner).unwrap().unwrap();
    assert_eq!(found.username, rec.username);
    assert_eq!(found.notes, rec.notes);
    assert!(store.take_token(&token.token).unwrap().is_some());
}
