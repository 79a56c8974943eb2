//! SQLite-backed store.
//!
//! Credentials and share tokens live in one database file.  Envelopes
//! are kept as three hex text columns each; token deadlines are unix
//! milliseconds so expiry sweeps are plain integer comparisons.
//!
//! Single redemption relies on `DELETE ... RETURNING`: the row is read
//! and removed by one statement, so a second caller finds nothing.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::crypto::Envelope;
use crate::errors::{QrVaultError, Result};
use crate::identity::{CredentialId, OwnerId};
use crate::share::ShareToken;
use crate::vault::{CredentialRecord, CredentialSummary};

use super::{CredentialStore, TokenStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS credentials (
    id               TEXT PRIMARY KEY,
    owner_id         TEXT NOT NULL,
    title            TEXT NOT NULL,
    username_content TEXT NOT NULL,
    username_iv      TEXT NOT NULL,
    username_tag     TEXT NOT NULL,
    password_content TEXT NOT NULL,
    password_iv      TEXT NOT NULL,
    password_tag     TEXT NOT NULL,
    notes_content    TEXT NOT NULL DEFAULT '',
    notes_iv         TEXT NOT NULL DEFAULT '',
    notes_tag        TEXT NOT NULL DEFAULT '',
    expiry           TEXT,
    created_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_credentials_owner ON credentials (owner_id);

CREATE TABLE IF NOT EXISTS share_tokens (
    token         TEXT PRIMARY KEY,
    credential_id TEXT NOT NULL,
    owner_id      TEXT NOT NULL,
    single_use    INTEGER NOT NULL DEFAULT 1,
    expires_at    INTEGER NOT NULL,
    created_at    INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_share_tokens_expires ON share_tokens (expires_at);
";

/// SQLite-backed credential and token store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// The parent directory is created if needed and, on Unix, the file is
    /// restricted to its owner.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| QrVaultError::Storage("connection lock poisoned".into()))
    }

    fn sweep(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
        Ok(conn.execute(
            "DELETE FROM share_tokens WHERE expires_at <= ?1",
            params![now.timestamp_millis()],
        )?)
    }
}

// ── Row conversions ──────────────────────────────────────────────────

fn conversion_error(msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(QrVaultError::Storage(msg)),
    )
}

fn parse_rfc3339(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(format!("bad timestamp '{value}': {e}")))
}

fn from_millis(ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| conversion_error(format!("bad timestamp {ms}")))
}

/// Raw credential row; envelopes are parsed after the row is read so a
/// partial envelope surfaces as `MalformedEnvelope`, not a storage error.
struct CredentialRow {
    id: String,
    owner: String,
    title: String,
    envelopes: [[String; 3]; 3],
    expiry: Option<String>,
    created_at: String,
}

impl CredentialRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            title: row.get(2)?,
            envelopes: [
                [row.get(3)?, row.get(4)?, row.get(5)?],
                [row.get(6)?, row.get(7)?, row.get(8)?],
                [row.get(9)?, row.get(10)?, row.get(11)?],
            ],
            expiry: row.get(12)?,
            created_at: row.get(13)?,
        })
    }

    fn into_record(self) -> Result<CredentialRecord> {
        let [username, password, notes] = self
            .envelopes
            .map(|[content, iv, tag]| Envelope::from_hex_parts(&content, &iv, &tag));

        Ok(CredentialRecord {
            id: self
                .id
                .parse()
                .map_err(|_| QrVaultError::Storage(format!("bad credential id '{}'", self.id)))?,
            owner: OwnerId::new(self.owner)?,
            title: self.title,
            username: username?,
            password: password?,
            notes: notes?,
            expiry: self
                .expiry
                .as_deref()
                .map(parse_rfc3339)
                .transpose()
                .map_err(QrVaultError::from)?,
            created_at: parse_rfc3339(&self.created_at)?,
        })
    }
}

impl CredentialStore for SqliteStore {
    fn insert_credential(&self, record: &CredentialRecord) -> Result<()> {
        let username = record.username.to_hex_parts();
        let password = record.password.to_hex_parts();
        let notes = record.notes.to_hex_parts();

        self.conn()?.execute(
            "INSERT INTO credentials (
                id, owner_id, title,
                username_content, username_iv, username_tag,
                password_content, password_iv, password_tag,
                notes_content, notes_iv, notes_tag,
                expiry, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                record.id.to_string(),
                record.owner.as_str(),
                record.title,
                username.content,
                username.iv,
                username.auth_tag,
                password.content,
                password.iv,
                password.auth_tag,
                notes.content,
                notes.iv,
                notes.auth_tag,
                record.expiry.map(|e| e.to_rfc3339()),
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn find_credential(
        &self,
        id: &CredentialId,
        owner: &OwnerId,
    ) -> Result<Option<CredentialRecord>> {
        let row = self
            .conn()?
            .query_row(
                "SELECT id, owner_id, title,
                        username_content, username_iv, username_tag,
                        password_content, password_iv, password_tag,
                        notes_content, notes_iv, notes_tag,
                        expiry, created_at
                 FROM credentials
                 WHERE id = ?1 AND owner_id = ?2",
                params![id.to_string(), owner.as_str()],
                CredentialRow::from_row,
            )
            .optional()?;

        row.map(CredentialRow::into_record).transpose()
    }

    fn list_credentials(&self, owner: &OwnerId) -> Result<Vec<CredentialSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, expiry, created_at
             FROM credentials
             WHERE owner_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(params![owner.as_str()], |row| {
            let id: String = row.get(0)?;
            let expiry: Option<String> = row.get(2)?;
            let created_at: String = row.get(3)?;
            Ok(CredentialSummary {
                id: id
                    .parse()
                    .map_err(|_| conversion_error(format!("bad credential id '{id}'")))?,
                title: row.get(1)?,
                expiry: expiry.as_deref().map(parse_rfc3339).transpose()?,
                created_at: parse_rfc3339(&created_at)?,
            })
        })?;

        let mut list = Vec::new();
        for row in rows {
            list.push(row?);
        }
        Ok(list)
    }
}

impl TokenStore for SqliteStore {
    fn insert_token(&self, token: &ShareToken) -> Result<()> {
        let conn = self.conn()?;
        Self::sweep(&conn, Utc::now())?;
        conn.execute(
            "INSERT INTO share_tokens (token, credential_id, owner_id, single_use, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.token,
                token.credential_id.to_string(),
                token.owner.as_str(),
                token.single_use,
                token.expires_at.timestamp_millis(),
                token.created_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    fn take_token(&self, token: &str) -> Result<Option<ShareToken>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "DELETE FROM share_tokens WHERE token = ?1
                 RETURNING token, credential_id, owner_id, single_use, expires_at, created_at",
                params![token],
                |row| {
                    let token: String = row.get(0)?;
                    let credential_id: String = row.get(1)?;
                    let owner: String = row.get(2)?;
                    let single_use: bool = row.get(3)?;
                    let expires_at: i64 = row.get(4)?;
                    let created_at: i64 = row.get(5)?;
                    Ok((token, credential_id, owner, single_use, expires_at, created_at))
                },
            )
            .optional()?;

        let Some((token, credential_id, owner, single_use, expires_at, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(ShareToken {
            token,
            credential_id: credential_id.parse().map_err(|_| {
                QrVaultError::Storage(format!("bad credential id '{credential_id}'"))
            })?,
            owner: OwnerId::new(owner)?,
            single_use,
            expires_at: from_millis(expires_at)?,
            created_at: from_millis(created_at)?,
        }))
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn()?;
        Self::sweep(&conn, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn record(owner: &str) -> CredentialRecord {
        CredentialRecord {
            id: CredentialId::new(),
            owner: OwnerId::new(owner).unwrap(),
            title: "Bank".into(),
            username: Envelope::Populated {
                ciphertext: vec![1, 2, 3],
                nonce: [7; 16],
                tag: [9; 16],
            },
            password: Envelope::Populated {
                ciphertext: vec![],
                nonce: [7; 16],
                tag: [9; 16],
            },
            notes: Envelope::Empty,
            expiry: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn open_creates_database_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("vault.db");
        let _store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn database_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.db");
        let _store = SqliteStore::open(&path).unwrap();

        let perms = std::fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }

    #[test]
    fn credential_roundtrip_keeps_envelopes() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record("alice");
        store.insert_credential(&rec).unwrap();

        let found = store
            .find_credential(&rec.id, &rec.owner)
            .unwrap()
            .expect("record should be found");
        assert_eq!(found.username, rec.username);
        assert_eq!(found.password, rec.password);
        assert_eq!(found.notes, Envelope::Empty);
        assert_eq!(found.title, "Bank");
    }

    #[test]
    fn find_with_other_owner_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record("alice");
        store.insert_credential(&rec).unwrap();

        let bob = OwnerId::new("bob").unwrap();
        assert!(store.find_credential(&rec.id, &bob).unwrap().is_none());
    }

    #[test]
    fn partial_envelope_row_is_malformed() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record("alice");
        store.insert_credential(&rec).unwrap();

        store
            .conn()
            .unwrap()
            .execute(
                "UPDATE credentials SET username_tag = '' WHERE id = ?1",
                params![rec.id.to_string()],
            )
            .unwrap();

        let result = store.find_credential(&rec.id, &rec.owner);
        assert!(matches!(result, Err(QrVaultError::MalformedEnvelope(_))));
    }

    #[test]
    fn take_token_deletes_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record("alice");
        let tok = ShareToken::issue(rec.id, rec.owner.clone(), Utc::now());
        store.insert_token(&tok).unwrap();

        let taken = store.take_token(&tok.token).unwrap().expect("token present");
        assert_eq!(taken.credential_id, rec.id);
        assert_eq!(taken.expires_at.timestamp_millis(), tok.expires_at.timestamp_millis());
        assert!(taken.single_use);

        assert!(store.take_token(&tok.token).unwrap().is_none());
    }

    #[test]
    fn insert_sweeps_expired_tokens() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record("alice");
        let now = Utc::now();

        let mut stale = ShareToken::issue(rec.id, rec.owner.clone(), now);
        stale.expires_at = now - Duration::seconds(5);
        store.insert_token(&stale).unwrap();

        let fresh = ShareToken::issue(rec.id, rec.owner.clone(), now);
        store.insert_token(&fresh).unwrap();

        assert!(store.take_token(&stale.token).unwrap().is_none());
        assert!(store.take_token(&fresh.token).unwrap().is_some());
    }

    #[test]
    fn duplicate_token_is_storage_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rec = record("alice");
        let tok = ShareToken::issue(rec.id, rec.owner.clone(), Utc::now());
        store.insert_token(&tok).unwrap();
        assert!(matches!(
            store.insert_token(&tok),
            Err(QrVaultError::Storage(_))
        ));
    }
}
