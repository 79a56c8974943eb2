//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::Parser;

use crate::config::Settings;
use crate::crypto::{EncryptionKey, EnvelopeCipher};
use crate::errors::{QrVaultError, Result};
use crate::identity::OwnerId;
use crate::store::SqliteStore;
use crate::vault::VaultService;

/// The service as wired up by the binary.
pub type CliVault = VaultService<SqliteStore>;

/// QrVault CLI: encrypted credentials with single-use share links.
#[derive(Parser)]
#[command(
    name = "qrvault",
    about = "Encrypted credential vault with single-use share links",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verified identity of the caller, as issued by your identity provider
    #[arg(long, env = "QRVAULT_OWNER", global = true)]
    pub owner: Option<String>,

    /// Database file (overrides `database` in .qrvault.toml)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt and store a credential
    Save {
        /// Display title (stored in plaintext)
        title: String,
        /// Account username
        #[arg(short, long)]
        username: String,
        /// Account password (omit for interactive prompt or piped stdin)
        #[arg(short, long)]
        password: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Expiry date of the credential itself (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        expiry: Option<String>,
    },

    /// List your stored credentials (titles and dates only)
    List,

    /// Issue a single-use share link for a credential
    Share {
        /// Credential id (from `qrvault list`)
        credential_id: String,
        /// Print the link without the QR code
        #[arg(long)]
        no_qr: bool,
    },

    /// Redeem a share link once and print the credential
    Redeem {
        /// Share token or full share URL
        token: String,
        /// Print the credential as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove expired share tokens from the database
    Purge,

    /// Generate a new encryption key
    Keygen,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `.qrvault.toml` from the current directory.
pub fn load_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    Settings::load(&cwd)
}

/// Resolve the caller identity from `--owner` / `QRVAULT_OWNER`.
pub fn require_owner(cli: &Cli) -> Result<OwnerId> {
    match cli.owner.as_deref() {
        Some(owner) => OwnerId::new(owner),
        None => Err(QrVaultError::Validation(
            "owner identity required: pass --owner or set QRVAULT_OWNER".into(),
        )),
    }
}

/// Database path from `--db`, falling back to the configured one.
pub fn database_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    match &cli.db {
        Some(path) => Ok(PathBuf::from(path)),
        None => {
            let cwd = std::env::current_dir()?;
            Ok(settings.database_path(&cwd))
        }
    }
}

/// Load the key and open the database.
///
/// The key is checked first so a bad deployment fails before anything
/// touches the disk.
pub fn open_service(cli: &Cli, settings: &Settings) -> Result<CliVault> {
    let key = EncryptionKey::from_env()?;
    let store = SqliteStore::open(&database_path(cli, settings)?)?;
    Ok(VaultService::new(EnvelopeCipher::new(key), store))
}

/// Parse a credential expiry given as `YYYY-MM-DD` (midnight UTC) or RFC 3339.
pub fn parse_expiry(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        QrVaultError::Validation(format!(
            "invalid expiry '{input}'; use YYYY-MM-DD or an RFC 3339 timestamp"
        ))
    })?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| QrVaultError::Validation(format!("invalid expiry '{input}'")))?;
    Ok(Utc.from_utc_datetime(&midnight))
}
