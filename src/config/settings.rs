use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{QrVaultError, Result};

/// Environment variable overriding `public_url`.
pub const PUBLIC_URL_ENV: &str = "QRVAULT_PUBLIC_URL";

/// Project-level configuration, loaded from `.qrvault.toml`.
///
/// Every field has a sensible default so QrVault works out-of-the-box
/// without any config file at all.  The encryption key is never read
/// from here; see `crypto::EncryptionKey::from_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL share links point at.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Path under `public_url` that serves token redemption.
    #[serde(default = "default_redeem_path")]
    pub redeem_path: String,

    /// SQLite database file, relative to the project root.
    #[serde(default = "default_database")]
    pub database: String,

    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_public_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_redeem_path() -> String {
    "/api/vault/view".to_string()
}

fn default_database() -> String {
    ".qrvault/vault.db".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            public_url: default_public_url(),
            redeem_path: default_redeem_path(),
            database: default_database(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".qrvault.toml";

    /// Load settings from `<project_dir>/.qrvault.toml`, then apply
    /// environment overrides.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        let mut settings = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str(&contents).map_err(|e| {
                QrVaultError::ConfigError(format!(
                    "Failed to parse {}: {e}",
                    config_path.display()
                ))
            })?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(PUBLIC_URL_ENV) {
            settings.apply_public_url(&url);
        }

        Ok(settings)
    }

    /// Use `url` as the share-link base unless it is blank.
    pub fn apply_public_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.public_url = url.to_string();
        }
    }

    /// Full path to the database file.
    pub fn database_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.database)
    }

    /// Full redemption URL for `token`.
    pub fn share_url(&self, token: &str) -> String {
        crate::share::share_url(&self.public_url, &self.redeem_path, token)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.public_url, "http://localhost:5000");
        assert_eq!(s.redeem_path, "/api/vault/view");
        assert_eq!(s.database, ".qrvault/vault.db");
        assert_eq!(s.log_level, "warn");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
public_url = "https://vault.example.com"
redeem_path = "/r"
database = "data/creds.db"
log_level = "debug"
"#;
        fs::write(tmp.path().join(".qrvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.redeem_path, "/r");
        assert_eq!(settings.database, "data/creds.db");
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".qrvault.toml"), "log_level = \"info\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.redeem_path, "/api/vault/view");
        assert_eq!(settings.database, ".qrvault/vault.db");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".qrvault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(QrVaultError::ConfigError(_))));
    }

    #[test]
    fn blank_public_url_is_ignored() {
        let mut s = Settings::default();
        s.apply_public_url("   ");
        assert_eq!(s.public_url, "http://localhost:5000");
        s.apply_public_url(" https://v.example ");
        assert_eq!(s.public_url, "https://v.example");
    }

    #[test]
    fn share_url_uses_configured_parts() {
        let s = Settings {
            public_url: "https://v.example/".to_string(),
            ..Settings::default()
        };
        assert_eq!(s.share_url("tok"), "https://v.example/api/vault/view/tok");
    }

    #[test]
    fn database_path_is_relative_to_project() {
        let s = Settings::default();
        let path = s.database_path(Path::new("/home/user/project"));
        assert_eq!(path, PathBuf::from("/home/user/project/.qrvault/vault.db"));
    }
}
