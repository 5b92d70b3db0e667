//! Configuration management for SaleSystem

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Default backend root used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost/salesystem";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend root; resource paths like `api/facturas.php` are appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Last user that logged in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Persisted PHP session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// Session cookie with expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Raw `name=value` cookie pair sent back on every request
    pub cookie: String,

    /// Session expiration time
    pub expires_at: DateTime<Utc>,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// How often expired in-memory entries are swept
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Keep long-lived responses on disk between runs
    #[serde(default = "default_persistent_cache")]
    pub persistent_cache: bool,

    /// Maximum number of entries kept on disk
    #[serde(default = "default_persistent_cap")]
    pub persistent_cap: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_persistent_cache() -> bool {
    true
}

fn default_persistent_cap() -> usize {
    crate::cache::PERSISTENT_CAP
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            sweep_interval_secs: default_sweep_interval(),
            persistent_cache: default_persistent_cache(),
            persistent_cap: default_persistent_cap(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".salesystem").join("config.yaml"))
    }

    /// Resolve an optional override into a concrete path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match Self::load_at(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an optional override path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Session cookie lives in here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Check if the session is missing or has expired
    pub fn is_session_expired(&self) -> bool {
        match &self.session {
            None => true,
            Some(session) => session.expires_at <= Utc::now(),
        }
    }

    /// Validate that a usable session is present
    pub fn validate_session(&self) -> Result<&Session> {
        match &self.session {
            Some(session) if !self.is_session_expired() => Ok(session),
            _ => Err(ConfigError::MissingSession.into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            session: None,
            preferences: Preferences::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.session.is_none());
        assert_eq!(config.preferences.sweep_interval_secs, 60);
        assert_eq!(config.preferences.persistent_cap, 50);
        assert!(config.preferences.persistent_cache);
    }

    #[test]
    fn test_session_expiry() {
        let mut config = Config::default();
        assert!(config.is_session_expired());
        assert!(config.validate_session().is_err());

        config.session = Some(Session {
            cookie: "PHPSESSID=abc".to_string(),
            expires_at: Utc::now() - chrono::Duration::hours(1),
        });
        assert!(config.is_session_expired());

        config.session = Some(Session {
            cookie: "PHPSESSID=abc".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        });
        assert!(!config.is_session_expired());
        assert_eq!(config.validate_session().unwrap().cookie, "PHPSESSID=abc");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.base_url = "https://ventas.example.com".to_string();
        config.username = Some("admin".to_string());
        config.save_to(path.clone()).unwrap();

        let loaded = Config::load_from(path).unwrap();
        assert_eq!(loaded.base_url, "https://ventas.example.com");
        assert_eq!(loaded.username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "username: caja1\n").unwrap();

        let config = Config::load_from(path).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.preferences.persistent_cap, 50);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");
        let config = Config::load_or_default(path.to_str()).unwrap();
        assert!(config.username.is_none());
    }
}
