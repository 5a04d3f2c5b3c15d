//! dpdmark configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MarketingError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketingConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub feeds: FeedConfig,
}

impl MarketingConfig {
    /// Load config from `DPDMARK_CONFIG` or the default path, then apply env overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var("DPDMARK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MarketingError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| MarketingError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| MarketingError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `SITE_BASE` and `DPD_DB` take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var("SITE_BASE")
            && !base.trim().is_empty()
        {
            self.server.site_base = base.trim().to_string();
        }
        if let Ok(db) = std::env::var("DPD_DB")
            && !db.trim().is_empty()
        {
            self.database.path = db.trim().to_string();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scheduler.interval_secs == 0 {
            return Err(MarketingError::Config(
                "scheduler.interval_secs must be at least 1".into(),
            ));
        }
        if self.feeds.rss_limit == 0 {
            return Err(MarketingError::Config("feeds.rss_limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the dpdmark home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dpdmark")
    }
}

/// HTTP server and public site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL used in feeds, no trailing slash.
    #[serde(default = "default_site_base")]
    pub site_base: String,
    #[serde(default = "default_site_title")]
    pub site_title: String,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8000 }
fn default_site_base() -> String { "http://localhost:8000".into() }
fn default_site_title() -> String { "DPD Journals".into() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            site_base: default_site_base(),
            site_title: default_site_title(),
        }
    }
}

impl ServerConfig {
    /// Site base without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.site_base.trim_end_matches('/')
    }
}

/// SQLite location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String { "~/.dpdmark/dpd_marketing.sqlite3".into() }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

impl DatabaseConfig {
    /// Path with `~` expanded. `:memory:` is passed through.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).to_string())
    }
}

/// Dispatch loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Characters of content/subject copied onto the dispatch event.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn bool_true() -> bool { true }
fn default_interval_secs() -> u64 { 30 }
fn default_preview_chars() -> usize { 100 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            preview_chars: default_preview_chars(),
        }
    }
}

/// Sitemap / RSS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_rss_limit")]
    pub rss_limit: usize,
    #[serde(default = "default_rss_description_chars")]
    pub rss_description_chars: usize,
}

fn default_rss_limit() -> usize { 20 }
fn default_rss_description_chars() -> usize { 400 }

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            rss_limit: default_rss_limit(),
            rss_description_chars: default_rss_description_chars(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = MarketingConfig::default();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.scheduler.interval_secs, 30);
        assert_eq!(cfg.scheduler.preview_chars, 100);
        assert_eq!(cfg.feeds.rss_limit, 20);
        assert_eq!(cfg.feeds.rss_description_chars, 400);
        assert!(cfg.scheduler.enabled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg = MarketingConfig::from_toml(
            r#"
            [server]
            port = 9000
            site_base = "https://dpdjournals.com/"

            [scheduler]
            interval_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.base_url(), "https://dpdjournals.com");
        assert_eq!(cfg.scheduler.interval_secs, 5);
        assert_eq!(cfg.scheduler.preview_chars, 100);
        assert_eq!(cfg.feeds.rss_limit, 20);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = MarketingConfig::from_toml("[scheduler]\ninterval_secs = 0\n").unwrap_err();
        assert!(matches!(err, MarketingError::Config(_)));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("dpdmark-config-test");
        let path = dir.join("config.toml");
        let mut cfg = MarketingConfig::default();
        cfg.server.site_title = "Test Site".into();
        cfg.save_to(&path).unwrap();
        let loaded = MarketingConfig::load_from(&path).unwrap();
        assert_eq!(loaded.server.site_title, "Test Site");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_memory_db_path_passthrough() {
        let db = DatabaseConfig { path: ":memory:".into() };
        assert_eq!(db.resolved_path(), PathBuf::from(":memory:"));
    }
}
