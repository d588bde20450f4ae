//! Configuration: embedded defaults overlaid with the user's config file

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::models::DEFAULT_CATEGORY;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    remote: RemoteConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    items: ItemsConfig,
}

#[derive(Deserialize, Default)]
struct RemoteConfig {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Deserialize, Default)]
struct StorageConfig {
    cache_path: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
struct ItemsConfig {
    default_category: Option<String>,
    seed_demo: Option<bool>,
}

pub struct Config {
    remote: RemoteConfig,
    storage: StorageConfig,
    items: ItemsConfig,
}

impl Config {
    /// Embedded defaults plus `<config_dir>/quickclip/config.toml` if present.
    /// An unreadable or malformed user file is logged and ignored.
    pub fn load() -> Self {
        let mut config = Self::defaults();

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => {
                        if let Err(e) = config.overlay_str(&contents) {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    }
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        config
    }

    /// Embedded defaults only
    pub fn defaults() -> Self {
        // The embedded file is part of the crate; fall back to empty sections
        // rather than panic if it ever fails to parse.
        let base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap_or_default();
        Self {
            remote: base.remote,
            storage: base.storage,
            items: base.items,
        }
    }

    /// Overlay keys present in `contents` onto this config
    pub fn overlay_str(&mut self, contents: &str) -> Result<(), toml::de::Error> {
        let user: ConfigFile = toml::from_str(contents)?;
        merge_remote(&mut self.remote, user.remote);
        if user.storage.cache_path.is_some() {
            self.storage.cache_path = user.storage.cache_path;
        }
        merge_items(&mut self.items, user.items);
        Ok(())
    }

    pub fn set_remote_url(&mut self, url: impl Into<String>) {
        self.remote.url = Some(url.into());
    }

    pub fn set_cache_path(&mut self, path: impl AsRef<Path>) {
        self.storage.cache_path = Some(path.as_ref().to_path_buf());
    }

    /// Remote item document URL, if configured
    pub fn remote_url(&self) -> Option<&str> {
        self.remote
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Fetch timeout (clamped to 1..=300 seconds)
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs.unwrap_or(10).clamp(1, 300))
    }

    /// SQLite cache location; `<data_dir>/quickclip/cache.sqlite` by default
    pub fn cache_path(&self) -> PathBuf {
        self.storage.cache_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("quickclip")
                .join("cache.sqlite")
        })
    }

    /// Category used by bulk-add when none is given
    pub fn default_category(&self) -> &str {
        self.items
            .default_category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Whether an empty cache is seeded with the demo snippets
    pub fn seed_demo(&self) -> bool {
        self.items.seed_demo.unwrap_or(true)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("quickclip").join("config.toml"))
}

fn merge_remote(base: &mut RemoteConfig, user: RemoteConfig) {
    if user.url.is_some() {
        base.url = user.url;
    }
    if user.timeout_secs.is_some() {
        base.timeout_secs = user.timeout_secs;
    }
}

fn merge_items(base: &mut ItemsConfig, user: ItemsConfig) {
    if user.default_category.is_some() {
        base.default_category = user.default_category;
    }
    if user.seed_demo.is_some() {
        base.seed_demo = user.seed_demo;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults() {
        let config = Config::defaults();
        assert_eq!(config.remote_url(), None);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.default_category(), DEFAULT_CATEGORY);
        assert!(config.seed_demo());
        assert!(config.cache_path().ends_with("quickclip/cache.sqlite"));
    }

    #[test]
    fn test_overlay_only_replaces_given_keys() {
        let mut config = Config::defaults();
        config
            .overlay_str(
                r#"
                [remote]
                url = "https://example.test/items.json"

                [items]
                seed_demo = false
                "#,
            )
            .unwrap();
        assert_eq!(config.remote_url(), Some("https://example.test/items.json"));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert!(!config.seed_demo());
        assert_eq!(config.default_category(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_malformed_overlay_leaves_config_untouched() {
        let mut config = Config::defaults();
        assert!(config.overlay_str("[remote\nurl = ").is_err());
        assert_eq!(config.remote_url(), None);
    }

    #[test]
    fn test_timeout_clamped_and_blank_values_ignored() {
        let mut config = Config::defaults();
        config
            .overlay_str("[remote]\nurl = \"  \"\ntimeout_secs = 0\n[items]\ndefault_category = \" \"")
            .unwrap();
        assert_eq!(config.remote_url(), None);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(1));
        assert_eq!(config.default_category(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::defaults();
        config.set_remote_url("https://override.test/x.json");
        config.set_cache_path("/tmp/qc/cache.sqlite");
        assert_eq!(config.remote_url(), Some("https://override.test/x.json"));
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/qc/cache.sqlite"));
    }
}
