//! Launcher configuration (`<config dir>/config.toml`)
//!
//! Handles loading, saving, and providing defaults for launcher settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use brickbox_core::RuntimeConfig;
use brickbox_shared::{LISTING_PATH, LOCAL_DEV_BASE_URL};

/// Overrides the catalog base URL
pub const ENV_CATALOG_URL: &str = "BRICKBOX_CATALOG_URL";
/// Overrides the catalog bearer token
pub const ENV_CATALOG_TOKEN: &str = "BRICKBOX_CATALOG_TOKEN";

/// Launcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LauncherConfig {
    /// Game listing service
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Game module loading
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Frame loop
    #[serde(default)]
    pub runtime: RuntimeSettings,
    /// Audio settings
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Game listing service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the listing service (default: local dev server)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the listing endpoint below `base_url`
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    /// Bearer credential sent with the listing request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Request timeout in milliseconds (default: 5000)
    #[serde(default = "default_catalog_timeout")]
    pub timeout_ms: u64,
    /// Largest listing response accepted, in bytes (default: 1MB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Game module loading configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Fetch + compile timeout in milliseconds (default: 10000)
    #[serde(default = "default_loader_timeout")]
    pub timeout_ms: u64,
    /// Largest module accepted, in bytes (default: 8MB)
    #[serde(default = "default_max_module_bytes")]
    pub max_module_bytes: usize,
    /// Guest linear memory limit, in bytes (default: 4MB)
    #[serde(default = "default_ram_limit")]
    pub ram_limit: usize,
}

/// Frame loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Ticks per second (default: 60)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Largest frame delta fed to the loop, in milliseconds (default: 100)
    #[serde(default = "default_max_delta")]
    pub max_delta_ms: u64,
    /// Per-tick CPU budget before warning, in microseconds (default: 4000)
    #[serde(default = "default_cpu_budget")]
    pub cpu_budget_us: u64,
}

/// Audio configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Master volume level (default: 0.8, range: 0.0-1.0)
    #[serde(default = "default_volume")]
    pub master_volume: f32,
    #[serde(default)]
    pub muted: bool,
}

fn default_base_url() -> String {
    LOCAL_DEV_BASE_URL.to_string()
}
fn default_listing_path() -> String {
    LISTING_PATH.to_string()
}
fn default_catalog_timeout() -> u64 {
    5000
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_loader_timeout() -> u64 {
    10_000
}
fn default_max_module_bytes() -> usize {
    8 * 1024 * 1024
}
fn default_ram_limit() -> usize {
    brickbox_core::DEFAULT_RAM_LIMIT
}

fn default_tick_rate() -> u32 {
    60
}
fn default_max_delta() -> u64 {
    100
}
fn default_cpu_budget() -> u64 {
    4000
}

fn default_volume() -> f32 {
    0.8
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_path: default_listing_path(),
            token: None,
            timeout_ms: default_catalog_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_loader_timeout(),
            max_module_bytes: default_max_module_bytes(),
            ram_limit: default_ram_limit(),
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            max_delta_ms: default_max_delta(),
            cpu_budget_us: default_cpu_budget(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: default_volume(),
            muted: false,
        }
    }
}

impl CatalogConfig {
    /// Full listing URL: `<base>/<listing path>` with exactly one slash between.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.listing_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl LoaderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl RuntimeSettings {
    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            tick_rate: self.tick_rate.max(1),
            max_delta: Duration::from_millis(self.max_delta_ms),
            cpu_budget: Duration::from_micros(self.cpu_budget_us),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.brickbox", "", "Brickbox")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path of the default `config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

impl LauncherConfig {
    /// Loads the configuration from the platform config directory.
    ///
    /// Returns default values if the file doesn't exist or cannot be parsed.
    /// Environment overrides are applied on top.
    pub fn load() -> Self {
        let mut config = config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default();
        config.apply_env_overrides();
        config
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Saves the configuration to the platform config directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = config_path().context("No config directory on this platform")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Apply `BRICKBOX_CATALOG_URL` / `BRICKBOX_CATALOG_TOKEN`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Blank values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = lookup(ENV_CATALOG_URL) {
            self.catalog.base_url = url;
        }
        if let Some(token) = lookup(ENV_CATALOG_TOKEN) {
            self.catalog.token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================
    // Default value tests
    // =============================================================

    #[test]
    fn test_config_default() {
        let config = LauncherConfig::default();
        assert_eq!(config.catalog.base_url, "http://127.0.0.1:54321");
        assert_eq!(config.catalog.listing_path, "functions/v1/list");
        assert_eq!(config.catalog.token, None);
        assert_eq!(config.catalog.timeout(), Duration::from_secs(5));
        assert_eq!(config.catalog.max_body_bytes, 1024 * 1024);
        assert_eq!(config.loader.timeout(), Duration::from_secs(10));
        assert_eq!(config.loader.max_module_bytes, 8 * 1024 * 1024);
        assert_eq!(config.runtime.tick_rate, 60);
        assert!((config.audio.master_volume - 0.8).abs() < f32::EPSILON);
        assert!(!config.audio.muted);
    }

    #[test]
    fn test_listing_url_joins_once() {
        let mut catalog = CatalogConfig::default();
        assert_eq!(catalog.listing_url(), "http://127.0.0.1:54321/functions/v1/list");

        catalog.base_url = "https://games.example/".into();
        catalog.listing_path = "/functions/v1/list".into();
        assert_eq!(catalog.listing_url(), "https://games.example/functions/v1/list");
    }

    #[test]
    fn test_runtime_settings_conversion() {
        let settings = RuntimeSettings {
            tick_rate: 0,
            max_delta_ms: 250,
            cpu_budget_us: 1000,
        };
        let runtime = settings.to_runtime_config();
        assert_eq!(runtime.tick_rate, 1);
        assert_eq!(runtime.max_delta, Duration::from_millis(250));
        assert_eq!(runtime.cpu_budget, Duration::from_micros(1000));
    }

    // =============================================================
    // TOML serialization tests
    // =============================================================

    #[test]
    fn test_config_deserialize_empty() {
        let config: LauncherConfig = toml::from_str("").unwrap();
        assert_eq!(config, LauncherConfig::default());
    }

    #[test]
    fn test_config_deserialize_partial_catalog() {
        let toml_str = r#"
[catalog]
base_url = "https://brick.example"
token = "anon-key"
"#;
        let config: LauncherConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.catalog.base_url, "https://brick.example");
        assert_eq!(config.catalog.token.as_deref(), Some("anon-key"));
        assert_eq!(config.catalog.listing_path, "functions/v1/list"); // default
        assert_eq!(config.loader, LoaderConfig::default());
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = LauncherConfig::default();
        config.runtime.tick_rate = 30;
        config.audio.muted = true;
        config.catalog.token = Some("secret".into());
        config.save_to(&path).unwrap();

        let loaded = LauncherConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[runtime]\ntick_rate = \"fast\"\n").unwrap();
        assert!(LauncherConfig::load_from(&path).is_err());
        assert!(LauncherConfig::load_from(&dir.path().join("missing.toml")).is_err());
    }

    // =============================================================
    // Override tests
    // =============================================================

    #[test]
    fn test_overrides_applied() {
        let mut config = LauncherConfig::default();
        config.apply_overrides_from(|key| match key {
            ENV_CATALOG_URL => Some("https://override.example".into()),
            ENV_CATALOG_TOKEN => Some("tok".into()),
            _ => None,
        });
        assert_eq!(config.catalog.base_url, "https://override.example");
        assert_eq!(config.catalog.token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_blank_overrides_ignored() {
        let mut config = LauncherConfig::default();
        config.apply_overrides_from(|_| Some("  ".into()));
        assert_eq!(config, LauncherConfig::default());
    }
}
