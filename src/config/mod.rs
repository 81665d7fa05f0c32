use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{ChainDescriptor, ChainRegistry};
use crate::error::{Error, Result};
use crate::infrastructure::AirtableSettings;

pub const TOKEN_ENV: &str = "LABELDESK_STORE_TOKEN";
pub const BASE_ENV: &str = "LABELDESK_STORE_BASE";
const CONFIG_ENV: &str = "LABELDESK_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    pub api_url: Option<String>,
    pub table: Option<String>,
    pub view: Option<String>,
    pub projects_table: Option<String>,
    pub categories_table: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_chain")]
    pub default_chain: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_true")]
    pub auto_enrich: bool,

    #[serde(default)]
    pub persist_all_time_stats: bool,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub chains: Vec<ChainDescriptor>,
}

fn default_chain() -> String {
    "8453".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_chain: default_chain(),
            timeout_secs: default_timeout_secs(),
            auto_enrich: true,
            persist_all_time_stats: false,
            store: StoreConfig::default(),
            chains: Vec::new(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn registry(&self) -> ChainRegistry {
        ChainRegistry::builtin().with_overrides(self.chains.clone())
    }

    /// Store settings with credentials pulled from the environment.
    pub fn airtable_settings(&self) -> Result<AirtableSettings> {
        let token = env_secret(TOKEN_ENV)?;
        let base = env_secret(BASE_ENV)?;
        Ok(self.airtable_settings_with(base, token))
    }

    pub fn airtable_settings_with(&self, base: String, token: String) -> AirtableSettings {
        let defaults = AirtableSettings::default();
        let store = &self.store;
        AirtableSettings {
            api_url: store.api_url.clone().unwrap_or(defaults.api_url),
            base,
            token,
            table: store.table.clone().unwrap_or(defaults.table),
            view: store.view.clone().unwrap_or(defaults.view),
            projects_table: store.projects_table.clone().unwrap_or(defaults.projects_table),
            categories_table: store
                .categories_table
                .clone()
                .unwrap_or(defaults.categories_table),
        }
    }
}

fn env_secret(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(Error::Config(format!("{name} is not set"))),
    }
}

/// Load from `path`, or the default location. A missing or broken file means
/// defaults; the reason is logged.
pub fn load(path: Option<&Path>) -> Config {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            if path.exists() {
                tracing::warn!(path = %path.display(), error = %err, "config unreadable, using defaults");
            }
            return Config::default();
        }
    };
    match parse(&content) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "config loaded");
            config
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "config invalid, using defaults");
            Config::default()
        }
    }
}

pub fn parse(content: &str) -> Result<Config> {
    toml::from_str::<Config>(content).map_err(|err| Error::Config(err.to_string()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("labeldesk").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("labeldesk").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "labeldesk", "labeldesk")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("labeldesk"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("labeldesk"));
    }
    directories::ProjectDirs::from("io", "labeldesk", "labeldesk")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn stats_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("stats.sqlite3"))
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("labeldesk.log"))
}

pub fn exports_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("exports"))
}
