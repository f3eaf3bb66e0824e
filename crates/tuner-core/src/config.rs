//! TOML configuration, written with defaults on first run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Debounce windows for the two regeneration paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Quiet period before the feed cache commits to a band (ms).
    #[serde(default = "default_feed_idle_ms")]
    pub feed_idle_ms: u64,
    /// Quiet period before rooms are recomputed from cached pools (ms).
    #[serde(default = "default_room_debounce_ms")]
    pub room_debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Stations per generated window.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Secondary-axis candidates per band.
    #[serde(default = "default_frequency_count")]
    pub frequency_count: usize,
    /// Minimum spacing between candidate frequencies.
    #[serde(default = "default_min_separation")]
    pub min_separation: i32,
}

/// External artist-service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Read from config or the ROOMDIAL_API_KEY env var by the binary.
    #[serde(default)]
    pub api_key: String,
    /// Delay bounds between sequential artist-detail requests (ms).
    /// Deliberate throttling for third-party rate limits.
    #[serde(default = "default_throttle_min_ms")]
    pub throttle_min_ms: u64,
    #[serde(default = "default_throttle_max_ms")]
    pub throttle_max_ms: u64,
    /// Size of the global random-genre artist pool.
    #[serde(default = "default_random_pool_size")]
    pub random_pool_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            feed_idle_ms: default_feed_idle_ms(),
            room_debounce_ms: default_room_debounce_ms(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            frequency_count: default_frequency_count(),
            min_separation: default_min_separation(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            throttle_min_ms: default_throttle_min_ms(),
            throttle_max_ms: default_throttle_max_ms(),
            random_pool_size: default_random_pool_size(),
        }
    }
}

fn default_feed_idle_ms() -> u64 {
    1000
}

fn default_room_debounce_ms() -> u64 {
    300
}

fn default_window_size() -> usize {
    8
}

fn default_frequency_count() -> usize {
    6
}

fn default_min_separation() -> i32 {
    100
}

fn default_base_url() -> String {
    "https://ws.audioscrobbler.com/2.0".to_string()
}

fn default_throttle_min_ms() -> u64 {
    100
}

fn default_throttle_max_ms() -> u64 {
    1500
}

fn default_random_pool_size() -> usize {
    30
}

impl EngineConfig {
    pub fn feed_idle(&self) -> Duration {
        Duration::from_millis(self.feed_idle_ms)
    }

    pub fn room_debounce(&self) -> Duration {
        Duration::from_millis(self.room_debounce_ms)
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roomdial")
            .join("config.toml")
    }
}
