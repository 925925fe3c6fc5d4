//! Configuration management for oracled.
//!
//! Loads settings from /etc/oracle/config.toml or uses defaults. A missing
//! file is normal; a malformed file logs a warning and falls back to
//! defaults rather than refusing to start.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/oracle/config.toml";

/// Generation backend configuration.
///
/// Each pipeline stage gets its own timeout: extraction and synthesis see
/// longer inputs than ranking, so they get more headroom. On timeout the
/// gateway substitutes the stage's deterministic fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Administrative toggle. When false, no network call is ever attempted
    /// and every stage answers with its deterministic fallback.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Ollama-style endpoint serving /api/generate.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_extract_timeout")]
    pub extract_timeout_secs: u64,

    #[serde(default = "default_rank_timeout")]
    pub rank_timeout_secs: u64,

    #[serde(default = "default_synthesize_timeout")]
    pub synthesize_timeout_secs: u64,

    /// Response-size budget passed to the backend (num_predict).
    #[serde(default = "default_max_response_tokens")]
    pub max_response_tokens: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model() -> String {
    "qwen2.5:7b-instruct".to_string()
}

fn default_extract_timeout() -> u64 {
    8
}

fn default_rank_timeout() -> u64 {
    6
}

fn default_synthesize_timeout() -> u64 {
    10
}

fn default_max_response_tokens() -> u32 {
    1000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            extract_timeout_secs: default_extract_timeout(),
            rank_timeout_secs: default_rank_timeout(),
            synthesize_timeout_secs: default_synthesize_timeout(),
            max_response_tokens: default_max_response_tokens(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Localhost only by default.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:7610".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_seed_demo_data() -> bool {
    true
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Seed demo helpers and knowledge-base entries at startup.
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            server: ServerConfig::default(),
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

impl Config {
    /// Load from the default path, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// Load from an explicit path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config at {} - using defaults", path.display());
                Self::default()
            }
        }
    }
}
