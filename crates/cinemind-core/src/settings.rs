use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini API key. The credential is only
/// ever read from the environment, never from the config file.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_recommendation_count() -> usize {
    6
}

fn default_max_output_tokens() -> u32 {
    8192
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Override the Gemini endpoint (tests, proxies).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Where exports land; defaults to the current directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(skip)]
    pub api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            recommendation_count: default_recommendation_count(),
            max_output_tokens: default_max_output_tokens(),
            base_url: None,
            export_dir: None,
            api_key: String::new(),
        }
    }
}

impl Settings {
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Default config root, `~/.cinemind`.
pub fn default_config_root() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".cinemind"),
        None => PathBuf::from(".cinemind"),
    }
}

/// Load settings from `<config_root>/config/config.yaml` when present,
/// falling back to defaults otherwise, then pick up the API key from the
/// environment.
pub fn load_settings(config_root: &Path) -> Result<Settings> {
    let path = config_root.join("config").join("config.yaml");
    let mut settings = if path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("parse config file {}", path.display()))?
    } else {
        Settings::default()
    };
    settings.api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
    Ok(settings)
}
