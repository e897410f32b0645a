use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles loading, validating and saving the client configuration.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Script service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Navigation target the intake form hands results off to
    #[serde(default = "default_results_path")]
    pub results_path: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Remote script service configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Service base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Path of the script generation endpoint
    #[serde(default = "default_generate_path")]
    pub generate_path: String,

    /// Path of the single-line refinement endpoint
    #[serde(default = "default_refine_path")]
    pub refine_path: String,

    /// Path of the health check endpoint
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            generate_path: default_generate_path(),
            refine_path: default_refine_path(),
            health_path: default_health_path(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    // Generation runs several model calls server side
    120
}

fn default_generate_path() -> String {
    "/generate-script".to_string()
}

fn default_refine_path() -> String {
    "/refine-script".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_results_path() -> String {
    "/results".to_string()
}

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("adscribe")
        .join("conf.json")
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            results_path: default_results_path(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.service.endpoint)
            .with_context(|| format!("Invalid service endpoint: {}", self.service.endpoint))?;

        if self.service.timeout_secs == 0 {
            return Err(anyhow!("Service timeout must be at least one second"));
        }

        let paths = [
            ("generate_path", &self.service.generate_path),
            ("refine_path", &self.service.refine_path),
            ("health_path", &self.service.health_path),
            ("results_path", &self.results_path),
        ];
        for (name, path) in paths {
            if !path.starts_with('/') {
                return Err(anyhow!("{} must start with '/': {}", name, path));
            }
        }

        Ok(())
    }

    /// Load the configuration file, writing a default one if it does not exist yet
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }
}
