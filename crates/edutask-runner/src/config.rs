/*
[INPUT]:  YAML configuration file (optional)
[OUTPUT]: Parsed runner configuration, client config and poll policy
[POS]:    Configuration layer - service endpoint and polling setup
[UPDATE]: When adding new configuration options
*/

use anyhow::{Context, Result, anyhow};
use edutask_adapter::{Backoff, ClientConfig, PollPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for the edutask runner
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Compute service connection
    #[serde(default)]
    pub service: ServiceConfig,
    /// Poll loop timing and bounds
    #[serde(default)]
    pub polling: PollingConfig,
    /// Student the CLI acts on behalf of
    #[serde(default = "default_student_id")]
    pub student_id: String,
    /// Location of the JSON store; defaults to the user data directory
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            polling: PollingConfig::default(),
            student_id: default_student_id(),
            store_path: None,
        }
    }
}

/// Compute service connection configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

/// Poll loop configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_backoff")]
    pub backoff: BackoffKind,
    /// Growth factor for exponential backoff
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Cap for exponential backoff
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default)]
    pub jitter: bool,
    /// Unset polls until the service answers
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Unset polls until the service answers
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            backoff: default_backoff(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            jitter: false,
            max_attempts: None,
            deadline_secs: None,
        }
    }
}

fn default_student_id() -> String {
    "local-student".to_string()
}

fn default_base_url() -> String {
    edutask_adapter::http::client::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_interval_ms() -> u64 {
    2_000
}

fn default_backoff() -> BackoffKind {
    BackoffKind::Fixed
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl RunnerConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given file, else the default location if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.service.base_url.trim().is_empty() {
            return Err(anyhow!("service.base_url cannot be empty"));
        }
        if self.polling.interval_ms == 0 {
            return Err(anyhow!("polling.interval_ms must be positive"));
        }
        if self.polling.backoff == BackoffKind::Exponential && self.polling.multiplier < 1.0 {
            return Err(anyhow!("polling.multiplier must be at least 1.0"));
        }
        if self.polling.max_attempts == Some(0) {
            return Err(anyhow!("polling.max_attempts must be positive when set"));
        }
        if self.student_id.trim().is_empty() {
            return Err(anyhow!("student_id cannot be empty"));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.service.base_url.clone(),
            timeout: Duration::from_secs(self.service.timeout_secs),
            connect_timeout: Duration::from_secs(self.service.connect_timeout_secs),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        let polling = &self.polling;
        let backoff = match polling.backoff {
            BackoffKind::Fixed => Backoff::Fixed,
            BackoffKind::Exponential => Backoff::Exponential {
                multiplier: polling.multiplier,
                max_delay: Duration::from_millis(polling.max_delay_ms),
                jitter: polling.jitter,
            },
        };

        PollPolicy {
            interval: Duration::from_millis(polling.interval_ms),
            backoff,
            max_attempts: polling.max_attempts,
            deadline: polling.deadline_secs.map(Duration::from_secs),
        }
    }
}

/// `<config dir>/edutask/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("edutask").join("config.yaml"))
}
