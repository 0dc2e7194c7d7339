//! Configuration for the testing agent.
//!
//! The agent is configured explicitly at construction time: a TOML file (the
//! default path or one supplied on the command line) layered with environment
//! overrides. There is no module-level state and nothing is created on disk
//! at load time.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration consumed by the testing workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base directory under which per-invocation working copies are created.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Sandbox image used for test runs.
    #[serde(default = "default_image")]
    pub image: String,
    /// Wall-clock timeout for one sandboxed run, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Dependency manifest file that toggles the install step.
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Access token injected into https clone URLs for private repositories.
    /// Masked in all log output.
    #[serde(default)]
    pub github_token: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            image: default_image(),
            timeout_secs: default_timeout_secs(),
            manifest: default_manifest(),
            github_token: None,
        }
    }
}

fn default_base_dir() -> PathBuf {
    std::env::temp_dir().join("rta-workdirs")
}

fn default_image() -> String {
    "python:3.10-slim".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_manifest() -> String {
    "requirements.txt".to_string()
}

impl AgentConfig {
    /// Default config file location (`<config dir>/rta/config.toml`).
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rta").join("config.toml"))
    }

    /// Load configuration from `path` (or the default location), then apply
    /// environment overrides. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path);
        let mut config = match file {
            Some(file) if file.exists() => {
                let raw = std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read config file {}", file.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("invalid config file {}", file.display()))?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `RTA_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from a key/value lookup. Split out from
    /// [`AgentConfig::apply_env_overrides`] so tests do not mutate the
    /// process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_dir) = lookup("RTA_BASE_DIR") {
            self.base_dir = PathBuf::from(base_dir);
        }
        if let Some(image) = lookup("RTA_IMAGE") {
            self.image = image;
        }
        if let Some(timeout) = lookup("RTA_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "ignoring invalid RTA_TIMEOUT_SECS"),
            }
        }
        if let Some(token) = lookup("RTA_GITHUB_TOKEN") {
            self.github_token = Some(token);
        }
    }

    /// Validate the configuration, returning human-readable warnings.
    /// Nothing here is fatal; the agent runs with whatever it is given.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.timeout_secs == 0 {
            warnings.push("timeout_secs is 0; every sandbox run will be aborted immediately".to_string());
        }
        if self.image.is_empty() {
            warnings.push("image is empty; sandbox runs cannot start".to_string());
        }
        if self.manifest.is_empty() {
            warnings.push("manifest is empty; the dependency install step will never run".to_string());
        }
        warnings
    }
}
