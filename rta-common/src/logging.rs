//! Logging initialization shared by the agent binary and tests.

use tracing_subscriber::EnvFilter;

/// How logging should be initialized.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive when `RTA_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
    /// Write to stderr instead of stdout. The standalone summary goes to
    /// stdout, so the binary always logs to stderr.
    pub stderr: bool,
}

impl LogConfig {
    /// Build a config from the environment, falling back to `default_level`.
    ///
    /// `RTA_LOG` carries filter directives (same syntax as `RUST_LOG`);
    /// `RTA_LOG_FORMAT=json` switches to JSON output.
    pub fn from_env(default_level: &str) -> Self {
        let level = std::env::var("RTA_LOG").unwrap_or_else(|_| default_level.to_string());
        let json = std::env::var("RTA_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
        Self {
            level,
            json,
            stderr: false,
        }
    }

    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    pub fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|err| anyhow::anyhow!("invalid log filter {:?}: {err}", config.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match (config.json, config.stderr) {
        (true, true) => builder.json().with_writer(std::io::stderr).try_init(),
        (true, false) => builder.json().try_init(),
        (false, true) => builder.with_writer(std::io::stderr).try_init(),
        (false, false) => builder.try_init(),
    };
    result.map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))
}
