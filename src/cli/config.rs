use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::daemon::DetachStrategy;

/// Headless front-end settings
///
/// Loaded from an optional TOML file, then overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Program name used in the startup announcement and the log banner
    #[serde(default = "default_program")]
    pub program: String,
    /// How to detach from the terminal
    #[serde(default)]
    pub strategy: DetachStrategy,
    /// File that stdin/stdout/stderr are bound to on cleanup
    #[serde(default = "default_diagnostic_log")]
    pub diagnostic_log: PathBuf,
    /// Pid file written once detached
    #[serde(default)]
    pub pid_file: Option<PathBuf>,
    /// Run loop sleep between message flushes, in milliseconds
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// Maximum queued messages drained per iteration
    #[serde(default = "default_flush_batch")]
    pub flush_batch: usize,
    /// Skip detachment (for running under a supervisor)
    #[serde(default)]
    pub foreground: bool,
}

fn default_program() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_diagnostic_log() -> PathBuf {
    std::env::temp_dir().join("detachd_daemonized.log")
}

fn default_flush_interval_ms() -> u64 {
    1000
}

fn default_flush_batch() -> usize {
    10
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            strategy: DetachStrategy::default(),
            diagnostic_log: default_diagnostic_log(),
            pid_file: None,
            flush_interval_ms: default_flush_interval_ms(),
            flush_batch: default_flush_batch(),
            foreground: false,
        }
    }
}

impl DaemonConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse daemon configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid configuration file {}", path.display()))
    }

    /// Build the effective configuration from parsed arguments.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_matches(matches)?;
        config.validate()?;
        Ok(config)
    }

    /// Command-line flags take precedence over file values.
    pub fn apply_matches(&mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(strategy) = matches.get_one::<String>("strategy") {
            self.strategy = strategy
                .parse()
                .map_err(|_| anyhow!("Unknown detach strategy '{strategy}'"))?;
        }
        if let Some(path) = matches.get_one::<PathBuf>("log-file") {
            self.diagnostic_log = path.clone();
        }
        if let Some(path) = matches.get_one::<PathBuf>("pid-file") {
            self.pid_file = Some(path.clone());
        }
        if let Some(ms) = matches.get_one::<u64>("flush-interval-ms") {
            self.flush_interval_ms = *ms;
        }
        if let Some(batch) = matches.get_one::<usize>("flush-batch") {
            self.flush_batch = *batch;
        }
        if matches.get_flag("foreground") {
            self.foreground = true;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.flush_batch == 0 {
            return Err(anyhow!("flush_batch must be at least 1"));
        }
        if self.flush_interval_ms == 0 {
            return Err(anyhow!("flush_interval_ms must be at least 1"));
        }
        if self.program.trim().is_empty() {
            return Err(anyhow!("program name must not be empty"));
        }
        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}
