mod cli;
mod file;

pub use cli::{Cli, Command};

use std::time::Duration;

use file::FileConfig;

use crate::error::{Error, Result};
use crate::input::ButtonFilter;

pub const DEFAULT_INTERVAL_SECS: f64 = 0.5;
pub const DEFAULT_COMMAND_TIMEOUT_SECS: f64 = 10.0;

/// Intervals above this still work but make accidental toggles likely.
const LONG_INTERVAL_SECS: f64 = 5.0;

/// Settings for one run, merged from CLI args and the TOML file.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleConfig {
    pub pen_device: Option<String>,
    pub touch_device: Option<String>,
    pub interval: Duration,
    /// Replaces the xinput toggle entirely when set.
    pub command: Option<String>,
    pub button: ButtonFilter,
    /// Bound on xinput calls; `None` waits forever.
    pub command_timeout: Option<Duration>,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            pen_device: None,
            touch_device: None,
            interval: Duration::from_millis(500),
            command: None,
            button: ButtonFilter::Any,
            command_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl ToggleConfig {
    /// Load configuration by merging the TOML file with CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = cli
            .config
            .as_ref()
            .and_then(|p| file::load_from_path(p))
            .or_else(file::load_from_default_paths)
            .unwrap_or_default();

        Self::merge(cli, file_config)
    }

    fn merge(cli: &Cli, file_config: FileConfig) -> Result<Self> {
        Ok(Self {
            pen_device: non_empty(cli.pen_device.clone().or(file_config.pen_device)),
            touch_device: non_empty(cli.touch_device.clone().or(file_config.touch_device)),
            interval: parse_interval(
                cli.interval
                    .or(file_config.interval)
                    .unwrap_or(DEFAULT_INTERVAL_SECS),
            )?,
            command: non_empty(cli.command.clone().or(file_config.command)),
            button: cli.button.or(file_config.button).unwrap_or_default(),
            command_timeout: parse_command_timeout(
                cli.command_timeout
                    .or(file_config.command_timeout)
                    .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS),
            )?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate a double-press window given in seconds.
pub fn parse_interval(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(Error::Configuration(format!(
            "Interval must be a positive number of seconds, got: {}",
            secs
        )));
    }
    if secs > LONG_INTERVAL_SECS {
        log::warn!("Large interval ({}s) may cause usability issues", secs);
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| Error::Configuration(format!("Invalid interval {}: {}", secs, e)))
}

fn parse_command_timeout(secs: f64) -> Result<Option<Duration>> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::Configuration(format!(
            "Command timeout must be zero or a positive number of seconds, got: {}",
            secs
        )));
    }
    if secs == 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|e| Error::Configuration(format!("Invalid command timeout {}: {}", secs, e)))
}
