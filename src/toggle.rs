//! Touchscreen enablement: query, flip, notify.

use std::time::Duration;

use thiserror::Error;

use crate::command::{CommandError, CommandRunner, CommandSpec};
use crate::config::ToggleConfig;
use crate::device::{self, xinput};
use crate::notify;

/// What a successful toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Enabled,
    Disabled,
    Custom,
}

#[derive(Debug, Error)]
pub enum ToggleFailure {
    #[error("no touchscreen device found")]
    NoTouchscreen,

    #[error("cannot determine status of touchscreen '{device}'")]
    UnknownStatus { device: String },

    #[error("custom command failed: {0}")]
    CustomCommand(#[source] CommandError),

    #[error("failed to {action} touchscreen: {source}")]
    Command {
        action: &'static str,
        #[source]
        source: CommandError,
    },
}

/// Touchscreen toggling through `xinput`, or through a user command.
pub struct ToggleState<R: CommandRunner> {
    runner: R,
    touchscreen: Option<String>,
    custom_command: Option<String>,
    command_timeout: Option<Duration>,
    /// Last known state. Only used for display; toggles always re-query.
    enabled: bool,
}

impl<R: CommandRunner> ToggleState<R> {
    pub fn new(runner: R, config: &ToggleConfig) -> Self {
        Self {
            runner,
            touchscreen: config.touch_device.clone(),
            custom_command: config.command.clone(),
            command_timeout: config.command_timeout,
            enabled: true,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn touchscreen(&self) -> Option<&str> {
        self.touchscreen.as_deref()
    }

    pub fn uses_custom_command(&self) -> bool {
        self.custom_command.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Resolve the touchscreen name once, auto-detecting when unset.
    pub fn resolve_touchscreen(&mut self) -> Option<&str> {
        if self.touchscreen.is_none() {
            self.touchscreen =
                device::find_touchscreen_name(&self.runner, None, self.command_timeout);
        }
        self.touchscreen.as_deref()
    }

    /// Live "Device Enabled" state; `None` if unknown.
    pub fn query_enabled(&self) -> Option<bool> {
        let name = self.touchscreen.as_deref()?;
        xinput::query_enabled(&self.runner, name, self.command_timeout)
    }

    /// Query the live state and remember it. Unknown leaves the cache alone.
    pub fn refresh(&mut self) -> Option<bool> {
        let status = self.query_enabled();
        if let Some(enabled) = status {
            self.enabled = enabled;
        }
        status
    }

    pub fn toggle(&mut self) -> Result<Toggled, ToggleFailure> {
        if let Some(command) = &self.custom_command {
            return self.run_custom(command.clone());
        }

        let Some(name) = self.resolve_touchscreen().map(str::to_string) else {
            log::error!("No touchscreen device found");
            self.log_available_devices();
            return Err(ToggleFailure::NoTouchscreen);
        };

        let Some(current) = self.query_enabled() else {
            log::error!("Cannot find touchscreen device '{}'", name);
            self.log_available_devices();
            return Err(ToggleFailure::UnknownStatus { device: name });
        };

        let target = !current;
        let action = if target { "enable" } else { "disable" };
        let spec = xinput::set_enabled(&name, target).timeout(self.command_timeout);

        match self.runner.run(&spec) {
            Ok(_) => {
                self.enabled = target;
                notify::touchscreen_state(&self.runner, target);
                log::info!("Touchscreen {}d", action);
                Ok(if target {
                    Toggled::Enabled
                } else {
                    Toggled::Disabled
                })
            }
            Err(source) => {
                log::error!("Failed to {} touchscreen: {}", action, source);
                Err(ToggleFailure::Command { action, source })
            }
        }
    }

    fn run_custom(&self, command: String) -> Result<Toggled, ToggleFailure> {
        match self.runner.run(&CommandSpec::shell(command).check()) {
            Ok(_) => {
                notify::custom_command(&self.runner);
                log::info!("Custom command executed successfully");
                Ok(Toggled::Custom)
            }
            Err(e) => {
                log::error!("Custom command failed: {}", e);
                Err(ToggleFailure::CustomCommand(e))
            }
        }
    }

    fn log_available_devices(&self) {
        match xinput::list_devices(&self.runner, self.command_timeout) {
            Some(listing) => log::info!("Available input devices:\n{}", listing),
            None => log::error!("Could not list available input devices"),
        }
    }
}
