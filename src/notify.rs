//! Desktop notifications through `notify-send`.

use std::time::Duration;

use crate::command::{CommandRunner, CommandSpec};

const NOTIFY_SEND: &str = "notify-send";
const TITLE: &str = "PIJAST";
const TIMEOUT: Duration = Duration::from_secs(5);

pub const ICON_ENABLED: &str = "input-touchpad";
pub const ICON_DISABLED: &str = "input-touchpad-off";
pub const ICON_CUSTOM: &str = "system-run";

/// Fire-and-forget notification; failures are only logged.
pub fn send<R: CommandRunner + ?Sized>(runner: &R, icon: &str, message: &str) {
    let spec = CommandSpec::new([NOTIFY_SEND, "-i", icon, TITLE, message])
        .no_capture()
        .timeout(Some(TIMEOUT));

    if let Err(e) = runner.run(&spec) {
        log::debug!("Could not send desktop notification: {}", e);
    }
}

pub fn touchscreen_state(runner: &(impl CommandRunner + ?Sized), enabled: bool) {
    let (icon, message) = if enabled {
        (ICON_ENABLED, "Touchscreen enabled")
    } else {
        (ICON_DISABLED, "Touchscreen disabled")
    };
    send(runner, icon, message);
}

pub fn custom_command(runner: &(impl CommandRunner + ?Sized)) {
    send(runner, ICON_CUSTOM, "Custom command executed");
}
