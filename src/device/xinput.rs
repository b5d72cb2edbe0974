//! `xinput` invocations and the parts of its text output we rely on.

use std::time::Duration;

use crate::command::{CommandRunner, CommandSpec};

pub const XINPUT: &str = "xinput";

/// Marker `xinput list` prints on secondary pointer rows.
const SLAVE_POINTER: &str = "slave  pointer";
const BRANCH: &str = "↳ ";
const ID_TOKEN: &str = "id=";
const DEVICE_ENABLED: &str = "Device Enabled";

pub fn list() -> CommandSpec {
    CommandSpec::new([XINPUT, "list"])
}

pub fn list_props(device: &str) -> CommandSpec {
    CommandSpec::new([XINPUT, "list-props", device])
}

/// `xinput enable|disable <device>`, failing on a non-zero exit.
pub fn set_enabled(device: &str, enabled: bool) -> CommandSpec {
    let action = if enabled { "enable" } else { "disable" };
    CommandSpec::new([XINPUT, action, device]).check()
}

/// Names of all secondary pointer devices in `xinput list` output.
pub fn parse_pointer_devices(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains(SLAVE_POINTER))
        .filter_map(|line| {
            let start = line.find(BRANCH)? + BRANCH.len();
            let end = line.find(ID_TOKEN)?;
            if end <= start {
                return None;
            }
            let name = line[start..end].trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Value of the "Device Enabled" property in `xinput list-props` output.
pub fn parse_device_enabled(output: &str) -> Option<bool> {
    output
        .lines()
        .find(|line| line.contains(DEVICE_ENABLED) && line.contains(':'))
        .and_then(|line| line.rsplit(':').next())
        .map(|value| value.contains('1'))
}

/// Run `xinput list`; `None` if the tool is missing or fails.
pub fn list_devices<R: CommandRunner + ?Sized>(
    runner: &R,
    timeout: Option<Duration>,
) -> Option<String> {
    match runner.run(&list().timeout(timeout)) {
        Ok(out) if out.success() => Some(out.stdout),
        Ok(out) => {
            log::debug!("xinput list exited with {:?}", out.code);
            None
        }
        Err(e) => {
            log::debug!("Could not get xinput device list: {}", e);
            None
        }
    }
}

/// Current enablement of `device`; `None` when it cannot be determined.
pub fn query_enabled<R: CommandRunner + ?Sized>(
    runner: &R,
    device: &str,
    timeout: Option<Duration>,
) -> Option<bool> {
    let out = match runner.run(&list_props(device).timeout(timeout)) {
        Ok(out) => out,
        Err(e) => {
            log::debug!("Could not get status for device {}: {}", device, e);
            return None;
        }
    };

    // xinput may exit non-zero and still print the property list.
    let status = parse_device_enabled(&out.stdout);
    if status.is_none() {
        log::debug!(
            "Could not get status for device {} (exit {:?}): {}",
            device,
            out.code,
            out.stderr.trim()
        );
    }
    status
}

#[cfg(test)]
pub(crate) const SAMPLE_LIST: &str = "\
⎡ Virtual core pointer                    \tid=2\t[master pointer  (3)]
⎜   ↳ Virtual core XTEST pointer              \tid=4\t[slave  pointer  (2)]
⎜   ↳ Microsoft Surface Type Cover Touchpad   \tid=11\t[slave  pointer  (2)]
⎜   ↳ IPTS Touch                              \tid=14\t[slave  pointer  (2)]
⎜   ↳ IPTS Touchscreen                        \tid=15\t[slave  pointer  (2)]
⎜   ↳ IPTS Stylus Pen (0)                     \tid=16\t[slave  pointer  (2)]
⎣ Virtual core keyboard                   \tid=3\t[master keyboard (2)]
    ↳ Virtual core XTEST keyboard             \tid=5\t[slave  keyboard (3)]
    ↳ IPTS Touch Keys                         \tid=17\t[slave  keyboard (3)]
";
