//! Locating the pen and touchscreen devices.
//!
//! Selection logic is kept free of I/O so it can be exercised against
//! canned device lists; [`evdev`] and [`xinput`] do the actual talking.

pub mod evdev;
pub mod xinput;

use std::io;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::time::Duration;

use evdevil::event::InputEvent;

use crate::command::CommandRunner;
use crate::error::{Error, Result};

/// Name fragments that identify a stylus when no pen name is configured.
pub const PEN_KEYWORDS: [&str; 4] = ["surface", "pen", "stylus", "wacom"];

/// Name fragments of Surface digitizer drivers, preferred for touchscreens.
pub const SURFACE_KEYWORDS: [&str; 3] = ["ipts", "iptsd", "surface"];

/// One enumerated `/dev/input/event*` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeviceInfo {
    pub path: PathBuf,
    pub name: String,
    pub has_key_events: bool,
}

impl InputDeviceInfo {
    pub fn describe(&self) -> String {
        format!("{}: {}", self.path.display(), self.name)
    }

    /// Whether the auto-detect heuristic would pick this device as a pen.
    pub fn looks_like_pen(&self) -> bool {
        let name = self.name.to_lowercase();
        self.has_key_events && PEN_KEYWORDS.iter().any(|k| name.contains(k))
    }
}

pub fn describe_all(devices: &[InputDeviceInfo]) -> Vec<String> {
    devices.iter().map(InputDeviceInfo::describe).collect()
}

/// Pick the pen device.
///
/// With a `hint`, the first device whose name contains it (ignoring case)
/// wins and a miss is an error. Without one, the first key-capable device
/// matching [`PEN_KEYWORDS`] is returned, or `None`.
pub fn find_pen_device<'a>(
    devices: &'a [InputDeviceInfo],
    hint: Option<&str>,
) -> Result<Option<&'a InputDeviceInfo>> {
    match hint.filter(|h| !h.is_empty()) {
        Some(hint) => {
            let needle = hint.to_lowercase();
            match devices
                .iter()
                .find(|d| d.name.to_lowercase().contains(&needle))
            {
                Some(device) => {
                    log::info!("Found specified pen device: {}", device.name);
                    Ok(Some(device))
                }
                None => Err(Error::DeviceNotFound {
                    what: format!("Pen device '{}'", hint),
                    available: describe_all(devices),
                }),
            }
        }
        None => {
            let found = devices.iter().find(|d| d.looks_like_pen());
            if let Some(device) = found {
                log::info!("Auto-detected pen device: {}", device.name);
            }
            Ok(found)
        }
    }
}

/// Pick the best touchscreen among xinput pointer names.
///
/// Surface digitizer drivers expose several "touch" devices, so the order is:
/// a Surface/IPTS touchscreen, then any touchscreen, then anything "touch".
pub fn select_touchscreen(names: &[String]) -> Option<&str> {
    let candidates: Vec<(&str, String)> = names
        .iter()
        .map(|n| (n.as_str(), n.to_lowercase()))
        .filter(|(_, lower)| lower.contains("touch"))
        .collect();

    if let Some((name, _)) = candidates.iter().find(|(_, lower)| {
        lower.contains("touchscreen") && SURFACE_KEYWORDS.iter().any(|k| lower.contains(k))
    }) {
        log::info!("Auto-detected Surface touchscreen: {}", name);
        return Some(*name);
    }

    if let Some((name, _)) = candidates.iter().find(|(_, l)| l.contains("touchscreen")) {
        log::info!("Auto-detected touchscreen: {}", name);
        return Some(*name);
    }

    let (name, _) = candidates.first()?;
    log::info!("Auto-detected touch device: {}", name);
    Some(*name)
}

/// Resolve the touchscreen name: `hint` verbatim, otherwise auto-detect
/// from `xinput list`. Listing failures degrade to `None`.
pub fn find_touchscreen_name<R: CommandRunner + ?Sized>(
    runner: &R,
    hint: Option<&str>,
    timeout: Option<Duration>,
) -> Option<String> {
    if let Some(hint) = hint.filter(|h| !h.is_empty()) {
        return Some(hint.to_string());
    }

    let listing = xinput::list_devices(runner, timeout)?;
    let names = xinput::parse_pointer_devices(&listing);
    select_touchscreen(&names).map(str::to_string)
}

/// An input device the controller can grab and read key events from.
pub trait PenInput {
    fn name(&self) -> &str;
    fn grab(&mut self) -> io::Result<()>;
    fn ungrab(&mut self) -> io::Result<()>;

    /// Wait up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived (or the wait was interrupted by a signal).
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;
}

/// Exclusive access to a [`PenInput`], released when dropped.
pub struct Grabbed<D: PenInput> {
    device: D,
}

impl<D: PenInput> Grabbed<D> {
    pub fn acquire(mut device: D) -> Result<Self> {
        device
            .grab()
            .map_err(|e| Error::from_device_io(&format!("cannot grab {}", device.name()), e))?;
        log::debug!("Grabbed {}", device.name());
        Ok(Self { device })
    }
}

impl<D: PenInput> Deref for Grabbed<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.device
    }
}

impl<D: PenInput> DerefMut for Grabbed<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: PenInput> Drop for Grabbed<D> {
    fn drop(&mut self) {
        match self.device.ungrab() {
            Ok(()) => log::debug!("Released {}", self.device.name()),
            Err(e) => log::debug!("Error releasing device: {}", e),
        }
    }
}
