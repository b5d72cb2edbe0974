//! Local evdev access: enumeration, grabbing and reading key events.
//!
//! Requires read access to `/dev/input/event*`, i.e. membership in the
//! `input` group:
//! ```bash
//! sudo usermod -aG input $USER
//! # Then log out and back in
//! ```

use std::fs;
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use evdevil::event::{EventType, InputEvent};
use evdevil::Evdev;

use super::{InputDeviceInfo, PenInput};
use crate::error::{Error, Result};

const INPUT_DIR: &str = "/dev/input";

/// List every `/dev/input/event*` node we can open, sorted by path.
pub fn enumerate_devices() -> Result<Vec<InputDeviceInfo>> {
    let dir = fs::read_dir(INPUT_DIR).map_err(|e| {
        Error::PermissionDenied(format!(
            "Cannot access {}: {}. Make sure you're in the 'input' group.",
            INPUT_DIR, e
        ))
    })?;

    let mut paths: Vec<PathBuf> = dir
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().starts_with("event"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort_by_key(|p| event_number(p));

    let mut devices = Vec::new();
    let mut denied = 0usize;

    for path in paths {
        match describe(&path) {
            Ok(info) => devices.push(info),
            Err(e) => {
                if e.kind() == io::ErrorKind::PermissionDenied {
                    denied += 1;
                }
                log::debug!("Failed to open {}: {}", path.display(), e);
            }
        }
    }

    if devices.is_empty() && denied > 0 {
        return Err(Error::PermissionDenied(format!(
            "No input devices accessible ({} refused). Make sure you're in the 'input' group: \
             sudo usermod -aG input $USER",
            denied
        )));
    }

    Ok(devices)
}

/// Numeric suffix of `eventN`, so event10 sorts after event9.
fn event_number(path: &Path) -> (u32, PathBuf) {
    let n = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix("event"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX);
    (n, path.to_path_buf())
}

fn describe(path: &Path) -> io::Result<InputDeviceInfo> {
    let evdev = Evdev::open(path)?;
    Ok(InputDeviceInfo {
        path: path.to_path_buf(),
        name: evdev.name()?,
        has_key_events: evdev.supported_events()?.contains(EventType::KEY),
    })
}

/// An opened evdev node.
pub struct PenDevice {
    evdev: Evdev,
    path: PathBuf,
    name: String,
}

impl PenDevice {
    pub fn open(info: &InputDeviceInfo) -> Result<Self> {
        let evdev = Evdev::open(&info.path).map_err(|e| {
            Error::from_device_io(&format!("cannot open {}", info.path.display()), e)
        })?;
        Ok(Self {
            evdev,
            path: info.path.clone(),
            name: info.name.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PenInput for PenDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn grab(&mut self) -> io::Result<()> {
        self.evdev.grab()
    }

    fn ungrab(&mut self) -> io::Result<()> {
        self.evdev.ungrab()
    }

    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        let fd = self.evdev.as_raw_fd();
        let mut pfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        let ret = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if is_spurious_wakeup(&err) {
                return Ok(None);
            }
            return Err(err);
        }
        if ret == 0 {
            return Ok(None);
        }
        if pfd.revents & libc::POLLIN == 0 {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("{} is no longer readable", self.path.display()),
            ));
        }

        match self.evdev.raw_events().next().transpose() {
            Ok(ev) => Ok(ev),
            Err(e) if is_spurious_wakeup(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Signals and racing readers wake us without an event to hand out.
fn is_spurious_wakeup(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}
