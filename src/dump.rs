//! Diagnostics: list candidate devices, or dump raw pen key events.
//! Run: `pijast devices`, or `pijast dump` to see which codes your pen's
//! buttons send (useful for `--button`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::command::SystemRunner;
use crate::config::ToggleConfig;
use crate::device::evdev::{self, PenDevice};
use crate::device::{self, xinput, PenInput};
use crate::error::{Error, Result};
use crate::input::{key_name, EV_KEY, KEY_PRESSED, KEY_RELEASED, KEY_REPEATED};

pub fn run_devices(config: &ToggleConfig) -> Result<()> {
    let devices = evdev::enumerate_devices()?;
    let pen = device::find_pen_device(&devices, config.pen_device.as_deref())
        .ok()
        .flatten()
        .map(|d| d.path.clone());

    println!("Input devices (* = selected pen, + = looks like a pen):");
    for d in &devices {
        let mark = if pen.as_ref() == Some(&d.path) {
            '*'
        } else if d.looks_like_pen() {
            '+'
        } else {
            ' '
        };
        let keys = if d.has_key_events { "keys" } else { "    " };
        println!("  {} {}  {}  {}", mark, d.path.display(), keys, d.name);
    }

    println!();
    match xinput::list_devices(&SystemRunner, config.command_timeout) {
        Some(listing) => {
            let names = xinput::parse_pointer_devices(&listing);
            let chosen = match config.touch_device.as_deref() {
                Some(name) => Some(name),
                None => device::select_touchscreen(&names),
            };
            println!("xinput pointer devices (* = selected touchscreen):");
            for name in &names {
                let mark = if Some(name.as_str()) == chosen { '*' } else { ' ' };
                println!("  {} {}", mark, name);
            }
            if let Some(name) = chosen.filter(|c| !names.iter().any(|n| n == c)) {
                println!("  * {} (configured, not listed)", name);
            }
        }
        None => println!("xinput is not available; cannot list touchscreens."),
    }

    Ok(())
}

pub fn run_dump(config: &ToggleConfig, shutdown: &AtomicBool) -> Result<()> {
    let devices = evdev::enumerate_devices()?;
    let info = device::find_pen_device(&devices, config.pen_device.as_deref())?.ok_or_else(
        || Error::DeviceNotFound {
            what: "Pen device".into(),
            available: device::describe_all(&devices),
        },
    )?;
    let mut pen = PenDevice::open(info)?;

    eprintln!(
        "Dumping key events from {} ({}), Ctrl+C to stop:\n",
        pen.name(),
        pen.path().display()
    );

    let mut n = 0u64;
    while !shutdown.load(Ordering::SeqCst) {
        let ev = match pen.next_event(Duration::from_millis(200)) {
            Ok(Some(ev)) => ev,
            Ok(None) => continue,
            Err(e) => return Err(Error::from_device_io("error reading pen device", e)),
        };
        if ev.event_type().raw() != EV_KEY {
            continue;
        }
        n += 1;
        let state = match ev.raw_value() {
            KEY_RELEASED => "released",
            KEY_PRESSED => "pressed",
            KEY_REPEATED => "repeat",
            _ => "?",
        };
        println!("{:6}  {}  {}", n, key_name(ev.raw_code()), state);
    }

    Ok(())
}
