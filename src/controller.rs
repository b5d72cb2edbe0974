//! Pen presses in, touchscreen toggles out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use evdevil::event::InputEvent;

use crate::command::{CommandRunner, SystemRunner};
use crate::config::ToggleConfig;
use crate::detector::DoublePressDetector;
use crate::device::evdev::{self, PenDevice};
use crate::device::{self, xinput, Grabbed, InputDeviceInfo, PenInput};
use crate::error::{Error, Result};
use crate::input::{key_name, pressed_key, ButtonFilter};
use crate::toggle::{ToggleFailure, ToggleState, Toggled};

/// How long a single wait for pen input may block before the shutdown flag
/// is checked again.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct Controller<R: CommandRunner> {
    detector: DoublePressDetector,
    button: ButtonFilter,
    toggle: ToggleState<R>,
}

impl<R: CommandRunner> Controller<R> {
    pub fn new(config: &ToggleConfig, toggle: ToggleState<R>) -> Self {
        Self {
            detector: DoublePressDetector::new(config.interval),
            button: config.button,
            toggle,
        }
    }

    /// Process one pen event observed at `now`.
    ///
    /// Returns the toggle outcome when the event completed a double-press.
    /// The toggle runs to completion before this returns.
    pub fn handle_event(
        &mut self,
        ev: &InputEvent,
        now: Instant,
    ) -> Option<std::result::Result<Toggled, ToggleFailure>> {
        let code = pressed_key(ev)?;
        if !self.button.accepts(code) {
            log::trace!("Ignoring {} (filter: {})", key_name(code), self.button);
            return None;
        }
        log::debug!("Pen button pressed: {}", key_name(code));

        if !self.detector.on_press(now) {
            return None;
        }

        log::info!("Double-press detected! Toggling touchscreen...");
        let result = self.toggle.toggle();
        match &result {
            Ok(Toggled::Custom) => {}
            Ok(_) => log::debug!(
                "Touchscreen now believed {}",
                if self.toggle.is_enabled() { "enabled" } else { "disabled" }
            ),
            Err(e) => log::warn!("Toggle failed: {}", e),
        }
        Some(result)
    }

    /// Grab `pen` and handle its events until `shutdown` is set.
    ///
    /// The grab is released on every return path, including read errors.
    pub fn run<D: PenInput>(&mut self, pen: D, shutdown: &AtomicBool) -> Result<()> {
        let mut pen = Grabbed::acquire(pen)?;

        while !shutdown.load(Ordering::SeqCst) {
            match pen.next_event(POLL_INTERVAL) {
                Ok(Some(ev)) => {
                    self.handle_event(&ev, Instant::now());
                }
                Ok(None) => {}
                Err(e) => {
                    return Err(Error::from_device_io(
                        &format!("error reading {}", pen.name()),
                        e,
                    ));
                }
            }
        }

        log::info!("Exiting...");
        Ok(())
    }
}

/// Resolve devices from `config`, then listen until `shutdown` is set.
pub fn run(config: &ToggleConfig, shutdown: &AtomicBool) -> Result<()> {
    let devices = evdev::enumerate_devices()?;
    let (info, toggle) = prepare(config, &devices, SystemRunner)?;
    let pen = PenDevice::open(info)?;
    Controller::new(config, toggle).run(pen, shutdown)
}

/// Startup checks: pick the pen from `devices`, resolve the touchscreen and
/// read its initial state.
///
/// A missing pen or touchscreen is fatal. An unknown initial state is not.
/// With a custom command, xinput is never consulted.
pub fn prepare<'a, R: CommandRunner>(
    config: &ToggleConfig,
    devices: &'a [InputDeviceInfo],
    runner: R,
) -> Result<(&'a InputDeviceInfo, ToggleState<R>)> {
    let info = device::find_pen_device(devices, config.pen_device.as_deref())?.ok_or_else(
        || Error::DeviceNotFound {
            what: "Pen device".into(),
            available: device::describe_all(devices),
        },
    )?;

    let mut toggle = ToggleState::new(runner, config);
    if !toggle.uses_custom_command() && toggle.resolve_touchscreen().is_none() {
        let available = xinput::list_devices(toggle.runner(), config.command_timeout)
            .map(|listing| xinput::parse_pointer_devices(&listing))
            .unwrap_or_default();
        return Err(Error::DeviceNotFound {
            what: "Touchscreen device (auto-detection)".into(),
            available,
        });
    }

    log::info!(
        "Listening for double-press on: {} ({})",
        info.name,
        info.path.display()
    );
    match (toggle.touchscreen(), &config.command) {
        (_, Some(command)) => log::info!("Custom command: {}", command),
        (Some(name), None) => log::info!("Target touchscreen: {}", name),
        (None, None) => {}
    }
    log::info!("Double-press interval: {}s", config.interval.as_secs_f64());
    if config.button != ButtonFilter::Any {
        log::info!("Only counting button {}", key_name_for(config.button));
    }
    log::info!("Press Ctrl+C to exit");

    if !toggle.uses_custom_command() {
        match toggle.refresh() {
            Some(enabled) => log::info!(
                "Touchscreen currently: {}",
                if enabled { "enabled" } else { "disabled" }
            ),
            None => log::warn!("Could not determine initial touchscreen status"),
        }
    }

    Ok((info, toggle))
}

fn key_name_for(button: ButtonFilter) -> String {
    match button {
        ButtonFilter::Any => "any".into(),
        ButtonFilter::Code(code) => key_name(code),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::*;
    use crate::command::testing::{exit, ok, FakeRunner};
    use crate::device::testing::FakePen;
    use crate::device::xinput::SAMPLE_LIST;
    use crate::input::{key_event, BTN_STYLUS2, BTN_TOUCH, KEY_PRESSED, KEY_RELEASED};

    const ENABLED_PROPS: &str = "Device 'ELAN Touchscreen':\n\tDevice Enabled (152):\t1\n";

    fn surface_config() -> ToggleConfig {
        ToggleConfig {
            pen_device: Some("Surface Pen".into()),
            touch_device: Some("ELAN Touchscreen".into()),
            interval: Duration::from_millis(500),
            ..ToggleConfig::default()
        }
    }

    fn controller(config: &ToggleConfig) -> Controller<FakeRunner> {
        let runner = FakeRunner::new(|argv| match argv {
            ["xinput", "list-props", _] => ok(ENABLED_PROPS),
            _ => ok(""),
        });
        Controller::new(config, ToggleState::new(runner, config))
    }

    fn press(code: u16) -> InputEvent {
        key_event(code, KEY_PRESSED)
    }

    fn release(code: u16) -> InputEvent {
        key_event(code, KEY_RELEASED)
    }

    #[test]
    fn test_double_press_disables_touchscreen() {
        let config = surface_config();
        let mut controller = controller(&config);
        controller.toggle.refresh();
        assert!(controller.toggle.is_enabled());

        let t0 = Instant::now();
        assert!(controller.handle_event(&press(BTN_STYLUS2), t0).is_none());
        assert!(controller
            .handle_event(&release(BTN_STYLUS2), t0 + Duration::from_millis(80))
            .is_none());
        let result = controller
            .handle_event(&press(BTN_STYLUS2), t0 + Duration::from_millis(300))
            .unwrap();

        assert_eq!(result.unwrap(), Toggled::Disabled);
        assert!(!controller.toggle.is_enabled());
        let runner = controller.toggle.runner();
        assert!(runner.called(&["xinput", "disable", "ELAN Touchscreen"]));
        assert!(runner.called(&[
            "notify-send",
            "-i",
            "input-touchpad-off",
            "PIJAST",
            "Touchscreen disabled"
        ]));
    }

    #[test]
    fn test_slow_presses_do_not_toggle() {
        let config = surface_config();
        let mut controller = controller(&config);

        let t0 = Instant::now();
        assert!(controller.handle_event(&press(BTN_STYLUS2), t0).is_none());
        assert!(controller
            .handle_event(&press(BTN_STYLUS2), t0 + Duration::from_millis(700))
            .is_none());
        assert!(controller.toggle.runner().calls().is_empty());
    }

    #[test]
    fn test_button_filter() {
        let config = ToggleConfig {
            button: ButtonFilter::Code(BTN_STYLUS2),
            ..surface_config()
        };
        let mut controller = controller(&config);

        let t0 = Instant::now();
        assert!(controller.handle_event(&press(BTN_TOUCH), t0).is_none());
        assert!(controller
            .handle_event(&press(BTN_TOUCH), t0 + Duration::from_millis(100))
            .is_none());
        assert!(controller
            .handle_event(&press(BTN_STYLUS2), t0 + Duration::from_millis(200))
            .is_none());
        assert!(controller
            .handle_event(&press(BTN_STYLUS2), t0 + Duration::from_millis(300))
            .is_some());
    }

    #[test]
    fn test_run_toggles_and_releases_on_read_error() {
        let config = surface_config();
        let mut controller = controller(&config);
        let pen = FakePen::with_events([
            Ok(Some(press(BTN_STYLUS2))),
            Ok(None),
            Ok(Some(release(BTN_STYLUS2))),
            Ok(Some(press(BTN_STYLUS2))),
        ]);
        let grabbed = pen.grabbed.clone();

        let result = controller.run(pen, &AtomicBool::new(false));

        assert!(matches!(result, Err(Error::Unexpected(_))));
        assert!(!grabbed.get());
        assert!(controller
            .toggle
            .runner()
            .called(&["xinput", "disable", "ELAN Touchscreen"]));
    }

    #[test]
    fn test_permission_error_while_reading() {
        let config = surface_config();
        let mut controller = controller(&config);
        let pen = FakePen::with_events([Err(io::Error::from(io::ErrorKind::PermissionDenied))]);
        let grabbed = pen.grabbed.clone();

        let result = controller.run(pen, &AtomicBool::new(false));

        assert!(matches!(result, Err(Error::PermissionDenied(_))));
        assert!(!grabbed.get());
    }

    #[test]
    fn test_shutdown_is_clean_even_if_release_fails() {
        let config = surface_config();
        let mut controller = controller(&config);
        let pen = FakePen {
            ungrab_error: true,
            ..FakePen::default()
        };
        let grabbed = pen.grabbed.clone();

        assert!(controller.run(pen, &AtomicBool::new(true)).is_ok());
        assert!(!grabbed.get());
    }

    #[test]
    fn test_grab_failure_is_fatal() {
        let config = surface_config();
        let mut controller = controller(&config);
        let pen = FakePen {
            grab_error: Some(io::ErrorKind::PermissionDenied),
            ..FakePen::default()
        };

        assert!(matches!(
            controller.run(pen, &AtomicBool::new(false)),
            Err(Error::PermissionDenied(_))
        ));
        assert!(controller.toggle.runner().calls().is_empty());
    }

    #[test]
    fn test_failed_toggle_keeps_listening() {
        let config = surface_config();
        let runner = FakeRunner::new(|argv| match argv {
            ["xinput", "list-props", _] => ok(ENABLED_PROPS),
            ["xinput", "disable", _] => exit(1),
            _ => ok(""),
        });
        let mut controller = Controller::new(&config, ToggleState::new(runner, &config));
        let pen = FakePen::with_events([
            Ok(Some(press(BTN_STYLUS2))),
            Ok(Some(press(BTN_STYLUS2))),
            Ok(None),
            Ok(Some(press(BTN_STYLUS2))),
            Ok(Some(press(BTN_STYLUS2))),
        ]);

        let result = controller.run(pen, &AtomicBool::new(false));

        // Only the exhausted script ends the loop.
        assert!(matches!(result, Err(Error::Unexpected(_))));
        let disables = controller
            .toggle
            .runner()
            .calls()
            .into_iter()
            .filter(|c| c.len() > 1 && c[1] == "disable")
            .count();
        assert_eq!(disables, 2);
        assert!(controller.toggle.is_enabled());
    }

    fn dev(path: &str, name: &str) -> InputDeviceInfo {
        InputDeviceInfo {
            path: PathBuf::from(path),
            name: name.into(),
            has_key_events: true,
        }
    }

    fn laptop_devices() -> Vec<InputDeviceInfo> {
        vec![
            dev("/dev/input/event0", "AT Translated Set 2 keyboard"),
            dev("/dev/input/event7", "Microsoft Surface Pen"),
        ]
    }

    fn auto_config() -> ToggleConfig {
        ToggleConfig {
            pen_device: None,
            touch_device: None,
            ..ToggleConfig::default()
        }
    }

    #[test]
    fn test_prepare_auto_detects_devices_and_state() {
        let devices = laptop_devices();
        let runner = FakeRunner::new(|argv| match argv {
            ["xinput", "list"] => ok(SAMPLE_LIST),
            ["xinput", "list-props", _] => ok("\tDevice Enabled (152):\t0\n"),
            _ => ok(""),
        });

        let (info, toggle) = prepare(&auto_config(), &devices, runner).unwrap();

        assert_eq!(info.name, "Microsoft Surface Pen");
        assert_eq!(toggle.touchscreen(), Some("IPTS Touchscreen"));
        assert!(!toggle.is_enabled());
        assert!(toggle
            .runner()
            .called(&["xinput", "list-props", "IPTS Touchscreen"]));
    }

    #[test]
    fn test_prepare_without_pen_lists_devices() {
        let devices = vec![dev("/dev/input/event0", "AT Translated Set 2 keyboard")];
        let runner = FakeRunner::new(|_| ok(SAMPLE_LIST));

        match prepare(&auto_config(), &devices, runner) {
            Err(Error::DeviceNotFound { what, available }) => {
                assert_eq!(what, "Pen device");
                assert_eq!(
                    available,
                    vec!["/dev/input/event0: AT Translated Set 2 keyboard"]
                );
            }
            other => panic!("unexpected result: {:?}", other.map(|(info, _)| info)),
        }
    }

    #[test]
    fn test_prepare_without_touchscreen_is_fatal() {
        let devices = laptop_devices();
        let runner = FakeRunner::new(|argv| match argv {
            ["xinput", "list"] => ok("⎜   ↳ Logitech Mouse \tid=9\t[slave  pointer  (2)]\n"),
            _ => ok(""),
        });

        match prepare(&auto_config(), &devices, runner) {
            Err(Error::DeviceNotFound { what, available }) => {
                assert!(what.starts_with("Touchscreen"));
                assert_eq!(available, vec!["Logitech Mouse"]);
            }
            other => panic!("unexpected result: {:?}", other.map(|(info, _)| info)),
        }
    }

    #[test]
    fn test_prepare_custom_command_skips_xinput() {
        let devices = laptop_devices();
        let config = ToggleConfig {
            command: Some("toggle-touch.sh".into()),
            ..auto_config()
        };

        let (_, toggle) = prepare(&config, &devices, FakeRunner::new(|_| ok(""))).unwrap();

        assert!(toggle.runner().calls().is_empty());
        assert_eq!(toggle.touchscreen(), None);
    }

    #[test]
    fn test_prepare_unknown_initial_state_is_not_fatal() {
        let devices = laptop_devices();
        let config = ToggleConfig {
            touch_device: Some("ELAN Touchscreen".into()),
            ..auto_config()
        };
        let runner = FakeRunner::new(|argv| match argv {
            ["xinput", "list-props", _] => exit(1),
            _ => ok(""),
        });

        let (_, toggle) = prepare(&config, &devices, runner).unwrap();

        assert!(toggle.is_enabled());
        assert!(!toggle.runner().called(&["xinput", "list"]));
    }
}
