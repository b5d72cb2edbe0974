use evdevil::event::{EventType, InputEvent};

pub const EV_KEY: u16 = 0x01;

/// EV_KEY values.
pub const KEY_RELEASED: i32 = 0;
pub const KEY_PRESSED: i32 = 1;
pub const KEY_REPEATED: i32 = 2;

pub const BTN_TOOL_PEN: u16 = 0x140;
pub const BTN_TOOL_RUBBER: u16 = 0x141;
pub const BTN_STYLUS3: u16 = 0x149;
pub const BTN_TOUCH: u16 = 0x14a;
pub const BTN_STYLUS: u16 = 0x14b;
pub const BTN_STYLUS2: u16 = 0x14c;

#[cfg(test)]
pub fn key_event(code: u16, value: i32) -> InputEvent {
    InputEvent::new(EventType::from_raw(EV_KEY), code, value)
}

/// The key code of `ev` if it is a key-down transition (not release or repeat).
pub fn pressed_key(ev: &InputEvent) -> Option<u16> {
    if ev.event_type() == EventType::KEY && ev.raw_value() == KEY_PRESSED {
        Some(ev.raw_code())
    } else {
        None
    }
}

/// Human-readable name for pen-related key codes.
pub fn key_name(code: u16) -> String {
    match code {
        BTN_TOOL_PEN => "BTN_TOOL_PEN".into(),
        BTN_TOOL_RUBBER => "BTN_TOOL_RUBBER".into(),
        BTN_STYLUS3 => "BTN_STYLUS3".into(),
        BTN_TOUCH => "BTN_TOUCH".into(),
        BTN_STYLUS => "BTN_STYLUS".into(),
        BTN_STYLUS2 => "BTN_STYLUS2".into(),
        _ => format!("KEY/{:#x}", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_key_ignores_release_and_repeat() {
        assert_eq!(pressed_key(&key_event(BTN_STYLUS, KEY_PRESSED)), Some(BTN_STYLUS));
        assert_eq!(pressed_key(&key_event(BTN_STYLUS, KEY_RELEASED)), None);
        assert_eq!(pressed_key(&key_event(BTN_STYLUS, KEY_REPEATED)), None);

        let syn = InputEvent::new(EventType::from_raw(0x00), 0, 1);
        assert_eq!(pressed_key(&syn), None);
    }
}
