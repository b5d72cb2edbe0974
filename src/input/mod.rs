mod button;
mod event;

pub use button::ButtonFilter;
pub use event::{key_name, pressed_key, EV_KEY, KEY_PRESSED, KEY_RELEASED, KEY_REPEATED};

#[cfg(test)]
pub use event::{key_event, BTN_STYLUS2, BTN_TOUCH};
