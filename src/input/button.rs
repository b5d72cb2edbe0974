//! Which pen button counts as a press for double-press detection.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use super::event::{BTN_STYLUS, BTN_STYLUS2, BTN_STYLUS3, BTN_TOOL_RUBBER, BTN_TOUCH};

/// Filter applied to EV_KEY presses before they reach the detector.
///
/// `Any` accepts every key on the pen device, including tip contact if the
/// driver reports it as BTN_TOUCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ButtonFilter {
    #[default]
    Any,
    Code(u16),
}

impl ButtonFilter {
    pub fn accepts(&self, code: u16) -> bool {
        match self {
            ButtonFilter::Any => true,
            ButtonFilter::Code(c) => *c == code,
        }
    }
}

impl fmt::Display for ButtonFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonFilter::Any => write!(f, "any"),
            ButtonFilter::Code(code) => write!(f, "{:#x}", code),
        }
    }
}

impl FromStr for ButtonFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let code = match s.as_str() {
            "any" => return Ok(ButtonFilter::Any),
            "stylus" | "btn_stylus" => BTN_STYLUS,
            "stylus2" | "btn_stylus2" => BTN_STYLUS2,
            "stylus3" | "btn_stylus3" => BTN_STYLUS3,
            "touch" | "btn_touch" => BTN_TOUCH,
            "eraser" | "rubber" | "btn_tool_rubber" => BTN_TOOL_RUBBER,
            other => {
                let parsed = match other.strip_prefix("0x") {
                    Some(hex) => u16::from_str_radix(hex, 16),
                    None => other.parse::<u16>(),
                };
                parsed.map_err(|_| {
                    format!(
                        "Invalid button '{}'. Use a key code (e.g. 0x14c) or one of: \
                         any, stylus, stylus2, stylus3, touch, eraser",
                        s
                    )
                })?
            }
        };
        Ok(ButtonFilter::Code(code))
    }
}

impl TryFrom<String> for ButtonFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
