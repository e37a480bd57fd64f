use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// CSS-style hex color as written in the state catalog (`#rgb` or `#rrggbb`).
///
/// The configured spelling is kept so legend output matches configuration verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    text: String,
    rgb: (u8, u8, u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color {0:?}: expected #rgb or #rrggbb")]
pub struct HexColorError(pub String);

impl HexColor {
    pub const DEFAULT_TEXT: &'static str = "#000";

    pub fn parse(text: &str) -> Result<Self, HexColorError> {
        let invalid = || HexColorError(text.to_string());
        let digits = text.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let rgb = match digits.len() {
            3 => {
                let mut channels = digits.chars().map(|c| {
                    // a single hex digit doubles: #f80 == #ff8800
                    let value = c.to_digit(16).unwrap_or(0) as u8;
                    value * 17
                });
                (
                    channels.next().unwrap_or(0),
                    channels.next().unwrap_or(0),
                    channels.next().unwrap_or(0),
                )
            }
            6 => {
                let channel = |range: std::ops::Range<usize>| {
                    u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
                };
                (channel(0..2)?, channel(2..4)?, channel(4..6)?)
            }
            _ => return Err(invalid()),
        };
        Ok(Self {
            text: text.to_string(),
            rgb,
        })
    }

    /// The fallback color for states missing from the catalog.
    pub fn black() -> Self {
        Self {
            text: Self::DEFAULT_TEXT.to_string(),
            rgb: (0, 0, 0),
        }
    }

    pub fn white() -> Self {
        Self {
            text: "#fff".to_string(),
            rgb: (255, 255, 255),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        self.rgb
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::black()
    }
}

impl FromStr for HexColor {
    type Err = HexColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = HexColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.text
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
