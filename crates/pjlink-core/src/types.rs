use crate::{
    Result,
    constants::{
        DEFAULT_INPUT, MAX_INPUT_FAMILY, MAX_INPUT_POSITION, MIN_INPUT_FAMILY, MIN_INPUT_POSITION,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Power state of the emulated device.
///
/// `Off` and `On` are stable. `Cooling` and `Warming` are transient and
/// resolve to `Off`/`On` once the configured delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PowerState {
    Off = 0,
    On = 1,
    Cooling = 2,
    Warming = 3,
}

impl PowerState {
    /// PJLink code reported by `POWR ?`.
    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` for `Cooling` and `Warming`.
    #[inline]
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, PowerState::Cooling | PowerState::Warming)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PowerState::Off => write!(f, "Off"),
            PowerState::On => write!(f, "On"),
            PowerState::Cooling => write!(f, "Cooling"),
            PowerState::Warming => write!(f, "Warming"),
        }
    }
}

/// Input source family (tens digit of the input code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum InputFamily {
    Rgb = 1,
    Video = 2,
    Digital = 3,
    Storage = 4,
    Network = 5,
}

impl InputFamily {
    #[inline]
    fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(InputFamily::Rgb),
            2 => Some(InputFamily::Video),
            3 => Some(InputFamily::Digital),
            4 => Some(InputFamily::Storage),
            5 => Some(InputFamily::Network),
            _ => None,
        }
    }
}

impl fmt::Display for InputFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputFamily::Rgb => write!(f, "RGB"),
            InputFamily::Video => write!(f, "VIDEO"),
            InputFamily::Digital => write!(f, "DIGITAL"),
            InputFamily::Storage => write!(f, "STORAGE"),
            InputFamily::Network => write!(f, "NETWORK"),
        }
    }
}

/// Input source code (two digits: family 1-5, position 1-9).
///
/// Valid codes are 11-19, 21-29, 31-39, 41-49 and 51-59. Codes such as
/// 20 or 30 (position zero) are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct InputSource(u8);

impl InputSource {
    /// Create an input source with validation.
    ///
    /// Accepts any integer so that out-of-range values coming off the wire
    /// are reported as invalid parameters rather than overflow.
    ///
    /// # Errors
    /// Returns `Error::InvalidParameter` if the code lies outside every
    /// family range.
    pub fn new(code: i64) -> Result<Self> {
        let invalid = || Error::InvalidParameter {
            parameter: "input source".to_string(),
            value: code.to_string(),
        };

        let code = u8::try_from(code).map_err(|_| invalid())?;
        let family = code / 10;
        let position = code % 10;
        if !(MIN_INPUT_FAMILY..=MAX_INPUT_FAMILY).contains(&family)
            || !(MIN_INPUT_POSITION..=MAX_INPUT_POSITION).contains(&position)
        {
            return Err(invalid());
        }
        Ok(InputSource(code))
    }

    /// Get the raw input code.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Get the family of this input.
    #[must_use]
    pub fn family(&self) -> InputFamily {
        // Constructor guarantees the tens digit is 1-5.
        InputFamily::from_digit(self.0 / 10).unwrap_or(InputFamily::Rgb)
    }

    /// Get the position within the family (1-9).
    #[must_use]
    pub fn position(&self) -> u8 {
        self.0 % 10
    }
}

impl Default for InputSource {
    /// Input 31, the first digital input.
    fn default() -> Self {
        InputSource(DEFAULT_INPUT)
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for InputSource {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        InputSource::new(i64::from(value))
    }
}

impl From<InputSource> for u8 {
    fn from(input: InputSource) -> Self {
        input.0
    }
}

/// Combined audio/video mute state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvMute {
    /// Nothing muted (code 30, same as "unmute both").
    None,
    /// Video muted (code 11).
    Video,
    /// Audio muted (code 21).
    Audio,
    /// Audio and video muted (code 31).
    Both,
}

impl AvMute {
    /// PJLink code describing this mute state.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            AvMute::None => 30,
            AvMute::Video => 11,
            AvMute::Audio => 21,
            AvMute::Both => 31,
        }
    }

    /// Write value that clears this mute state (10, 20 or 30).
    #[must_use]
    pub fn unmute_code(self) -> u8 {
        match self {
            AvMute::Video => 10,
            AvMute::Audio => 20,
            AvMute::None | AvMute::Both => 30,
        }
    }
}

/// PJLink protocol class reported by `CLSS ?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DeviceClass {
    One = 1,
    Two = 2,
}

impl DeviceClass {
    /// Create a device class from its numeric value.
    ///
    /// # Errors
    /// Returns `Error::InvalidParameter` if the value is not 1 or 2.
    #[inline]
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(DeviceClass::One),
            2 => Ok(DeviceClass::Two),
            _ => Err(Error::InvalidParameter {
                parameter: "device class".to_string(),
                value: value.to_string(),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_u8())
    }
}
