//! Device presets.
//!
//! The emulator starts as one of two presets:
//!
//! | Field       | Projector            | Display            |
//! |-------------|----------------------|--------------------|
//! | Lamp        | 30000 h              | none               |
//! | Class       | 2                    | 1                  |
//! | Warm-up     | 6 s                  | instant            |
//! | Cool-down   | 12 s                 | instant            |
//!
//! Both start powered off on input 31 with nothing muted.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use pjlink_core::DeviceClass;
use pjlink_core::constants::{
    DISPLAY_NAME_PREFIX, PROJECTOR_COOLDOWN, PROJECTOR_LAMP_HOURS, PROJECTOR_NAME_PREFIX,
    PROJECTOR_WARMUP,
};
use serde::{Deserialize, Serialize};

/// Kind of device to emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceProfile {
    /// Lamp-based projector with warm-up and cool-down delays.
    #[default]
    Projector,
    /// Flat panel: no lamp, instant power transitions.
    Display,
}

impl DeviceProfile {
    pub fn name_prefix(self) -> &'static str {
        match self {
            DeviceProfile::Projector => PROJECTOR_NAME_PREFIX,
            DeviceProfile::Display => DISPLAY_NAME_PREFIX,
        }
    }

    /// Rated lamp life, or `None` for lamp-less devices.
    pub fn lamp_hours(self) -> Option<NonZeroU32> {
        match self {
            DeviceProfile::Projector => NonZeroU32::new(PROJECTOR_LAMP_HOURS),
            DeviceProfile::Display => None,
        }
    }

    pub fn class(self) -> DeviceClass {
        match self {
            DeviceProfile::Projector => DeviceClass::Two,
            DeviceProfile::Display => DeviceClass::One,
        }
    }

    pub fn warmup(self) -> Duration {
        match self {
            DeviceProfile::Projector => PROJECTOR_WARMUP,
            DeviceProfile::Display => Duration::ZERO,
        }
    }

    pub fn cooldown(self) -> Duration {
        match self {
            DeviceProfile::Projector => PROJECTOR_COOLDOWN,
            DeviceProfile::Display => Duration::ZERO,
        }
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceProfile::Projector => write!(f, "projector"),
            DeviceProfile::Display => write!(f, "display"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projector_preset() {
        let profile = DeviceProfile::Projector;
        assert_eq!(profile.lamp_hours().map(NonZeroU32::get), Some(30_000));
        assert_eq!(profile.class(), DeviceClass::Two);
        assert_eq!(profile.warmup(), Duration::from_secs(6));
        assert_eq!(profile.cooldown(), Duration::from_secs(12));
    }

    #[test]
    fn test_display_preset() {
        let profile = DeviceProfile::Display;
        assert_eq!(profile.lamp_hours(), None);
        assert_eq!(profile.class(), DeviceClass::One);
        assert!(profile.warmup().is_zero());
        assert!(profile.cooldown().is_zero());
    }

    #[test]
    fn test_default_is_projector() {
        assert_eq!(DeviceProfile::default(), DeviceProfile::Projector);
    }
}
