//! Emulated device state.
//!
//! This module models one PJLink device: its power state, selected input,
//! mute state, lamp and class, together with the timing rules for warm-up and
//! cool-down.
//!
//! # Power States
//!
//! ```text
//!            power on                 warm-up elapsed
//!   Off ──────────────> Warming ─────────────────────> On
//!    ^                                                  │
//!    │   cool-down elapsed              power off       │
//!    └──────────────────── Cooling <────────────────────┘
//! ```
//!
//! With a zero delay the transient state is skipped entirely. Power requests
//! are accepted from any state, as on real hardware: powering on while
//! cooling restarts the warm-up.
//!
//! # Lazy Resolution
//!
//! There is no background timer. A transient state is resolved when it is
//! observed, through [`Device::resolve_thermal_state_at`]. Every
//! client-visible read of the power state must resolve first.
//!
//! # Time
//!
//! Every time-dependent operation has an `_at` variant taking the current
//! instant explicitly; the plain variants call it with `Instant::now()`.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use pjlink_core::PowerState;
//! use pjlink_emulator::{Device, DeviceProfile};
//!
//! let mut device = Device::builder(DeviceProfile::Projector)
//!     .with_warmup(Duration::from_secs(6))
//!     .build();
//!
//! let start = device.created_at();
//! assert_eq!(device.request_power_on_at(start), PowerState::Warming);
//! assert_eq!(device.resolve_thermal_state_at(start + Duration::from_secs(5)), PowerState::Warming);
//! assert_eq!(device.resolve_thermal_state_at(start + Duration::from_secs(6)), PowerState::On);
//! ```

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use pjlink_core::{
    AvMute, DeviceClass, Error, InputSource, PowerState, Result,
    constants::MAX_NAME_SUFFIX,
};

use crate::DeviceProfile;

/// Consistent copy of the observable device state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub name: String,
    pub power: PowerState,
    pub input: InputSource,
    pub av_mute: AvMute,
    pub class: DeviceClass,
    /// Remaining lamp hours, `None` on lamp-less devices.
    pub lamp_hours_remaining: Option<u32>,
}

/// State of one emulated PJLink device.
///
/// # Thread Safety
///
/// This struct is not thread-safe by design. Share it between connections
/// through [`SharedDevice`](crate::SharedDevice).
#[derive(Debug)]
pub struct Device {
    name: String,
    power: PowerState,
    input: InputSource,
    av_mute: AvMute,
    lamp_hours: Option<NonZeroU32>,
    class: DeviceClass,

    /// When the device was created; drives the lamp countdown.
    created_at: Instant,

    /// When `Warming`/`Cooling` was entered. `None` in stable states.
    thermal_transition_at: Option<Instant>,

    warmup: Duration,
    cooldown: Duration,
}

impl Device {
    /// Create a device from a preset with a generated name.
    pub fn new(profile: DeviceProfile) -> Self {
        Self::builder(profile).build()
    }

    /// Create a builder starting from a preset.
    pub fn builder(profile: DeviceProfile) -> DeviceBuilder {
        DeviceBuilder::new(profile)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored power state, without resolving transient states.
    ///
    /// Use [`resolve_thermal_state_at`](Self::resolve_thermal_state_at) for
    /// anything a client can observe.
    pub fn power(&self) -> PowerState {
        self.power
    }

    pub fn input(&self) -> InputSource {
        self.input
    }

    pub fn av_mute(&self) -> AvMute {
        self.av_mute
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Rated lamp life, `None` for lamp-less devices.
    pub fn lamp_hours(&self) -> Option<NonZeroU32> {
        self.lamp_hours
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn warmup(&self) -> Duration {
        self.warmup
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Request power on. Returns the resulting power state.
    pub fn request_power_on(&mut self) -> PowerState {
        self.request_power_on_at(Instant::now())
    }

    /// Request power on at a given instant.
    ///
    /// Goes straight to `On` when the warm-up delay is zero, otherwise enters
    /// `Warming` and starts the warm-up clock. Redundant requests re-apply
    /// the same rule.
    pub fn request_power_on_at(&mut self, now: Instant) -> PowerState {
        if self.warmup.is_zero() {
            self.enter(PowerState::On, None);
        } else {
            self.enter(PowerState::Warming, Some(now));
        }
        self.power
    }

    /// Request power off. Returns the resulting power state.
    pub fn request_power_off(&mut self) -> PowerState {
        self.request_power_off_at(Instant::now())
    }

    /// Request power off at a given instant; the mirror of
    /// [`request_power_on_at`](Self::request_power_on_at) using the
    /// cool-down delay.
    pub fn request_power_off_at(&mut self, now: Instant) -> PowerState {
        if self.cooldown.is_zero() {
            self.enter(PowerState::Off, None);
        } else {
            self.enter(PowerState::Cooling, Some(now));
        }
        self.power
    }

    /// Resolve a transient power state. Returns the resolved state.
    pub fn resolve_thermal_state(&mut self) -> PowerState {
        self.resolve_thermal_state_at(Instant::now())
    }

    /// Resolve a transient power state at a given instant.
    ///
    /// `Warming` becomes `On` once `now` reaches the transition instant plus
    /// the warm-up delay; `Cooling` becomes `Off` likewise with the cool-down
    /// delay. Stable states are left alone.
    pub fn resolve_thermal_state_at(&mut self, now: Instant) -> PowerState {
        let (delay, target) = match self.power {
            PowerState::Warming => (self.warmup, PowerState::On),
            PowerState::Cooling => (self.cooldown, PowerState::Off),
            PowerState::On | PowerState::Off => return self.power,
        };

        // A deadline past the end of representable time is never reached.
        let due = match self.thermal_transition_at {
            Some(entered) => entered.checked_add(delay).is_some_and(|due| now >= due),
            None => true,
        };
        if due {
            self.enter(target, None);
        }
        self.power
    }

    /// Select an input source.
    ///
    /// # Errors
    /// Returns `Error::InvalidParameter` if `code` lies outside every input
    /// family range; the current input is left unchanged.
    pub fn set_input(&mut self, code: i64) -> Result<InputSource> {
        match InputSource::new(code) {
            Ok(input) => {
                if input != self.input {
                    info!(from = %self.input, to = %input, family = %input.family(), "Input changed");
                }
                self.input = input;
                Ok(input)
            }
            Err(e) => {
                warn!(code, current = %self.input, "Rejected input source");
                Err(e)
            }
        }
    }

    /// Remaining lamp hours.
    ///
    /// # Errors
    /// Returns `Error::ResourceUnavailable` on lamp-less devices.
    pub fn remaining_lamp_hours(&self) -> Result<u32> {
        self.remaining_lamp_hours_at(Instant::now())
    }

    /// Remaining lamp hours at a given instant.
    ///
    /// Each elapsed second (rounded) since creation counts as one hour of
    /// use, and the count wraps at the rated life, so the answer cycles
    /// through `lamp_hours..=1` instead of running out.
    ///
    /// # Errors
    /// Returns `Error::ResourceUnavailable` on lamp-less devices.
    pub fn remaining_lamp_hours_at(&self, now: Instant) -> Result<u32> {
        let Some(rated) = self.lamp_hours else {
            return Err(Error::ResourceUnavailable(format!("{} has no lamp", self.name)));
        };

        let rated = u64::from(rated.get());
        let elapsed = now.saturating_duration_since(self.created_at);
        let used = elapsed.as_secs_f64().round() as u64 % rated;
        // 1..=rated, always within u32
        Ok(u32::try_from(rated - used).unwrap_or(u32::MAX))
    }

    /// Take a snapshot after resolving any transient power state.
    pub fn snapshot_at(&mut self, now: Instant) -> DeviceSnapshot {
        let power = self.resolve_thermal_state_at(now);
        DeviceSnapshot {
            name: self.name.clone(),
            power,
            input: self.input,
            av_mute: self.av_mute,
            class: self.class,
            lamp_hours_remaining: self.remaining_lamp_hours_at(now).ok(),
        }
    }

    fn enter(&mut self, state: PowerState, transition_at: Option<Instant>) {
        if state != self.power {
            info!(device = %self.name, from = %self.power, to = %state, "Power state changed");
        }
        self.power = state;
        self.thermal_transition_at = transition_at;
    }
}

/// Builder for [`Device`] instances.
///
/// Starts from a [`DeviceProfile`] preset; every field can be overridden.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use pjlink_core::DeviceClass;
/// use pjlink_emulator::{Device, DeviceProfile};
///
/// let device = Device::builder(DeviceProfile::Display)
///     .with_name("Lobby Wall")
///     .with_class(DeviceClass::Two)
///     .with_warmup(Duration::from_millis(500))
///     .build();
///
/// assert_eq!(device.name(), "Lobby Wall");
/// assert!(device.lamp_hours().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct DeviceBuilder {
    profile: DeviceProfile,
    name: Option<String>,
    input: Option<InputSource>,
    av_mute: AvMute,
    lamp_hours: Option<NonZeroU32>,
    class: DeviceClass,
    warmup: Duration,
    cooldown: Duration,
}

impl DeviceBuilder {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            name: None,
            input: None,
            av_mute: AvMute::None,
            lamp_hours: profile.lamp_hours(),
            class: profile.class(),
            warmup: profile.warmup(),
            cooldown: profile.cooldown(),
        }
    }

    /// Use a fixed name instead of a generated one.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_input(mut self, input: InputSource) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_av_mute(mut self, av_mute: AvMute) -> Self {
        self.av_mute = av_mute;
        self
    }

    /// Set the rated lamp life; `None` emulates a lamp-less unit.
    pub fn with_lamp_hours(mut self, lamp_hours: Option<NonZeroU32>) -> Self {
        self.lamp_hours = lamp_hours;
        self
    }

    pub fn with_class(mut self, class: DeviceClass) -> Self {
        self.class = class;
        self
    }

    /// Set the warm-up delay; zero makes power-on instant.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the cool-down delay; zero makes power-off instant.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Build the device. It starts powered off.
    pub fn build(self) -> Device {
        let name = self.name.unwrap_or_else(|| generate_name(self.profile));
        let input = self.input.unwrap_or_default();

        Device {
            name,
            power: PowerState::Off,
            input,
            av_mute: self.av_mute,
            lamp_hours: self.lamp_hours,
            class: self.class,
            created_at: Instant::now(),
            thermal_transition_at: None,
            warmup: self.warmup,
            cooldown: self.cooldown,
        }
    }
}

fn generate_name(profile: DeviceProfile) -> String {
    let suffix = rand::rng().random_range(1..=MAX_NAME_SUFFIX);
    format!("{} {suffix}", profile.name_prefix())
}
