//! Device handle shared between sessions.
//!
//! Every connection holds a clone of the same [`SharedDevice`]. Each method
//! takes the lock for the duration of a single operation, so a power request
//! and a concurrent query always observe a consistent state and changes made
//! by one session are visible to the next read from any other.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use pjlink_core::{DeviceClass, InputSource, PowerState, Result};

use crate::{Device, DeviceSnapshot};

/// Cloneable handle to one emulated device.
///
/// # Examples
///
/// ```
/// use pjlink_core::PowerState;
/// use pjlink_emulator::{Device, DeviceProfile, SharedDevice};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let device = SharedDevice::new(Device::new(DeviceProfile::Display));
/// let other = device.clone();
///
/// device.request_power_on().await;
/// assert_eq!(other.power().await, PowerState::On);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SharedDevice {
    inner: Arc<Mutex<Device>>,
}

impl SharedDevice {
    pub fn new(device: Device) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    /// Current power state, resolving a finished warm-up or cool-down first.
    pub async fn power(&self) -> PowerState {
        self.inner.lock().await.resolve_thermal_state_at(Instant::now())
    }

    pub async fn request_power_on(&self) -> PowerState {
        self.inner.lock().await.request_power_on_at(Instant::now())
    }

    pub async fn request_power_off(&self) -> PowerState {
        self.inner.lock().await.request_power_off_at(Instant::now())
    }

    /// Select an input source. See [`Device::set_input`].
    pub async fn set_input(&self, code: i64) -> Result<InputSource> {
        self.inner.lock().await.set_input(code)
    }

    pub async fn input(&self) -> InputSource {
        self.inner.lock().await.input()
    }

    pub async fn name(&self) -> String {
        self.inner.lock().await.name().to_owned()
    }

    pub async fn class(&self) -> DeviceClass {
        self.inner.lock().await.class()
    }

    /// Remaining lamp hours. See [`Device::remaining_lamp_hours`].
    pub async fn remaining_lamp_hours(&self) -> Result<u32> {
        self.inner
            .lock()
            .await
            .remaining_lamp_hours_at(Instant::now())
    }

    pub async fn snapshot(&self) -> DeviceSnapshot {
        self.inner.lock().await.snapshot_at(Instant::now())
    }
}

impl From<Device> for SharedDevice {
    fn from(device: Device) -> Self {
        Self::new(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceProfile;
    use std::time::Duration;

    fn display() -> SharedDevice {
        Device::builder(DeviceProfile::Display)
            .with_name("Shared Display")
            .build()
            .into()
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let device = display();
        let other = device.clone();

        device.set_input(42).await.unwrap();
        assert_eq!(other.input().await.as_u8(), 42);

        other.request_power_on().await;
        assert_eq!(device.power().await, PowerState::On);
    }

    #[tokio::test]
    async fn test_power_read_resolves_warmup() {
        let device: SharedDevice = Device::builder(DeviceProfile::Projector)
            .with_warmup(Duration::from_millis(20))
            .build()
            .into();

        assert_eq!(device.request_power_on().await, PowerState::Warming);
        assert_eq!(device.power().await, PowerState::Warming);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(device.power().await, PowerState::On);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_changes() {
        let device = display();
        device.request_power_on().await;
        device.set_input(11).await.unwrap();

        let snapshot = device.snapshot().await;
        assert_eq!(snapshot.name, "Shared Display");
        assert_eq!(snapshot.power, PowerState::On);
        assert_eq!(snapshot.input.as_u8(), 11);
        assert_eq!(snapshot.lamp_hours_remaining, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_leave_one_of_their_inputs() {
        let device = display();
        let codes = [12_i64, 23, 34, 45, 56];

        let tasks: Vec<_> = codes
            .iter()
            .map(|&code| {
                let device = device.clone();
                tokio::spawn(async move {
                    for _ in 0..50 {
                        device.set_input(code).await.unwrap();
                        device.request_power_on().await;
                        device.request_power_off().await;
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        let input = i64::from(device.input().await.as_u8());
        assert!(codes.contains(&input));
        assert_eq!(device.power().await, PowerState::Off);
    }
}
