//! PJLink emulator crate providing the device model and command dispatch.
//!
//! This crate contains the state of one emulated projector or display, the
//! rules for its timed power transitions, and the dispatcher that turns
//! parsed requests into replies.

pub mod device;
pub mod dispatcher;
pub mod profile;
pub mod shared;

pub use device::{Device, DeviceBuilder, DeviceSnapshot};
pub use dispatcher::{dispatch, handle_line};
pub use profile::DeviceProfile;
pub use shared::SharedDevice;
