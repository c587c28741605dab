//! Network layer for the PJLink emulator.
//!
//! This crate accepts TCP connections and runs one PJLink session per
//! connection against a shared emulated device. Framing is delegated to
//! [`PjLinkCodec`](pjlink_protocol::PjLinkCodec) and every request is
//! answered through [`pjlink_emulator::handle_line`].
//!
//! # Components
//!
//! - **TcpServer**: Listener and accept loop, one task per connection
//! - **Connection**: A single session from greeting to close
//!
//! # Example
//!
//! ```no_run
//! use pjlink_emulator::{Device, DeviceProfile, SharedDevice};
//! use pjlink_network::{TcpServer, TcpServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let device = SharedDevice::new(Device::new(DeviceProfile::Projector));
//! let server = TcpServer::bind(TcpServerConfig::default(), device).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

mod connection;
mod server;

pub use connection::{Connection, SessionState};
pub use server::{ServerError, TcpServer, TcpServerConfig};
