//! TCP server for PJLink sessions.
//!
//! The server accepts any number of concurrent clients and runs each one as
//! an independent [`Connection`] task against the same [`SharedDevice`].
//!
//! # Architecture
//!
//! ```text
//! Client A ┐
//!          │
//! Client B ├──> TcpServer ──> Connection task (one per client)
//!          │                        │
//! Client C ┘                        └──> SharedDevice (one per process)
//! ```
//!
//! # Design Principles
//!
//! - **No authentication**: PJLink class 1 without a password
//! - **No connection limit**: every accepted client gets a session
//! - **Isolated failures**: an error in one session never affects another
//!   or the accept loop
//!
//! # Example Usage
//!
//! ```no_run
//! use pjlink_emulator::{Device, DeviceProfile, SharedDevice};
//! use pjlink_network::{TcpServer, TcpServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TcpServerConfig {
//!     bind_addr: "127.0.0.1:4352".parse()?,
//!     ..TcpServerConfig::default()
//! };
//! let device = SharedDevice::new(Device::new(DeviceProfile::Display));
//!
//! let server = TcpServer::bind(config, device).await?;
//! server
//!     .run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, debug, error, info, info_span, warn};

use pjlink_core::constants::{
    ACCEPT_ERROR_BACKOFF, DEFAULT_BIND_ADDR, DEFAULT_MAX_LINE_LENGTH, DEFAULT_PORT,
};
use pjlink_emulator::SharedDevice;

use crate::Connection;

/// Configuration for TCP server
///
/// # Example
///
/// ```
/// use pjlink_network::TcpServerConfig;
///
/// let config = TcpServerConfig::default();
/// assert_eq!(config.bind_addr.port(), 4352);
/// assert_eq!(config.max_line_length, 1024);
/// ```
#[derive(Debug, Clone)]
pub struct TcpServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,

    /// Longest accepted request line in bytes; longer lines end the session
    pub max_line_length: usize,
}

impl Default for TcpServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Errors that can occur during TCP server operations
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Codec error during line decoding or reply encoding
    #[error("Codec error: {0}")]
    Codec(String),
}

/// TCP server for PJLink sessions
///
/// # Connection Lifecycle
///
/// 1. Bind server with `bind()`
/// 2. Serve with `run()` or `run_until()`
/// 3. Each accepted client gets its own task running a [`Connection`]
/// 4. `run_until()` returns once its shutdown future completes; sessions
///    already running finish on their own
pub struct TcpServer {
    /// TCP listener for accepting new connections
    listener: TcpListener,

    /// Device every session talks to
    device: SharedDevice,

    /// Server configuration
    config: TcpServerConfig,

    /// Number of sessions currently running
    active: Arc<AtomicUsize>,
}

impl TcpServer {
    /// Bind the server to the configured address
    ///
    /// # Errors
    ///
    /// Returns `ServerError::BindFailed` if:
    /// - Address is already in use
    /// - Permission denied (e.g., binding to privileged port)
    pub async fn bind(config: TcpServerConfig, device: SharedDevice) -> Result<Self, ServerError> {
        debug!("Binding TCP server to {}", config.bind_addr);

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| ServerError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;

        info!(addr = %listener.local_addr()?, "PJLink server listening");

        Ok(Self {
            listener,
            device,
            config,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Get the actual bound address (useful when binding port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of sessions currently running
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Handle to the session counter, readable after the server is moved
    /// into its run loop.
    pub fn connection_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.active)
    }

    /// Serve forever.
    ///
    /// # Errors
    ///
    /// Never returns in practice; accept errors are logged and the loop
    /// continues.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Serve until `shutdown` completes.
    ///
    /// Stops accepting new connections as soon as `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(
                        active = self.active_connections(),
                        "Shutdown requested, no longer accepting connections"
                    );
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => self.spawn_session(stream, addr),
                    Err(e) => back_off_after_accept_error(&e).await,
                },
            }
        }
    }

    fn spawn_session(&self, stream: TcpStream, addr: SocketAddr) {
        // Set TCP_NODELAY for low latency
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
        }

        let guard = ActiveGuard::new(Arc::clone(&self.active));
        info!(peer = %addr, active = guard.count(), "Client connected");

        let connection = Connection::new(
            stream,
            addr,
            self.device.clone(),
            self.config.max_line_length,
        );

        let span = info_span!("session", peer = %addr);
        tokio::spawn(
            async move {
                if let Err(e) = connection.run().await {
                    warn!(error = %e, "Session ended with error");
                }
                drop(guard);
            }
            .instrument(span),
        );
    }
}

/// Log a failed accept and pause so persistent errors (EMFILE, ENFILE)
/// do not spin the accept loop.
async fn back_off_after_accept_error(e: &std::io::Error) {
    error!(
        error = %e,
        backoff_ms = ACCEPT_ERROR_BACKOFF.as_millis(),
        "Failed to accept connection"
    );
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

/// Keeps the active session count accurate even if a session task panics.
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }

    fn count(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pjlink_emulator::{Device, DeviceProfile};

    fn local_config() -> TcpServerConfig {
        TcpServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..TcpServerConfig::default()
        }
    }

    fn device() -> SharedDevice {
        Device::new(DeviceProfile::Display).into()
    }

    #[test]
    fn test_default_config() {
        let config = TcpServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:4352".parse().unwrap());
        assert_eq!(config.max_line_length, DEFAULT_MAX_LINE_LENGTH);
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = TcpServer::bind(local_config(), device()).await.unwrap();
        let addr = server.local_addr().unwrap();

        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
        assert_eq!(server.active_connections(), 0);
    }

    #[tokio::test]
    async fn test_bind_address_in_use() {
        let first = TcpServer::bind(local_config(), device()).await.unwrap();
        let config = TcpServerConfig {
            bind_addr: first.local_addr().unwrap(),
            ..TcpServerConfig::default()
        };

        let result = TcpServer::bind(config, device()).await;
        assert!(matches!(result, Err(ServerError::BindFailed { .. })));
    }

    #[tokio::test]
    async fn test_run_until_returns_on_shutdown() {
        let server = TcpServer::bind(local_config(), device()).await.unwrap();
        server.run_until(async {}).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_error_backs_off() {
        let start = tokio::time::Instant::now();
        let err = std::io::Error::other("too many open files");

        back_off_after_accept_error(&err).await;

        assert!(start.elapsed() >= ACCEPT_ERROR_BACKOFF);
    }

    #[test]
    fn test_active_guard_counts() {
        let counter = Arc::new(AtomicUsize::new(0));
        let first = ActiveGuard::new(Arc::clone(&counter));
        let second = ActiveGuard::new(Arc::clone(&counter));
        assert_eq!(second.count(), 2);

        drop(first);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        drop(second);
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }
}
