//! A single PJLink session.
//!
//! # Session Flow
//!
//! ```text
//! connect ──> "PJLINK 0\r"
//!   │
//!   ├─ "%1POWR ?\r" ──> "%1POWR=0\r\n>"      (any request: reply + prompt)
//!   ├─ "HELLO\r"    ──> "Invalid Command\n>"
//!   ├─ "\r"         ──> ">"                  then close
//!   ├─ "exit\r"     ──> (nothing)            then close
//!   └─ EOF / error  ──> close
//! ```
//!
//! Replies go out in request order; a session never reads the next line
//! before its reply has been flushed.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, info, trace, warn};

use pjlink_core::constants::EXIT_COMMAND;
use pjlink_emulator::{SharedDevice, handle_line};
use pjlink_protocol::{PjLinkCodec, Response, ServerMessage};

use crate::ServerError;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Greeting sent, waiting for the next request line.
    AwaitingLine,
    /// Session over; the transport is dropped when the connection is.
    Closed,
}

/// One client session over any byte stream.
///
/// Generic over the transport so sessions can be driven over in-memory
/// pipes as well as TCP.
#[derive(Debug)]
pub struct Connection<S> {
    /// Framed stream with PjLinkCodec
    framed: Framed<S, PjLinkCodec>,

    /// Device shared with every other session
    device: SharedDevice,

    /// Remote client address
    peer_addr: SocketAddr,

    /// Connection timestamp
    connected_at: DateTime<Utc>,

    state: SessionState,

    /// Number of request lines answered
    requests: u64,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        peer_addr: SocketAddr,
        device: SharedDevice,
        max_line_length: usize,
    ) -> Self {
        Self {
            framed: Framed::new(stream, PjLinkCodec::with_max_line_length(max_line_length)),
            device,
            peer_addr,
            connected_at: Utc::now(),
            state: SessionState::AwaitingLine,
            requests: 0,
        }
    }

    /// Get the remote address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Get connection timestamp
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Get connection uptime
    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.connected_at
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion.
    ///
    /// Sends the greeting, then answers lines until the client closes, sends
    /// a blank line or `exit`, or the transport fails.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Codec` when a line exceeds the maximum length or
    /// the transport fails. The session is closed either way.
    pub async fn run(mut self) -> Result<(), ServerError> {
        let result = self.serve().await;
        self.state = SessionState::Closed;

        info!(
            peer = %self.peer_addr,
            requests = self.requests,
            duration_ms = self.uptime().num_milliseconds(),
            "Session closed"
        );
        result
    }

    async fn serve(&mut self) -> Result<(), ServerError> {
        self.send(ServerMessage::Greeting).await?;

        while self.state == SessionState::AwaitingLine {
            self.step().await?;
        }
        Ok(())
    }

    /// Read and answer one line.
    async fn step(&mut self) -> Result<(), ServerError> {
        let line = match self.framed.next().await {
            Some(Ok(line)) => line,
            Some(Err(e)) if e.is_fatal() => {
                self.state = SessionState::Closed;
                warn!(peer = %self.peer_addr, error = %e, "Dropping session");
                return Err(ServerError::Codec(e.to_string()));
            }
            Some(Err(e)) => {
                debug!(peer = %self.peer_addr, error = %e, "Undecodable line");
                return self.reply(Response::from_error(None, &e)).await;
            }
            None => {
                debug!(peer = %self.peer_addr, "Peer closed the connection");
                self.state = SessionState::Closed;
                return Ok(());
            }
        };

        trace!(peer = %self.peer_addr, line = %line, "Received line");

        if line.is_empty() {
            self.send(ServerMessage::BarePrompt).await?;
            self.state = SessionState::Closed;
            return Ok(());
        }

        if line == EXIT_COMMAND {
            debug!(peer = %self.peer_addr, "Client requested exit");
            self.state = SessionState::Closed;
            return Ok(());
        }

        let response = handle_line(&self.device, &line).await;
        self.reply(response).await
    }

    /// Write a reply followed by the prompt.
    async fn reply(&mut self, response: Response) -> Result<(), ServerError> {
        self.requests += 1;
        self.framed
            .feed(ServerMessage::Reply(response))
            .await
            .map_err(|e| ServerError::Codec(e.to_string()))?;
        self.send(ServerMessage::Prompt).await
    }

    async fn send(&mut self, message: ServerMessage) -> Result<(), ServerError> {
        self.framed
            .send(message)
            .await
            .map_err(|e| ServerError::Codec(e.to_string()))
    }
}
