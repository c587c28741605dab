//! Tokio codec for PJLink line framing.
//!
//! This module provides a Tokio-compatible codec that splits the inbound
//! byte stream into `\r`-terminated lines and encodes outbound
//! [`ServerMessage`]s, enabling use with Tokio's `Framed` streams.
//!
//! # Architecture
//!
//! ```text
//! TCP Stream -> Decoder -> String (one line, terminator removed)
//! ServerMessage -> Encoder -> TCP Stream
//! ```
//!
//! The decoder deliberately yields raw lines rather than parsed requests:
//! the session must see blank lines and the `exit` keyword before any
//! protocol parsing takes place.
//!
//! # Usage with Tokio Framed
//!
//! ```rust,no_run
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//! use pjlink_protocol::{PjLinkCodec, ServerMessage};
//! use futures::{SinkExt, StreamExt};
//!
//! # async fn example() -> pjlink_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:4352").await?;
//! let mut framed = Framed::new(stream, PjLinkCodec::new());
//!
//! framed.send(ServerMessage::Greeting).await?;
//! if let Some(Ok(line)) = framed.next().await {
//!     println!("Received: {line}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # DoS Protection
//!
//! A line that grows past the configured maximum without a terminator is
//! rejected with [`Error::LineTooLong`]. The caller is expected to drop the
//! connection.
//!
//! # End of Stream
//!
//! Bytes left without a terminator when the peer closes are discarded; a
//! partial line is never dispatched.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::Response;
use pjlink_core::{
    Error, Result,
    constants::{BARE_PROMPT, DEFAULT_MAX_LINE_LENGTH, GREETING, LINE_TERMINATOR, PROMPT},
};

/// Messages the emulator writes to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// `PJLINK 0\r`, sent once on connect.
    Greeting,
    /// A formatted reply.
    Reply(Response),
    /// `\n>` after every reply.
    Prompt,
    /// `>` sent before closing on a blank line.
    BarePrompt,
}

impl From<Response> for ServerMessage {
    fn from(response: Response) -> Self {
        ServerMessage::Reply(response)
    }
}

/// Tokio codec for PJLink lines.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use tokio_util::codec::Decoder;
/// use pjlink_protocol::PjLinkCodec;
///
/// let mut codec = PjLinkCodec::new();
/// let mut buffer = BytesMut::from(&b"%1POWR ?\r%1NAME ?\r"[..]);
///
/// assert_eq!(codec.decode(&mut buffer).unwrap().as_deref(), Some("%1POWR ?"));
/// assert_eq!(codec.decode(&mut buffer).unwrap().as_deref(), Some("%1NAME ?"));
/// assert_eq!(codec.decode(&mut buffer).unwrap(), None);
/// ```
#[derive(Debug)]
pub struct PjLinkCodec {
    /// Maximum line length in bytes, terminator excluded.
    max_line_length: usize,

    /// Index up to which the buffer has already been scanned for a
    /// terminator, so partial lines are not rescanned on every read.
    next_index: usize,
}

impl PjLinkCodec {
    /// Create a codec with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_line_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom maximum line length.
    ///
    /// ```
    /// use pjlink_protocol::PjLinkCodec;
    ///
    /// let codec = PjLinkCodec::with_max_line_length(256);
    /// assert_eq!(codec.max_line_length(), 256);
    /// ```
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            max_line_length,
            next_index: 0,
        }
    }

    /// Get the current maximum line length.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

impl Default for PjLinkCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for PjLinkCodec {
    type Item = String;
    type Error = Error;

    /// Extract the next complete line from the buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(line))` - a complete line, terminator removed
    /// - `Ok(None)` - need more data
    /// - `Err(Error::LineTooLong)` - the line exceeds the maximum length
    ///
    /// Invalid UTF-8 is replaced rather than rejected; such a line can never
    /// form a valid command and is answered like any other garbage.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let offset = src[self.next_index..]
            .iter()
            .position(|b| *b == LINE_TERMINATOR);

        match offset {
            Some(offset) => {
                let end = self.next_index + offset;
                self.next_index = 0;

                if end > self.max_line_length {
                    return Err(Error::LineTooLong {
                        length: end,
                        max_length: self.max_line_length,
                    });
                }

                let line = src.split_to(end + 1);
                let line = String::from_utf8_lossy(&line[..end]).into_owned();
                Ok(Some(line))
            }
            None if src.len() > self.max_line_length => Err(Error::LineTooLong {
                length: src.len(),
                max_length: self.max_line_length,
            }),
            None => {
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        if !src.is_empty() {
            trace!(bytes = src.len(), "Discarding unterminated input at end of stream");
            src.clear();
        }
        self.next_index = 0;
        Ok(None)
    }
}

impl Encoder<ServerMessage> for PjLinkCodec {
    type Error = Error;

    fn encode(&mut self, item: ServerMessage, dst: &mut BytesMut) -> Result<()> {
        match item {
            ServerMessage::Greeting => dst.put_slice(GREETING.as_bytes()),
            ServerMessage::Reply(response) => response.write_to(dst),
            ServerMessage::Prompt => dst.put_slice(PROMPT.as_bytes()),
            ServerMessage::BarePrompt => dst.put_slice(BARE_PROMPT.as_bytes()),
        }
        Ok(())
    }
}
