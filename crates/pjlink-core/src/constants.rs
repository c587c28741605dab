//! Core constants for the PJLink emulator.
//!
//! This module defines the protocol-level constants shared by the codec, the
//! device model and the network layer.
//!
//! # Protocol Structure
//!
//! A PJLink class 1 request looks like:
//!
//! ```text
//! %1POWR ?<CR>
//! ^^      Header: sentinel + class digit
//!   ^^^^  Mnemonic (4 letters)
//!       ^ Separator
//!        ^ Payload: `?` for a query, a value for a write
//! ```
//!
//! Replies reuse the header and mnemonic:
//!
//! ```text
//! %1POWR=0<CR>     query answer
//! %1POWR=OK        write acknowledged
//! %1LAMP=ERR1      lamp not available
//! Invalid Command  anything else
//! ```
//!
//! Every reply is followed by the prompt marker `\n>`.
//!
//! # Usage
//!
//! ```
//! use pjlink_core::constants::*;
//!
//! assert_eq!(DEFAULT_PORT, 4352);
//! assert_eq!(LINE_TERMINATOR, b'\r');
//! assert_eq!(GREETING, "PJLINK 0\r");
//! ```

use std::time::Duration;

// ============================================================================
// Protocol Framing
// ============================================================================

/// Line terminator for both directions (carriage return).
pub const LINE_TERMINATOR: u8 = b'\r';

/// First byte of every command line.
pub const COMMAND_SENTINEL: char = '%';

/// Class 1 command header (sentinel + class digit).
pub const CLASS1_HEADER: &str = "%1";

/// Separates the mnemonic from the payload.
pub const PAYLOAD_SEPARATOR: char = ' ';

/// Payload that turns a command into a query.
pub const QUERY_PAYLOAD: &str = "?";

/// Separates the command from the value in a reply.
pub const REPLY_SEPARATOR: char = '=';

/// Length of a command mnemonic (`POWR`, `INPT`, ...).
pub const MNEMONIC_LENGTH: usize = 4;

/// Greeting sent on connect: protocol version 0, no authentication.
pub const GREETING: &str = "PJLINK 0\r";

/// Marker appended after every reply.
pub const PROMPT: &str = "\n>";

/// Sent alone when the client sends a blank line, right before closing.
pub const BARE_PROMPT: &str = ">";

/// Payload that ends the session without a reply.
pub const EXIT_COMMAND: &str = "exit";

// ============================================================================
// Reply Literals
// ============================================================================

/// Acknowledgement value for a successful write.
pub const REPLY_OK: &str = "OK";

/// Error value used when the unit has no lamp.
pub const REPLY_ERR1: &str = "ERR1";

/// Generic failure reply for malformed or unrecognized input.
pub const INVALID_COMMAND: &str = "Invalid Command";

// ============================================================================
// Network
// ============================================================================

/// Default PJLink TCP port.
pub const DEFAULT_PORT: u16 = 4352;

/// Default bind address for the emulator.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4352";

/// Maximum accepted line length in bytes (terminator excluded).
///
/// Real PJLink requests never exceed 136 bytes. Longer input is treated as
/// a transport fault and closes the session.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Pause after a failed accept before trying again.
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

// ============================================================================
// Input Sources
// ============================================================================

/// Lowest valid input family digit (RGB).
pub const MIN_INPUT_FAMILY: u8 = 1;

/// Highest valid input family digit (NETWORK).
pub const MAX_INPUT_FAMILY: u8 = 5;

/// Lowest valid position within a family.
pub const MIN_INPUT_POSITION: u8 = 1;

/// Highest valid position within a family.
pub const MAX_INPUT_POSITION: u8 = 9;

/// Input selected on a freshly created device (DIGITAL 1, usually HDMI 1).
pub const DEFAULT_INPUT: u8 = 31;

// ============================================================================
// Device Presets
// ============================================================================

/// Rated lamp life of the projector preset, in hours.
pub const PROJECTOR_LAMP_HOURS: u32 = 30_000;

/// Warm-up delay of the projector preset.
pub const PROJECTOR_WARMUP: Duration = Duration::from_secs(6);

/// Cool-down delay of the projector preset.
pub const PROJECTOR_COOLDOWN: Duration = Duration::from_secs(12);

/// Name prefix of the projector preset.
pub const PROJECTOR_NAME_PREFIX: &str = "Projector Emulator";

/// Name prefix of the display preset.
pub const DISPLAY_NAME_PREFIX: &str = "Display Emulator";

/// Upper bound (inclusive) of the random suffix appended to generated names.
pub const MAX_NAME_SUFFIX: u32 = 998;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_is_terminated() {
        assert_eq!(GREETING.as_bytes().last(), Some(&LINE_TERMINATOR));
    }

    #[test]
    fn test_default_bind_addr_uses_default_port() {
        assert!(DEFAULT_BIND_ADDR.ends_with(&format!(":{DEFAULT_PORT}")));
    }

    #[test]
    fn test_class1_header_starts_with_sentinel() {
        assert!(CLASS1_HEADER.starts_with(COMMAND_SENTINEL));
    }

    #[test]
    fn test_default_input_is_digital_one() {
        assert_eq!(DEFAULT_INPUT / 10, 3);
        assert_eq!(DEFAULT_INPUT % 10, 1);
    }
}
