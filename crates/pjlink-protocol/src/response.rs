//! Reply formatting.
//!
//! A [`Response`] is the structured outcome of one request; its `Display`
//! implementation produces the exact wire text (without the trailing prompt,
//! which the session appends).
//!
//! | Outcome              | Wire text                |
//! |----------------------|--------------------------|
//! | Query answered       | `%1POWR=1\r`             |
//! | Write acknowledged   | `%1POWR=OK`              |
//! | Lamp not available   | `%1LAMP=ERR1`            |
//! | Anything else        | `Invalid Command`        |
//!
//! Only query answers carry the `\r` terminator.

use std::fmt;

use bytes::{BufMut, BytesMut};
use pjlink_core::{
    Error,
    constants::{
        CLASS1_HEADER, INVALID_COMMAND, LINE_TERMINATOR, REPLY_ERR1, REPLY_OK, REPLY_SEPARATOR,
    },
};

use crate::Mnemonic;

/// Structured reply to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Successful query with its value.
    Value { mnemonic: Mnemonic, value: String },
    /// Successful write.
    Ok(Mnemonic),
    /// The addressed resource does not exist on this unit (no lamp).
    Err1(Mnemonic),
    /// Malformed, unrecognized or rejected request.
    InvalidCommand,
}

impl Response {
    /// Build a query answer from anything displayable.
    ///
    /// ```
    /// use pjlink_protocol::{Mnemonic, Response};
    ///
    /// let reply = Response::value(Mnemonic::Power, 1);
    /// assert_eq!(reply.to_string(), "%1POWR=1\r");
    /// ```
    pub fn value(mnemonic: Mnemonic, value: impl fmt::Display) -> Self {
        Response::Value {
            mnemonic,
            value: value.to_string(),
        }
    }

    /// Map a failed request to its reply.
    ///
    /// Only `ResourceUnavailable` has its own wire form (`ERR1`); parse
    /// failures and rejected parameters all collapse to `Invalid Command`.
    pub fn from_error(mnemonic: Option<Mnemonic>, error: &Error) -> Self {
        match (mnemonic, error) {
            (Some(mnemonic), Error::ResourceUnavailable(_)) => Response::Err1(mnemonic),
            _ => Response::InvalidCommand,
        }
    }

    /// Returns `true` unless this is the generic failure reply.
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Value { .. } | Response::Ok(_))
    }

    /// Append the wire form of this reply to `dst`.
    pub fn write_to(&self, dst: &mut BytesMut) {
        match self {
            Response::Value { mnemonic, value } => {
                put_command(dst, *mnemonic);
                dst.put_slice(value.as_bytes());
                dst.put_u8(LINE_TERMINATOR);
            }
            Response::Ok(mnemonic) => {
                put_command(dst, *mnemonic);
                dst.put_slice(REPLY_OK.as_bytes());
            }
            Response::Err1(mnemonic) => {
                put_command(dst, *mnemonic);
                dst.put_slice(REPLY_ERR1.as_bytes());
            }
            Response::InvalidCommand => dst.put_slice(INVALID_COMMAND.as_bytes()),
        }
    }
}

fn put_command(dst: &mut BytesMut, mnemonic: Mnemonic) {
    dst.put_slice(CLASS1_HEADER.as_bytes());
    dst.put_slice(mnemonic.as_str().as_bytes());
    dst.put_u8(REPLY_SEPARATOR as u8);
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = BytesMut::new();
        self.write_to(&mut buf);
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_reply_format() {
        let reply = Response::value(Mnemonic::Power, 0);
        assert_eq!(reply.to_string(), "%1POWR=0\r");
    }

    #[test]
    fn test_name_reply_keeps_spaces() {
        let reply = Response::value(Mnemonic::Name, "Projector Emulator 42");
        assert_eq!(reply.to_string(), "%1NAME=Projector Emulator 42\r");
    }

    #[test]
    fn test_write_reply_format() {
        assert_eq!(Response::Ok(Mnemonic::Input).to_string(), "%1INPT=OK");
    }

    #[test]
    fn test_err1_reply_format() {
        assert_eq!(Response::Err1(Mnemonic::Lamp).to_string(), "%1LAMP=ERR1");
    }

    #[test]
    fn test_invalid_command_format() {
        assert_eq!(Response::InvalidCommand.to_string(), "Invalid Command");
    }

    #[test]
    fn test_from_error_lamp_unavailable() {
        let err = Error::ResourceUnavailable("no lamp".to_string());
        assert_eq!(
            Response::from_error(Some(Mnemonic::Lamp), &err),
            Response::Err1(Mnemonic::Lamp)
        );
    }

    #[test]
    fn test_from_error_collapses_to_invalid_command() {
        let errors = [
            Error::MalformedInput("x".to_string()),
            Error::UnrecognizedCommand("x".to_string()),
            Error::InvalidParameter {
                parameter: "input source".to_string(),
                value: "99".to_string(),
            },
        ];
        for err in &errors {
            assert_eq!(
                Response::from_error(Some(Mnemonic::Input), err),
                Response::InvalidCommand
            );
        }

        // Without a mnemonic there is nothing to attach ERR1 to
        let err = Error::ResourceUnavailable("no lamp".to_string());
        assert_eq!(Response::from_error(None, &err), Response::InvalidCommand);
    }

    #[test]
    fn test_same_value_formats_identically() {
        let a = Response::value(Mnemonic::Input, 31);
        let b = Response::value(Mnemonic::Input, 31);
        assert_eq!(a.to_string().as_bytes(), b.to_string().as_bytes());
    }

    #[test]
    fn test_is_success() {
        assert!(Response::Ok(Mnemonic::Power).is_success());
        assert!(Response::value(Mnemonic::Class, 2).is_success());
        assert!(!Response::Err1(Mnemonic::Lamp).is_success());
        assert!(!Response::InvalidCommand.is_success());
    }
}
