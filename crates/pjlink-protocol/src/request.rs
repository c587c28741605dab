//! PJLink request parser.
//!
//! Converts one inbound protocol line into a structured [`Request`].
//!
//! # Request Format
//!
//! ```text
//! %1<MNEMONIC> <PAYLOAD>
//! ```
//!
//! Where:
//! - `%1`: Class 1 header (the `%` sentinel is mandatory)
//! - `MNEMONIC`: Four-letter command (`POWR`, `NAME`, `LAMP`, `INPT`, `CLSS`)
//! - `PAYLOAD`: `?` for a query, a value for a write
//!
//! # Failure Classes
//!
//! - [`Error::MalformedInput`]: the line does not start with `%`, or a write
//!   payload does not parse as the expected type.
//! - [`Error::UnrecognizedCommand`]: unknown header or mnemonic, missing
//!   separator, a write against a query-only mnemonic, or a `POWR` value
//!   other than `0`/`1`.
//!
//! Both are answered with the same generic reply on the wire.
//!
//! # Examples
//!
//! ```
//! use pjlink_protocol::{Mnemonic, Request};
//!
//! assert_eq!(Request::parse("%1POWR ?\r").unwrap(), Request::Query(Mnemonic::Power));
//! assert_eq!(Request::parse("%1POWR 1").unwrap(), Request::PowerOn);
//! assert_eq!(Request::parse("%1INPT 32").unwrap(), Request::SetInput(32));
//!
//! assert!(Request::parse("POWR ?").is_err());
//! assert!(Request::parse("%1NAME Lobby").is_err());
//! ```

use crate::Mnemonic;
use pjlink_core::{
    Error, Result,
    constants::{
        CLASS1_HEADER, COMMAND_SENTINEL, LINE_TERMINATOR, MNEMONIC_LENGTH, PAYLOAD_SEPARATOR,
        QUERY_PAYLOAD,
    },
};

/// A parsed PJLink request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// `%1<MNEMONIC> ?`
    Query(Mnemonic),
    /// `%1POWR 1`
    PowerOn,
    /// `%1POWR 0`
    PowerOff,
    /// `%1INPT <code>`; the code is range-checked by the device, not here.
    SetInput(i64),
}

impl Request {
    /// Parse a single request line.
    ///
    /// A single trailing `\r` is stripped if present. No other trimming takes
    /// place: `%1POWR  ?` (two spaces) is not a valid query.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedInput` or `Error::UnrecognizedCommand` as
    /// described in the module documentation.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line
            .strip_suffix(char::from(LINE_TERMINATOR))
            .unwrap_or(line);

        if !line.starts_with(COMMAND_SENTINEL) {
            return Err(Error::MalformedInput(format!(
                "missing '{COMMAND_SENTINEL}' sentinel: {line:?}"
            )));
        }

        let unrecognized = || Error::UnrecognizedCommand(line.to_string());

        let body = line.strip_prefix(CLASS1_HEADER).ok_or_else(unrecognized)?;
        let mnemonic = body.get(..MNEMONIC_LENGTH).ok_or_else(unrecognized)?;
        let mnemonic = Mnemonic::parse(mnemonic)?;
        let payload = body[MNEMONIC_LENGTH..]
            .strip_prefix(PAYLOAD_SEPARATOR)
            .ok_or_else(unrecognized)?;

        if payload == QUERY_PAYLOAD {
            return Ok(Request::Query(mnemonic));
        }
        if !mnemonic.accepts_write() {
            return Err(unrecognized());
        }

        match mnemonic {
            Mnemonic::Power => match payload {
                "0" => Ok(Request::PowerOff),
                "1" => Ok(Request::PowerOn),
                _ => Err(unrecognized()),
            },
            Mnemonic::Input => payload.parse::<i64>().map(Request::SetInput).map_err(|e| {
                Error::MalformedInput(format!("input code {payload:?} is not a number: {e}"))
            }),
            Mnemonic::Name | Mnemonic::Lamp | Mnemonic::Class => Err(unrecognized()),
        }
    }

    /// The mnemonic this request addresses.
    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            Request::Query(mnemonic) => *mnemonic,
            Request::PowerOn | Request::PowerOff => Mnemonic::Power,
            Request::SetInput(_) => Mnemonic::Input,
        }
    }

    /// Returns `true` if the request changes device state.
    pub fn is_write(&self) -> bool {
        !matches!(self, Request::Query(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("%1POWR ?", Request::Query(Mnemonic::Power))]
    #[case("%1POWR ?\r", Request::Query(Mnemonic::Power))]
    #[case("%1NAME ?", Request::Query(Mnemonic::Name))]
    #[case("%1LAMP ?", Request::Query(Mnemonic::Lamp))]
    #[case("%1INPT ?", Request::Query(Mnemonic::Input))]
    #[case("%1CLSS ?", Request::Query(Mnemonic::Class))]
    #[case("%1POWR 1", Request::PowerOn)]
    #[case("%1POWR 0\r", Request::PowerOff)]
    #[case("%1INPT 31", Request::SetInput(31))]
    #[case("%1INPT 99", Request::SetInput(99))]
    #[case("%1INPT -5", Request::SetInput(-5))]
    fn test_parse_valid(#[case] line: &str, #[case] expected: Request) {
        assert_eq!(Request::parse(line).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("POWR ?")]
    #[case("exit")]
    #[case(" %1POWR ?")]
    #[case("%1INPT abc")]
    #[case("%1INPT ")]
    #[case("%1INPT 3.5")]
    fn test_parse_malformed(#[case] line: &str) {
        assert!(matches!(
            Request::parse(line),
            Err(Error::MalformedInput(_))
        ));
    }

    #[rstest]
    #[case("%")]
    #[case("%1")]
    #[case("%1PO")]
    #[case("%2POWR ?")] // class 2 header
    #[case("%1AVMT ?")]
    #[case("%1powr ?")]
    #[case("%1POWR")] // no separator
    #[case("%1POWR  ?")] // double space
    #[case("%1POWR 2")]
    #[case("%1POWR on")]
    #[case("%1NAME Lobby")]
    #[case("%1LAMP 100")]
    #[case("%1CLSS 2")]
    #[case("%1POWR?")]
    #[case("%1é")] // multi-byte, no char boundary at 4
    fn test_parse_unrecognized(#[case] line: &str) {
        assert!(matches!(
            Request::parse(line),
            Err(Error::UnrecognizedCommand(_))
        ));
    }

    #[test]
    fn test_mnemonic_of_request() {
        assert_eq!(Request::PowerOn.mnemonic(), Mnemonic::Power);
        assert_eq!(Request::PowerOff.mnemonic(), Mnemonic::Power);
        assert_eq!(Request::SetInput(11).mnemonic(), Mnemonic::Input);
        assert_eq!(Request::Query(Mnemonic::Lamp).mnemonic(), Mnemonic::Lamp);
    }

    #[test]
    fn test_is_write() {
        assert!(Request::PowerOn.is_write());
        assert!(Request::SetInput(11).is_write());
        assert!(!Request::Query(Mnemonic::Power).is_write());
    }
}
