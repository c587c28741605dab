//! Command mnemonics understood by the emulator.
//!
//! Every PJLink command is identified by a four-letter mnemonic that follows
//! the class header:
//!
//! ```text
//! %1INPT 31
//!   ^^^^ mnemonic
//! ```
//!
//! # Supported Commands
//!
//! | Mnemonic | Query | Write        | Meaning             |
//! |----------|-------|--------------|---------------------|
//! | `POWR`   | yes   | `0` / `1`    | Power state         |
//! | `NAME`   | yes   | no           | Device name         |
//! | `LAMP`   | yes   | no           | Remaining lamp hours|
//! | `INPT`   | yes   | input code   | Active input source |
//! | `CLSS`   | yes   | no           | Protocol class      |
//!
//! # Usage Examples
//!
//! ```
//! use pjlink_protocol::Mnemonic;
//!
//! let cmd = Mnemonic::parse("POWR").unwrap();
//! assert_eq!(cmd, Mnemonic::Power);
//! assert_eq!(cmd.as_str(), "POWR");
//! assert!(cmd.accepts_write());
//!
//! assert!(Mnemonic::parse("AVMT").is_err());
//! ```

use std::fmt;

use pjlink_core::{Error, Result};

/// Four-letter PJLink command mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Power, // POWR
    Name,  // NAME
    Lamp,  // LAMP
    Input, // INPT
    Class, // CLSS
}

impl Mnemonic {
    /// Parse a mnemonic. Matching is case-sensitive.
    ///
    /// # Errors
    /// Returns `Error::UnrecognizedCommand` for any other text.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "POWR" => Ok(Mnemonic::Power),
            "NAME" => Ok(Mnemonic::Name),
            "LAMP" => Ok(Mnemonic::Lamp),
            "INPT" => Ok(Mnemonic::Input),
            "CLSS" => Ok(Mnemonic::Class),
            _ => Err(Error::UnrecognizedCommand(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mnemonic::Power => "POWR",
            Mnemonic::Name => "NAME",
            Mnemonic::Lamp => "LAMP",
            Mnemonic::Input => "INPT",
            Mnemonic::Class => "CLSS",
        }
    }

    /// Returns `true` if the mnemonic accepts a write value.
    ///
    /// Every supported mnemonic can be queried; only `POWR` and `INPT` can be
    /// written.
    #[inline]
    pub fn accepts_write(&self) -> bool {
        matches!(self, Mnemonic::Power | Mnemonic::Input)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
