use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unrecognized command: {0}")]
    UnrecognizedCommand(String),

    #[error("Line too long: {length} bytes (max {max_length})")]
    LineTooLong { length: usize, max_length: usize },

    // Device errors
    #[error("Invalid {parameter}: {value}")]
    InvalidParameter { parameter: String, value: String },

    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for errors that must end the session they occur on.
    ///
    /// Everything else is answered on the wire and the session continues.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::LineTooLong { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors() {
        let too_long = Error::LineTooLong {
            length: 2048,
            max_length: 1024,
        };
        assert!(too_long.is_fatal());
        assert!(Error::Io(std::io::Error::other("reset")).is_fatal());

        assert!(!Error::MalformedInput("HELLO".into()).is_fatal());
        assert!(!Error::ResourceUnavailable("lamp".into()).is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidParameter {
            parameter: "input source".into(),
            value: "99".into(),
        };
        assert_eq!(err.to_string(), "Invalid input source: 99");
    }
}
