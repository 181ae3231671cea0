//! The `utils` module holds the pieces shared by every other module:
//! the crate error types and logging initialization.

pub mod error;
pub mod logging;

pub use error::{Error, ProtocolError, Result};

#[cfg(test)]
mod tests {
    use super::error::{Error, ProtocolError};
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic
        logging::init("info");
        logging::init("debug");
        logging::init("warn");
        logging::init("nonsense");
    }

    #[test]
    fn logging_level_names() {
        use tracing::Level;

        assert_eq!(logging::parse_level("debug"), Level::DEBUG);
        assert_eq!(logging::parse_level(" WARN "), Level::WARN);
        assert_eq!(logging::parse_level("5"), Level::TRACE);
        assert_eq!(logging::parse_level("warning"), Level::INFO);
        assert_eq!(logging::parse_level(""), Level::INFO);
    }

    #[test]
    fn protocol_error_converts_into_crate_error() {
        let err: Error = ProtocolError::UnknownTag(0x07).into();
        assert!(matches!(err, Error::Protocol(ProtocolError::UnknownTag(0x07))));
        assert_eq!(
            err.to_string(),
            "protocol violation: unknown control frame tag 0x07"
        );
    }
}
