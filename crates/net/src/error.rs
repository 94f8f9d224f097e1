//! Gateway error types

use std::io;
use std::time::Duration;

use crate::protocol::RemoteErrorKind;

/// Gateway result type
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Handshake rejected: {0}")]
    Rejected(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The platform answered the request with an error
    #[error("Platform error ({kind:?}): {message}")]
    Remote {
        kind: RemoteErrorKind,
        message: String,
    },
}

impl From<Error> for jtc_core::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Remote {
                kind: RemoteErrorKind::NotFound,
                message,
            } => jtc_core::Error::NotFound(message),
            other => jtc_core::Error::PlatformUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_not_found_maps_to_core_not_found() {
        let err: jtc_core::Error = Error::Remote {
            kind: RemoteErrorKind::NotFound,
            message: "room 1".into(),
        }
        .into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_transport_errors_map_to_unavailable() {
        let err: jtc_core::Error = Error::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(err, jtc_core::Error::PlatformUnavailable(_)));

        let err: jtc_core::Error = Error::Remote {
            kind: RemoteErrorKind::Forbidden,
            message: "missing permission".into(),
        }
        .into();
        assert!(matches!(err, jtc_core::Error::PlatformUnavailable(_)));
    }
}
