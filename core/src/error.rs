//! Error taxonomy for `RequestExecutor` calls.
//!
//! # Design
//! The set is closed: every failure inside the executor is mapped onto one
//! of these variants before it is returned. Equality compares kinds only,
//! except for `Transport`, where two errors are equal when they wrap the very
//! same cause. Attached payloads (codec messages, status codes) are there
//! for diagnostics and do not take part in equality.

use std::sync::Arc;

use thiserror::Error;

use crate::codec::CodecError;
use crate::http::{EndpointError, HttpMethod};
use crate::transport::TransportError;

/// Discriminant of [`NetworkError`], for branching without matching payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUrl,
    Encoding,
    Decoding,
    BadRequest,
    ServerResponse,
    Transport,
}

/// Errors returned by `RequestExecutor` entry points.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    /// The endpoint string is not a usable URL.
    #[error("The endpoint provided was invalid.")]
    InvalidUrl {
        endpoint: String,
        #[source]
        reason: EndpointError,
    },

    /// The typed payload could not be serialized.
    #[error("The request payload could not be encoded.")]
    Encoding(#[source] Arc<CodecError>),

    /// The response body did not parse as the expected type.
    #[error("The response could not be decoded.")]
    Decoding(#[source] Arc<CodecError>),

    /// The ad-hoc PATCH field map could not be serialized to JSON.
    #[error("The request fields could not be serialized to JSON.")]
    BadRequest(#[source] Arc<serde_json::Error>),

    /// The status code is outside the method's accepted set.
    #[error("The server responded with an unexpected status.")]
    ServerResponse { method: HttpMethod, status: u16 },

    /// No response was obtained.
    #[error("The request failed: {0}")]
    Transport(#[source] Arc<TransportError>),
}

impl NetworkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NetworkError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            NetworkError::Encoding(_) => ErrorKind::Encoding,
            NetworkError::Decoding(_) => ErrorKind::Decoding,
            NetworkError::BadRequest(_) => ErrorKind::BadRequest,
            NetworkError::ServerResponse { .. } => ErrorKind::ServerResponse,
            NetworkError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// The wrapped transport failure, if any.
    pub fn transport_cause(&self) -> Option<&TransportError> {
        match self {
            NetworkError::Transport(cause) => Some(cause),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.transport_cause()
            .is_some_and(TransportError::is_cancelled)
    }

    pub(crate) fn invalid_url(endpoint: &str, reason: EndpointError) -> Self {
        NetworkError::InvalidUrl {
            endpoint: endpoint.to_string(),
            reason,
        }
    }

    pub(crate) fn encoding(err: CodecError) -> Self {
        NetworkError::Encoding(Arc::new(err))
    }

    pub(crate) fn decoding(err: CodecError) -> Self {
        NetworkError::Decoding(Arc::new(err))
    }

    pub(crate) fn bad_request(err: serde_json::Error) -> Self {
        NetworkError::BadRequest(Arc::new(err))
    }
}

impl From<TransportError> for NetworkError {
    fn from(err: TransportError) -> Self {
        NetworkError::Transport(Arc::new(err))
    }
}

impl PartialEq for NetworkError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NetworkError::Transport(a), NetworkError::Transport(b)) => Arc::ptr_eq(a, b),
            _ => self.kind() == other.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn server_response(status: u16) -> NetworkError {
        NetworkError::ServerResponse {
            method: HttpMethod::Get,
            status,
        }
    }

    #[test]
    fn display_is_human_readable() {
        let err = NetworkError::invalid_url("", EndpointError::Empty);
        assert_eq!(err.to_string(), "The endpoint provided was invalid.");
        assert_eq!(
            server_response(500).to_string(),
            "The server responded with an unexpected status."
        );
    }

    #[test]
    fn equality_is_by_kind() {
        assert_eq!(server_response(404), server_response(500));
        assert_ne!(
            server_response(404),
            NetworkError::decoding(CodecError::Custom("x".to_string()))
        );
        assert_eq!(
            NetworkError::decoding(CodecError::Custom("a".to_string())),
            NetworkError::decoding(CodecError::Custom("b".to_string()))
        );
    }

    #[test]
    fn transport_equality_is_by_cause_identity() {
        let err = NetworkError::from(TransportError::timeout("slow"));
        let same = err.clone();
        let lookalike = NetworkError::from(TransportError::timeout("slow"));
        assert_eq!(err, same);
        assert_ne!(err, lookalike);
    }

    #[test]
    fn transport_display_includes_cause() {
        let err = NetworkError::from(TransportError::connect("connection refused"));
        assert_eq!(
            err.to_string(),
            "The request failed: could not connect: connection refused"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn kind_and_cancellation_helpers() {
        let err = NetworkError::from(TransportError::Cancelled);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.is_cancelled());
        assert!(!server_response(500).is_cancelled());
        assert!(server_response(500).transport_cause().is_none());
    }
}
