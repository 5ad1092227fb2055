//! The injectable capability that actually performs a request.
//!
//! # Design
//! `RequestExecutor` never talks to a socket. It hands a fully built
//! `HttpRequest` to a `Transport` and gets an `HttpResponse` back. Any status
//! code is a successful transport result; only failures to obtain a response
//! at all (DNS, refused connection, timeout, TLS, cancellation) are
//! `TransportError`s.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

#[cfg(feature = "reqwest")]
mod http_client;

#[cfg(feature = "reqwest")]
pub use http_client::{ReqwestTransport, ReqwestTransportBuilder};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure to obtain any response from the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect: {message}")]
    Connect {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("request timed out: {message}")]
    Timeout {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("request was cancelled")]
    Cancelled,

    #[error("request could not be built: {message}")]
    InvalidRequest { message: String },

    #[error("transport failure: {message}")]
    Other {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl TransportError {
    pub fn connect(message: impl Into<String>) -> Self {
        TransportError::Connect {
            message: message.into(),
            source: None,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        TransportError::Timeout {
            message: message.into(),
            source: None,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        TransportError::Other {
            message: message.into(),
            source: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

/// Performs one HTTP round-trip.
///
/// Implementations must be safe to share between concurrent calls; the
/// executor only ever calls `perform` through a shared reference.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).perform(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn constructors_pick_the_matching_variant() {
        assert!(matches!(
            TransportError::connect("refused"),
            TransportError::Connect { .. }
        ));
        assert!(matches!(
            TransportError::timeout("30s"),
            TransportError::Timeout { .. }
        ));
        assert!(TransportError::Cancelled.is_cancelled());
        assert!(!TransportError::other("x").is_cancelled());
    }

    #[test]
    fn display_includes_message() {
        assert_eq!(
            TransportError::connect("connection refused").to_string(),
            "could not connect: connection refused"
        );
    }

    #[test]
    fn source_is_exposed() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::Connect {
            message: "localhost".to_string(),
            source: Some(Box::new(io)),
        };
        assert!(err.source().is_some());
    }
}
