//! Single-request convenience layer for JSON HTTP APIs.
//!
//! # Overview
//! A [`Resource`] describes one call: endpoint, method, extra headers,
//! optional body and the codecs to use. [`RequestExecutor`] turns it into an
//! [`HttpRequest`], hands that to an injected [`Transport`], checks the status
//! code against the method's accepted set and decodes the body. Every failure
//! comes back as one [`NetworkError`] variant.
//!
//! # Design
//! - The executor is stateless apart from its transport; calls never share
//!   mutable state.
//! - Accepted status codes per verb live in one table on [`HttpMethod`].
//! - Codecs travel with the resource, so per-call overrides need no globals.
//! - [`ReqwestTransport`] is the production transport; `MockTransport`
//!   (feature `mock`) replays canned replies in tests.
//! - No retries, caching or pooling policy live here.

pub mod codec;
pub mod error;
pub mod executor;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod resource;
pub mod transport;

pub use codec::{
    CodecError, Decoder, Encoder, JsonDecoder, JsonEncoder, KeyDecodingStrategy,
    KeyEncodingStrategy, OutputFormatting,
};
pub use error::{ErrorKind, NetworkError};
pub use executor::RequestExecutor;
pub use http::{Endpoint, EndpointError, HttpMethod, HttpRequest, HttpResponse};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
pub use resource::Resource;
pub use transport::{Transport, TransportError};
#[cfg(feature = "reqwest")]
pub use transport::{ReqwestTransport, ReqwestTransportBuilder};
