//! Declarative description of one HTTP call.
//!
//! # Design
//! A `Resource` is plain, immutable configuration. Building one does no I/O
//! and no validation; a malformed endpoint only surfaces when the resource
//! is dispatched, so descriptors can be assembled long before they are sent.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::codec::{Decoder, Encoder, JsonDecoder, JsonEncoder};
use crate::http::HttpMethod;

/// Everything the executor needs to perform one call.
#[derive(Clone)]
pub struct Resource {
    endpoint: String,
    method: HttpMethod,
    headers: Option<Vec<(String, String)>>,
    body: Option<Bytes>,
    encoder: Arc<dyn Encoder>,
    decoder: Arc<dyn Decoder>,
    cancellation: Option<CancellationToken>,
}

impl Resource {
    pub fn new(endpoint: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            headers: None,
            body: None,
            encoder: Arc::new(JsonEncoder::default()),
            decoder: Arc::new(JsonDecoder::default()),
            cancellation: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, HttpMethod::Get)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, HttpMethod::Post)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, HttpMethod::Put)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, HttpMethod::Patch)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, HttpMethod::Delete)
    }

    /// Add one header. A later header with the same name (ignoring case)
    /// replaces the earlier one.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let headers = self.headers.get_or_insert_with(Vec::new);
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        headers.push((name, value.into()));
        self
    }

    pub fn with_headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |resource, (k, v)| resource.with_header(k, v))
    }

    /// Pre-encoded body, sent by `fetch` and `delete`.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn with_decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Abort the call with a cancellation error when `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn headers(&self) -> Option<&[(String, String)]> {
        self.headers.as_deref()
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn encoder(&self) -> &dyn Encoder {
        self.encoder.as_ref()
    }

    pub fn decoder(&self) -> &dyn Decoder {
        self.decoder.as_ref()
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .field("encoder", &self.encoder)
            .field("decoder", &self.decoder)
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}
