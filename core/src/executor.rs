//! Turns a `Resource` into one HTTP round-trip and a typed result.
//!
//! # Design
//! `RequestExecutor` holds only its transport and carries no state between
//! calls. Every entry point runs the same pipeline, and each stage
//! short-circuits the rest:
//!
//! 1. endpoint validation (`InvalidUrl`)
//! 2. payload encoding (`Encoding`, or `BadRequest` for PATCH field maps)
//! 3. transport dispatch, the only await point (`Transport`)
//! 4. status check against the method's accepted set (`ServerResponse`)
//! 5. body decoding (`Decoding`)
//!
//! POST and PUT encode a typed payload with the resource's encoder. PATCH
//! takes a loose field map and serializes it with plain `serde_json`, never
//! the resource's encoder. DELETE hands back the raw body without decoding.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::codec::{ensure_finite, CodecError, Decoder, Encoder};
use crate::error::NetworkError;
use crate::http::{Endpoint, HttpRequest, CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::resource::Resource;
use crate::transport::{Transport, TransportError};

/// Executes resources against an injected [`Transport`].
#[derive(Debug, Clone)]
pub struct RequestExecutor<T> {
    transport: T,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send the resource without a payload and decode the response as `R`.
    pub async fn fetch<R: DeserializeOwned>(&self, resource: &Resource) -> Result<R, NetworkError> {
        let endpoint = parse_endpoint(resource)?;
        let body = self
            .make_request(resource, endpoint, resource.body().cloned())
            .await?;
        decode_data(&body, resource.decoder())
    }

    /// Encode `payload` with the resource's encoder, send it, and decode the
    /// response as `R`.
    pub async fn post<P, R>(&self, resource: &Resource, payload: &P) -> Result<R, NetworkError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_typed(resource, payload).await
    }

    /// Same pipeline as [`post`](Self::post); the verb and accepted statuses
    /// come from the resource.
    pub async fn put<P, R>(&self, resource: &Resource, payload: &P) -> Result<R, NetworkError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_typed(resource, payload).await
    }

    /// Send a sparse JSON object built from `fields` and decode the response
    /// as `R`.
    ///
    /// The resource's encoder is not used here. A map that cannot be
    /// serialized, or that holds a NaN or infinite float, fails with
    /// `BadRequest` before anything is sent.
    pub async fn patch<V, R>(
        &self,
        resource: &Resource,
        fields: &HashMap<String, V>,
    ) -> Result<R, NetworkError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let endpoint = parse_endpoint(resource)?;
        ensure_finite(fields).map_err(NetworkError::bad_request)?;
        let body = serde_json::to_vec(fields).map_err(NetworkError::bad_request)?;
        let response = self
            .make_request(resource, endpoint, Some(Bytes::from(body)))
            .await?;
        decode_data(&response, resource.decoder())
    }

    /// Send the resource and return the raw, possibly empty, response body.
    pub async fn delete(&self, resource: &Resource) -> Result<Bytes, NetworkError> {
        let endpoint = parse_endpoint(resource)?;
        self.make_request(resource, endpoint, resource.body().cloned())
            .await
    }

    async fn send_typed<P, R>(&self, resource: &Resource, payload: &P) -> Result<R, NetworkError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let endpoint = parse_endpoint(resource)?;
        let body = encode_data(payload, resource.encoder())?;
        let response = self
            .make_request(resource, endpoint, Some(Bytes::from(body)))
            .await?;
        decode_data(&response, resource.decoder())
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(method = %resource.method(), endpoint = %resource.endpoint())
    )]
    async fn make_request(
        &self,
        resource: &Resource,
        endpoint: Endpoint,
        body: Option<Bytes>,
    ) -> Result<Bytes, NetworkError> {
        let method = resource.method();
        let request = HttpRequest {
            method,
            url: endpoint,
            headers: merge_headers(resource.headers()),
            body,
        };
        debug!(
            body_len = request.body.as_ref().map_or(0, Bytes::len),
            "dispatching request"
        );

        let response = match resource.cancellation() {
            Some(token) if token.is_cancelled() => Err(TransportError::Cancelled),
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(TransportError::Cancelled),
                    result = self.transport.perform(request) => result,
                }
            }
            None => self.transport.perform(request).await,
        };

        let response = response.map_err(|err| {
            warn!(error = %err, "transport failed");
            NetworkError::from(err)
        })?;

        if !method.accepts(response.status) {
            warn!(
                status = response.status,
                accepted = ?method.accepted_statuses(),
                "unexpected status"
            );
            return Err(NetworkError::ServerResponse {
                method,
                status: response.status,
            });
        }

        debug!(
            status = response.status,
            body_len = response.body.len(),
            "request completed"
        );
        Ok(response.body)
    }
}

fn parse_endpoint(resource: &Resource) -> Result<Endpoint, NetworkError> {
    Endpoint::parse(resource.endpoint())
        .map_err(|reason| NetworkError::invalid_url(resource.endpoint(), reason))
}

/// Default content type first, then resource headers; a resource header
/// with the same name (ignoring case) replaces the default.
fn merge_headers(extra: Option<&[(String, String)]>) -> Vec<(String, String)> {
    let mut headers = vec![(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string())];
    for (name, value) in extra.unwrap_or_default() {
        match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(slot) => *slot = (name.clone(), value.clone()),
            None => headers.push((name.clone(), value.clone())),
        }
    }
    headers
}

fn encode_data<P: Serialize + ?Sized>(
    payload: &P,
    encoder: &dyn Encoder,
) -> Result<Vec<u8>, NetworkError> {
    ensure_finite(payload).map_err(|e| NetworkError::encoding(CodecError::Json(e)))?;
    let value = serde_json::to_value(payload)
        .map_err(|e| NetworkError::encoding(CodecError::Json(e)))?;
    encoder.encode(value).map_err(NetworkError::encoding)
}

fn decode_data<R: DeserializeOwned>(bytes: &[u8], decoder: &dyn Decoder) -> Result<R, NetworkError> {
    let value = decoder.decode(bytes).map_err(NetworkError::decoding)?;
    serde_json::from_value(value).map_err(|e| NetworkError::decoding(CodecError::Json(e)))
}
