//! HTTP transport types for the executor/transport boundary.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! executor builds `HttpRequest` values and consumes `HttpResponse` values;
//! whatever implements [`Transport`](crate::transport::Transport) performs
//! the actual I/O. Keeping the wire shape as data lets tests inspect exactly
//! what would have been sent.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// Default content type attached to every request.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Header name for the default content type.
pub const CONTENT_TYPE: &str = "Content-Type";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Wire verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Status codes treated as success for this verb.
    pub fn accepted_statuses(&self) -> &'static [u16] {
        match self {
            HttpMethod::Get => &[200],
            HttpMethod::Post => &[200, 201],
            HttpMethod::Put => &[200, 204],
            HttpMethod::Patch => &[200, 204],
            HttpMethod::Delete => &[200, 202, 204],
        }
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.accepted_statuses().contains(&status)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the five supported verbs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Why an endpoint string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("endpoint is empty")]
    Empty,
    #[error("endpoint contains whitespace or control characters")]
    IllegalCharacter,
    #[error("endpoint is not a valid URL: {0}")]
    Parse(#[from] url::ParseError),
}

/// A validated request target.
///
/// Relative references such as `users/1` are kept as written; resolving them
/// against a base URL is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Absolute(Url),
    Relative(String),
}

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        if raw.is_empty() {
            return Err(EndpointError::Empty);
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(EndpointError::IllegalCharacter);
        }
        match Url::parse(raw) {
            Ok(url) => Ok(Endpoint::Absolute(url)),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                // Any well-formed relative reference resolves against a
                // hierarchical base; malformed ones still fail here.
                let scratch_base = Url::parse("http://relative.invalid/")?;
                scratch_base.join(raw)?;
                Ok(Endpoint::Relative(raw.to_string()))
            }
            Err(e) => Err(EndpointError::Parse(e)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Endpoint::Absolute(url) => url.as_str(),
            Endpoint::Relative(path) => path,
        }
    }

    /// Resolve against `base`, leaving absolute endpoints untouched.
    pub fn resolve(&self, base: Option<&Url>) -> Result<Url, EndpointError> {
        match (self, base) {
            (Endpoint::Absolute(url), _) => Ok(url.clone()),
            (Endpoint::Relative(path), Some(base)) => Ok(base.join(path)?),
            (Endpoint::Relative(_), None) => Err(EndpointError::Parse(
                url::ParseError::RelativeUrlWithoutBase,
            )),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `RequestExecutor` from a [`Resource`](crate::Resource). Headers
/// are already merged: the default content type plus any resource headers.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Endpoint,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
