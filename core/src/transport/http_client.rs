//! `Transport` backed by `reqwest`.
//!
//! Dropping the future returned by `perform` drops the in-flight reqwest
//! request, which is how cancellation reaches the socket.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{Transport, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Production transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Wrap an already-configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }
}

/// Configuration for [`ReqwestTransport`].
#[derive(Debug, Default, Clone)]
pub struct ReqwestTransportBuilder {
    base_url: Option<Url>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ReqwestTransportBuilder {
    /// Base against which relative endpoints are resolved.
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(map_error)?;
        Ok(ReqwestTransport {
            client,
            base_url: self.base_url,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn map_error(err: reqwest::Error) -> TransportError {
    let message = err.to_string();
    if err.is_timeout() {
        TransportError::Timeout {
            message,
            source: Some(Box::new(err)),
        }
    } else if err.is_connect() {
        TransportError::Connect {
            message,
            source: Some(Box::new(err)),
        }
    } else if err.is_builder() {
        TransportError::InvalidRequest { message }
    } else {
        TransportError::Other {
            message,
            source: Some(Box::new(err)),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request
            .url
            .resolve(self.base_url.as_ref())
            .map_err(|e| TransportError::InvalidRequest {
                message: format!("{}: {e}", request.url),
            })?;

        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await.map_err(map_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Endpoint;

    #[test]
    fn builder_keeps_base_url() {
        let base = Url::parse("http://localhost:3000/").unwrap();
        let transport = ReqwestTransport::builder()
            .base_url(base.clone())
            .timeout(Duration::from_secs(5))
            .user_agent("jsonwire-test")
            .build()
            .unwrap();
        assert_eq!(transport.base_url(), Some(&base));
    }

    #[tokio::test]
    async fn relative_endpoint_without_base_is_invalid_request() {
        let transport = ReqwestTransport::new().unwrap();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: Endpoint::parse("users").unwrap(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.perform(request).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_connect() {
        // Bind then drop to get a port that nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new().unwrap();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: Endpoint::parse(&format!("http://{addr}/users")).unwrap(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.perform(request).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }), "{err:?}");
    }
}
