//! In-memory `Transport` for tests.
//!
//! # Design
//! `MockTransport` never touches the network. It replays one configured
//! reply for every request and records what it was asked to send, so tests
//! can assert both on the executor's result and on the wire request (or on
//! the absence of one). With no reply configured it answers `404` and an
//! empty body, like a server with nothing routed at that path.

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};

type FailWith = Box<dyn Fn() -> TransportError + Send + Sync>;

enum Reply {
    Unconfigured,
    Respond(HttpResponse),
    Echo(u16),
    Fail(FailWith),
    Pending,
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Unconfigured => f.write_str("Unconfigured"),
            Reply::Respond(r) => f.debug_tuple("Respond").field(&r.status).finish(),
            Reply::Echo(status) => f.debug_tuple("Echo").field(status).finish(),
            Reply::Fail(_) => f.write_str("Fail"),
            Reply::Pending => f.write_str("Pending"),
        }
    }
}

#[derive(Debug)]
pub struct MockTransport {
    reply: Mutex<Reply>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            reply: Mutex::new(Reply::Unconfigured),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `status` and `body` to every request.
    pub fn respond(self, status: u16, body: impl Into<Bytes>) -> Self {
        self.set(Reply::Respond(HttpResponse::new(status, body)))
    }

    /// Reply with `status` and `value` serialized as JSON.
    pub fn respond_json<T: Serialize>(self, status: u16, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        self.respond(status, body)
    }

    /// Reply with `status` and whatever body the request carried.
    pub fn echo(self, status: u16) -> Self {
        self.set(Reply::Echo(status))
    }

    /// Fail every request with the error built by `make`.
    pub fn fail(self, make: impl Fn() -> TransportError + Send + Sync + 'static) -> Self {
        self.set(Reply::Fail(Box::new(make)))
    }

    /// Never complete, for exercising cancellation.
    pub fn pending(self) -> Self {
        self.set(Reply::Pending)
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }

    fn set(self, reply: Reply) -> Self {
        if let Ok(mut slot) = self.reply.lock() {
            *slot = reply;
        }
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = request.body.clone().unwrap_or_default();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let outcome = {
            let reply = self
                .reply
                .lock()
                .map_err(|_| TransportError::other("mock transport lock poisoned"))?;
            match &*reply {
                Reply::Unconfigured => Some(Ok(HttpResponse::new(404, Bytes::new()))),
                Reply::Respond(response) => Some(Ok(response.clone())),
                Reply::Echo(status) => Some(Ok(HttpResponse::new(*status, body))),
                Reply::Fail(make) => Some(Err(make())),
                Reply::Pending => None,
            }
        };

        match outcome {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}
