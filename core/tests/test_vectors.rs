//! Verify status policy and decoding against JSON test vectors in `test-vectors/`.
//!
//! Each case names a method, a simulated response and the expected outcome
//! (`ok`, `server_response` or `decoding`). The same table drives every
//! entry point so a change to one verb's accepted statuses shows up here.

use std::collections::HashMap;
use std::sync::Arc;

use jsonwire_core::{
    ErrorKind, HttpMethod, MockTransport, NetworkError, RequestExecutor, Resource,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

fn payload() -> User {
    User {
        id: 1,
        name: "Test User".to_string(),
        email: "test@gmail.com".to_string(),
    }
}

/// Run one call through the entry point matching `method`, collapsing the
/// typed result to `()` so all verbs compare the same way.
async fn run(
    exec: &RequestExecutor<Arc<MockTransport>>,
    method: HttpMethod,
) -> Result<(), NetworkError> {
    let resource = Resource::new("users/1", method);
    match method {
        HttpMethod::Get => exec.fetch::<User>(&resource).await.map(drop),
        HttpMethod::Post => exec.post::<_, User>(&resource, &payload()).await.map(drop),
        HttpMethod::Put => exec.put::<_, User>(&resource, &payload()).await.map(drop),
        HttpMethod::Patch => {
            let fields = HashMap::from([("name".to_string(), "Test User")]);
            exec.patch::<_, User>(&resource, &fields).await.map(drop)
        }
        HttpMethod::Delete => exec.delete(&resource).await.map(drop),
    }
}

fn parse_kind(s: &str) -> Option<ErrorKind> {
    match s {
        "ok" => None,
        "server_response" => Some(ErrorKind::ServerResponse),
        "decoding" => Some(ErrorKind::Decoding),
        other => panic!("unknown expectation: {other}"),
    }
}

#[tokio::test]
async fn status_test_vectors() {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method: HttpMethod = case["method"].as_str().unwrap().parse().unwrap();
        let sim = &case["simulated_response"];
        let status = sim["status"].as_u64().unwrap() as u16;
        let body = sim["body"].as_str().unwrap().to_string();

        let mock = Arc::new(MockTransport::new().respond(status, body));
        let exec = RequestExecutor::new(Arc::clone(&mock));
        let result = run(&exec, method).await;

        match parse_kind(case["expected"].as_str().unwrap()) {
            None => assert!(result.is_ok(), "{name}: expected success, got {result:?}"),
            Some(kind) => {
                let err = result.unwrap_err();
                assert_eq!(err.kind(), kind, "{name}: error kind");
                if let NetworkError::ServerResponse { method: m, status: s } = err {
                    assert_eq!(m, method, "{name}: method");
                    assert_eq!(s, status, "{name}: status");
                }
            }
        }

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.method, method, "{name}: wire method");
        assert_eq!(sent.header("Content-Type"), Some("application/json"), "{name}: content type");
    }
}

#[test]
fn vectors_agree_with_method_table() {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method: HttpMethod = case["method"].as_str().unwrap().parse().unwrap();
        let status = case["simulated_response"]["status"].as_u64().unwrap() as u16;
        let expected = case["expected"].as_str().unwrap();
        assert_eq!(
            method.accepts(status),
            expected != "server_response",
            "{name}: table disagrees with vector"
        );
    }
}
