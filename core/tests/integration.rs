//! Full user lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every executor
//! entry point over real HTTP through `ReqwestTransport`. Relative endpoints
//! resolve against the transport's base URL.

use std::collections::HashMap;

use jsonwire_core::{ErrorKind, RequestExecutor, ReqwestTransport, Resource};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

async fn start_server() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

async fn executor() -> RequestExecutor<ReqwestTransport> {
    let base = start_server().await;
    let transport = ReqwestTransport::builder()
        .base_url(base)
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap();
    RequestExecutor::new(transport)
}

#[tokio::test]
async fn user_lifecycle() {
    let exec = executor().await;

    // Step 1: list — should be empty.
    let users: Vec<User> = exec.fetch(&Resource::get("users")).await.unwrap();
    assert!(users.is_empty(), "expected empty list");

    // Step 2: create.
    let ada = User {
        id: 1,
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    };
    let created: User = exec.post(&Resource::post("users"), &ada).await.unwrap();
    assert_eq!(created, ada);

    // Step 3: creating again conflicts.
    let err = exec
        .post::<_, User>(&Resource::post("users"), &ada)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerResponse);

    // Step 4: fetch.
    let fetched: User = exec.fetch(&Resource::get("users/1")).await.unwrap();
    assert_eq!(fetched, ada);

    // Step 5: patch only the email.
    let fields = HashMap::from([("email".to_string(), "ada@lovelace.dev")]);
    let patched: User = exec
        .patch(&Resource::patch("users/1"), &fields)
        .await
        .unwrap();
    assert_eq!(patched.name, "Ada");
    assert_eq!(patched.email, "ada@lovelace.dev");

    // Step 6: replace.
    let renamed = User {
        name: "Ada Lovelace".to_string(),
        ..patched
    };
    let replaced: User = exec
        .put(&Resource::put("users/1"), &renamed)
        .await
        .unwrap();
    assert_eq!(replaced, renamed);

    // Step 7: delete returns an empty body on 204.
    let body = exec.delete(&Resource::delete("users/1")).await.unwrap();
    assert!(body.is_empty());

    // Step 8: fetch after delete — 404.
    let err = exec
        .fetch::<User>(&Resource::get("users/1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerResponse);

    // Step 9: delete again — 404.
    let err = exec.delete(&Resource::delete("users/1")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerResponse);
}

#[tokio::test]
async fn echo_round_trips_post_payload() {
    let exec = executor().await;
    let user = User {
        id: 2,
        name: "test".to_string(),
        email: "test@gmail.com".to_string(),
    };
    let echoed: User = exec.post(&Resource::post("echo"), &user).await.unwrap();
    assert_eq!(echoed, user);
}

#[tokio::test]
async fn delete_accepts_202_with_body() {
    let exec = executor().await;
    let body = exec
        .delete(&Resource::delete("status/202"))
        .await
        .unwrap();
    assert_eq!(&body[..], br#"{"status":202}"#);
}

#[tokio::test]
async fn get_rejects_204() {
    let exec = executor().await;
    let err = exec
        .fetch::<serde_json::Value>(&Resource::get("status/204"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerResponse);
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let exec = RequestExecutor::new(ReqwestTransport::new().unwrap());
    let err = exec
        .fetch::<User>(&Resource::get(format!("http://{addr}/users")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
