//! Gateway client integration tests
//!
//! Drive the real WebSocket transport against an in-process fake gateway.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gateway_client::auth::{CredentialExchange, Credentials, NoMfa, StaticMfaCode};
use gateway_client::{GatewayClient, SessionState};
use integration_tests::{
    FakeAuthApi, FakeGateway, Route, ServerEvent, EVENT_TIMEOUT, MFA_CODE, MFA_EMAIL, MFA_TOKEN,
    PASSWORD, PLAIN_EMAIL, PLAIN_TOKEN, SESSION_ID, TEST_TOKEN,
};
use tokio::sync::mpsc;

async fn wait_for_state(client: &GatewayClient, state: SessionState) {
    tokio::time::timeout(EVENT_TIMEOUT, async {
        while client.state() != state {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("client never reached {state}, stuck in {}", client.state()));
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_identify_ready_and_dispatch() {
    let mut gateway = FakeGateway::start(None).await.expect("Failed to start gateway");
    let client = GatewayClient::new(TEST_TOKEN, gateway.client_config());

    let (tx, mut messages) = mpsc::unbounded_channel();
    client.on("on_message_create", move |_client, message| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(message);
        }
    });

    client.connect().await.expect("connect failed");
    assert_eq!(gateway.next_event().await.unwrap(), ServerEvent::Connected(Route::Gateway));

    let (route, identify) = gateway.expect_op(2).await.unwrap();
    assert_eq!(route, Route::Gateway);
    assert_eq!(identify["d"]["token"], TEST_TOKEN);
    assert_eq!(identify["d"]["properties"]["browser"], "Discord Client");

    let message = tokio::time::timeout(EVENT_TIMEOUT, messages.recv())
        .await
        .expect("no MESSAGE_CREATE delivered")
        .unwrap();
    assert_eq!(message.s, Some(2));
    assert_eq!(message.d["content"], "hi");

    wait_for_state(&client, SessionState::Ready).await;
    let identity = client.identity();
    assert_eq!(identity.session_id, SESSION_ID);
    assert_eq!(
        identity.resume_url,
        format!("ws://{}/resume/?v=10&encoding=json", gateway.addr)
    );
    assert_eq!(identity.last_sequence, 2);

    client.close().await;

    let (_, presence) = gateway.expect_op(3).await.unwrap();
    assert_eq!(presence["d"]["status"], "offline");
    let (_, code) = gateway.expect_client_close().await.unwrap();
    assert_eq!(code, Some(1000));
    assert!(client.is_closed());
}

#[tokio::test]
async fn test_resumable_close_resumes_on_resume_url() {
    let mut gateway = FakeGateway::start(Some(4000)).await.expect("Failed to start gateway");
    let client = GatewayClient::new(TEST_TOKEN, gateway.client_config());

    client.connect().await.expect("connect failed");
    gateway.expect_op(2).await.unwrap();

    let (route, resume) = gateway.expect_op(6).await.unwrap();
    assert_eq!(route, Route::Resume);
    assert_eq!(resume["d"]["token"], TEST_TOKEN);
    assert_eq!(resume["d"]["session_id"], SESSION_ID);
    assert_eq!(resume["d"]["seq"], 2);

    wait_for_state(&client, SessionState::Ready).await;
    assert_eq!(client.identity().last_sequence, 3);

    client.close().await;
}

#[tokio::test]
async fn test_terminal_close_runs_callbacks_and_stops() {
    let mut gateway = FakeGateway::start(Some(4004)).await.expect("Failed to start gateway");
    let client = GatewayClient::new(TEST_TOKEN, gateway.client_config());

    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = calls.clone();
        client.on_close(move || {
            calls.fetch_add(1, Ordering::SeqCst);
        });
    }

    client.connect().await.expect("connect failed");
    gateway.expect_op(2).await.unwrap();

    tokio::time::timeout(EVENT_TIMEOUT, client.wait_closed())
        .await
        .expect("client did not shut down");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.state(), SessionState::Disconnected);

    // No resume attempt follows
    loop {
        match tokio::time::timeout(Duration::from_millis(300), gateway.next_event()).await {
            Err(_) | Ok(Err(_)) => break,
            Ok(Ok(ServerEvent::Connected(route))) => panic!("unexpected reconnect to {route:?}"),
            Ok(Ok(_)) => {}
        }
    }

    client.close().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connect_failure_is_reported() {
    let config = gateway_common::GatewayConfig::default().with_url("ws://127.0.0.1:9/gateway");
    let client = GatewayClient::new(TEST_TOKEN, config);

    assert!(client.connect().await.is_err());
    assert_eq!(client.state(), SessionState::Disconnected);
    assert!(!client.is_ready());
}

// ============================================================================
// Credential Exchange Tests
// ============================================================================

#[tokio::test]
async fn test_login_returns_token() {
    let api = FakeAuthApi::start().await.expect("Failed to start API");
    let exchange = CredentialExchange::with_base_url(api.base_url());

    let token = exchange.login(PLAIN_EMAIL, PASSWORD, &NoMfa).await.unwrap();
    assert_eq!(token, PLAIN_TOKEN);
}

#[tokio::test]
async fn test_login_with_mfa() {
    let api = FakeAuthApi::start().await.expect("Failed to start API");
    let exchange = CredentialExchange::with_base_url(api.base_url());

    let token = exchange
        .login(MFA_EMAIL, PASSWORD, &StaticMfaCode(MFA_CODE.to_string()))
        .await
        .unwrap();
    assert_eq!(token, MFA_TOKEN);
}

#[tokio::test]
async fn test_rejected_login_resolves_to_empty_token() {
    let api = FakeAuthApi::start().await.expect("Failed to start API");
    let exchange = CredentialExchange::with_base_url(api.base_url());

    let cases = [
        (PLAIN_EMAIL, "wrong-password", StaticMfaCode(MFA_CODE.to_string())),
        (MFA_EMAIL, PASSWORD, StaticMfaCode("000000".to_string())),
    ];
    for (email, password, mfa) in cases {
        let credentials = Credentials::Login {
            email: email.to_string(),
            password: password.to_string(),
        };
        assert_eq!(credentials.resolve(&exchange, &mfa).await, "");
    }

    let without_code = Credentials::Login {
        email: MFA_EMAIL.to_string(),
        password: PASSWORD.to_string(),
    };
    assert_eq!(without_code.resolve(&exchange, &NoMfa).await, "");
}
