//! Test helpers for integration tests
//!
//! Spawns a fake gateway and a fake login API on ephemeral ports so the client
//! can be driven over real sockets.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gateway_common::GatewayConfig;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::fixtures::{
    self, LoginBody, MfaBody, MFA_CODE, MFA_EMAIL, MFA_TICKET, MFA_TOKEN, PASSWORD, PLAIN_EMAIL,
    PLAIN_TOKEN,
};

/// Default wait for anything the tests expect to happen
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Which endpoint a connection arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Gateway,
    Resume,
}

/// Something the fake gateway observed
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Connected(Route),
    Received { route: Route, frame: Value },
    ClientClosed { route: Route, code: Option<u16> },
}

#[derive(Clone)]
struct GatewayState {
    resume_base: String,
    drop_code: Option<u16>,
    events: mpsc::UnboundedSender<ServerEvent>,
}

/// In-process gateway speaking the JSON protocol over WebSocket
///
/// `/gateway` answers Identify with READY (s=1) and one MESSAGE_CREATE (s=2), then
/// closes with `drop_code` if one is set. `/resume/` answers Resume with RESUMED.
pub struct FakeGateway {
    pub addr: SocketAddr,
    events: mpsc::UnboundedReceiver<ServerEvent>,
    _handle: JoinHandle<()>,
}

impl FakeGateway {
    pub async fn start(drop_code: Option<u16>) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let (tx, events) = mpsc::unbounded_channel();

        let state = GatewayState {
            resume_base: format!("ws://{addr}/resume"),
            drop_code,
            events: tx,
        };

        let app = Router::new()
            .route("/gateway", get(gateway_upgrade))
            .route("/resume", get(resume_upgrade))
            .route("/resume/", get(resume_upgrade))
            .with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            events,
            _handle: handle,
        })
    }

    pub fn gateway_url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }

    /// Client config pointed at this gateway with a short reconnect delay
    pub fn client_config(&self) -> GatewayConfig {
        GatewayConfig::default()
            .with_url(self.gateway_url())
            .with_reconnect_delay_ms(50)
    }

    pub async fn next_event(&mut self) -> Result<ServerEvent> {
        tokio::time::timeout(EVENT_TIMEOUT, self.events.recv())
            .await
            .map_err(|_| anyhow!("timed out waiting for gateway event"))?
            .ok_or_else(|| anyhow!("gateway stopped"))
    }

    /// Next frame with opcode `op`, skipping everything else
    pub async fn expect_op(&mut self, op: i64) -> Result<(Route, Value)> {
        loop {
            if let ServerEvent::Received { route, frame } = self.next_event().await? {
                if frame["op"].as_i64() == Some(op) {
                    return Ok((route, frame));
                }
            }
        }
    }

    /// Next client-initiated close
    pub async fn expect_client_close(&mut self) -> Result<(Route, Option<u16>)> {
        loop {
            if let ServerEvent::ClientClosed { route, code } = self.next_event().await? {
                return Ok((route, code));
            }
        }
    }

    /// Whether any event arrives within `window`
    pub async fn quiet_for(&mut self, window: Duration) -> bool {
        tokio::time::timeout(window, self.events.recv()).await.is_err()
    }
}

async fn gateway_upgrade(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(move |socket| serve_connection(socket, state, Route::Gateway))
}

async fn resume_upgrade(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(move |socket| serve_connection(socket, state, Route::Resume))
}

async fn send_json(socket: &mut WebSocket, value: &Value) -> bool {
    socket.send(Message::Text(value.to_string())).await.is_ok()
}

async fn serve_connection(mut socket: WebSocket, state: GatewayState, route: Route) {
    let _ = state.events.send(ServerEvent::Connected(route));
    if !send_json(&mut socket, &fixtures::hello()).await {
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        let frame: Value = match msg {
            Message::Text(text) => match serde_json::from_str(&text) {
                Ok(frame) => frame,
                Err(_) => continue,
            },
            Message::Close(frame) => {
                let code = frame.map(|f| f.code);
                let _ = state.events.send(ServerEvent::ClientClosed { route, code });
                return;
            }
            _ => continue,
        };

        let op = frame["op"].as_i64();
        let seq = frame["d"]["seq"].as_u64();
        let _ = state.events.send(ServerEvent::Received {
            route,
            frame: frame.clone(),
        });

        match op {
            Some(1) => {
                send_json(&mut socket, &fixtures::heartbeat_ack()).await;
            }
            Some(2) => {
                send_json(&mut socket, &fixtures::ready(1, &state.resume_base)).await;
                send_json(&mut socket, &fixtures::message_create(2, "hi")).await;

                if let Some(code) = state.drop_code {
                    let close = CloseFrame {
                        code,
                        reason: "test drop".into(),
                    };
                    let _ = socket.send(Message::Close(Some(close))).await;
                    return;
                }
            }
            Some(6) => {
                send_json(&mut socket, &fixtures::resumed(seq.unwrap_or(0) + 1)).await;
            }
            _ => {}
        }
    }
}

/// In-process stand-in for the login API
pub struct FakeAuthApi {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl FakeAuthApi {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let app = Router::new()
            .route("/api/v9/auth/login", post(login))
            .route("/api/v9/auth/mfa/totp", post(mfa_totp));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    /// API root to hand to the credential exchange
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v9", self.addr)
    }
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    if body.password != PASSWORD {
        return (StatusCode::BAD_REQUEST, "invalid login").into_response();
    }
    match body.email.as_str() {
        PLAIN_EMAIL => Json(json!({"token": PLAIN_TOKEN})).into_response(),
        MFA_EMAIL => Json(json!({"token": null, "mfa": true, "ticket": MFA_TICKET})).into_response(),
        _ => (StatusCode::BAD_REQUEST, "unknown account").into_response(),
    }
}

async fn mfa_totp(Json(body): Json<MfaBody>) -> Response {
    if body.ticket == MFA_TICKET && body.code == MFA_CODE {
        Json(json!({"token": MFA_TOKEN})).into_response()
    } else {
        (StatusCode::BAD_REQUEST, "invalid code").into_response()
    }
}
