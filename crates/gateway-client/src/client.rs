//! Gateway client
//!
//! [`GatewayClient`] is a cheap handle over shared session state. Clones are
//! handed to event handlers and close callbacks so they can send or close.

use crate::auth::{CredentialExchange, Credentials, MfaCodeProvider};
use crate::error::{ClientError, ClientResult};
use crate::events::{event_name_from_label, EventDispatcher, EventHandler, GatewayEventType};
use crate::protocol::{GatewayMessage, OpCode, OutboundMessage, Presence, NORMAL_CLOSE};
use crate::session::{
    self, ActiveConnection, HeartbeatScheduler, IdentitySnapshot, Outbound, SessionIdentity,
    SessionState,
};
use crate::transport::{Connector, FrameStream, TransportResult, WsConnector};
use futures::future::{BoxFuture, FutureExt};
use gateway_common::{AppConfig, GatewayConfig};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Async close callback
pub type AsyncCloseFn = Arc<dyn Fn(GatewayClient) -> BoxFuture<'static, ()> + Send + Sync>;

/// Callback run once when the session shuts down
#[derive(Clone)]
pub enum CloseCallback {
    Blocking(Arc<dyn Fn() + Send + Sync>),
    Async(AsyncCloseFn),
}

impl std::fmt::Debug for CloseCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocking(_) => f.write_str("CloseCallback::Blocking"),
            Self::Async(_) => f.write_str("CloseCallback::Async"),
        }
    }
}

/// State shared by every handle to one client
pub(crate) struct ClientShared {
    pub(crate) token: String,
    pub(crate) config: GatewayConfig,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) identity: Arc<SessionIdentity>,
    pub(crate) state: RwLock<SessionState>,
    pub(crate) connection: Mutex<Option<ActiveConnection>>,
    pub(crate) heartbeat: HeartbeatScheduler,
    pub(crate) events: EventDispatcher,
    pub(crate) close_callbacks: Mutex<Vec<CloseCallback>>,
    pub(crate) raw_callback: RwLock<Option<EventHandler>>,
    /// Set by the first `connect`
    pub(crate) started: AtomicBool,
    /// Set once shutdown begins; never cleared
    pub(crate) closing: AtomicBool,
    /// Flips to `true` when shutdown has completed
    pub(crate) shutdown: watch::Sender<bool>,
}

/// Handle to a gateway session
#[derive(Clone)]
pub struct GatewayClient {
    shared: Arc<ClientShared>,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("state", &self.state())
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Client over the WebSocket transport
    #[must_use]
    pub fn new(token: impl Into<String>, config: GatewayConfig) -> Self {
        let connector = Arc::new(WsConnector::new(config.max_message_size));
        Self::with_connector(token, config, connector)
    }

    /// Client over a caller-supplied transport
    #[must_use]
    pub fn with_connector(
        token: impl Into<String>,
        config: GatewayConfig,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);

        let client = Self {
            shared: Arc::new(ClientShared {
                token: token.into(),
                config,
                connector,
                identity: Arc::new(SessionIdentity::new()),
                state: RwLock::new(SessionState::Disconnected),
                connection: Mutex::new(None),
                heartbeat: HeartbeatScheduler::new(),
                events: EventDispatcher::new(),
                close_callbacks: Mutex::new(Vec::new()),
                raw_callback: RwLock::new(None),
                started: AtomicBool::new(false),
                closing: AtomicBool::new(false),
                shutdown,
            }),
        };

        client.on_close_async(|client| async move {
            if let Err(e) = client.change_presence(Presence::offline()).await {
                tracing::debug!(error = %e, "Offline presence not sent");
            }
        });

        client
    }

    /// Resolve credentials from `config` and build a WebSocket client
    ///
    /// Fails only when no credentials are configured at all. A rejected login
    /// yields a client holding an empty token.
    pub async fn from_config(
        config: &AppConfig,
        mfa: &dyn MfaCodeProvider,
    ) -> ClientResult<Self> {
        let credentials = Credentials::from_config(&config.credentials)?;
        let token = credentials.resolve(&CredentialExchange::new(), mfa).await;
        Ok(Self::new(token, config.gateway.clone()))
    }

    pub(crate) fn shared(&self) -> &ClientShared {
        &self.shared
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.shared.token
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.shared.state.read()
    }

    #[must_use]
    pub fn identity(&self) -> IdentitySnapshot {
        self.shared.identity.snapshot()
    }

    /// Whether a transport connection is open
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared.connection.lock().is_some()
    }

    /// Whether the handshake has completed (READY or RESUMED seen)
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Ready
    }

    #[must_use]
    pub fn is_heartbeat_running(&self) -> bool {
        self.shared.heartbeat.is_running()
    }

    pub(crate) fn is_closing(&self) -> bool {
        self.shared.closing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_state(&self, next: SessionState) {
        let previous = std::mem::replace(&mut *self.shared.state.write(), next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "Session state changed");
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Subscribe to a dispatch event by name, case-insensitively
    pub fn subscribe<F, Fut>(&self, event_name: &str, handler: F)
    where
        F: Fn(GatewayClient, GatewayMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: EventHandler = Arc::new(move |client: GatewayClient, message: GatewayMessage| {
            handler(client, message).boxed()
        });
        self.shared.events.subscribe(event_name, handler);
    }

    /// Subscribe to a well-known event
    pub fn subscribe_event<F, Fut>(&self, event: GatewayEventType, handler: F)
    where
        F: Fn(GatewayClient, GatewayMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.subscribe(&event.subscription_key(), handler);
    }

    /// Subscribe using a handler label such as `on_message_create`
    pub fn on<F, Fut>(&self, label: &str, handler: F)
    where
        F: Fn(GatewayClient, GatewayMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.subscribe(event_name_from_label(label), handler);
    }

    /// Number of handlers subscribed to `event_name`
    #[must_use]
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.shared.events.subscriber_count(event_name)
    }

    /// Register a synchronous close callback
    pub fn on_close<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared
            .close_callbacks
            .lock()
            .push(CloseCallback::Blocking(Arc::new(callback)));
    }

    /// Register an async close callback; it receives a handle to this client
    pub fn on_close_async<F, Fut>(&self, callback: F)
    where
        F: Fn(GatewayClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: AsyncCloseFn = Arc::new(move |client: GatewayClient| callback(client).boxed());
        self.shared
            .close_callbacks
            .lock()
            .push(CloseCallback::Async(callback));
    }

    /// Set the callback for frames with no built-in handler, replacing any previous one
    pub fn set_event_callback<F, Fut>(&self, callback: F)
    where
        F: Fn(GatewayClient, GatewayMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: EventHandler = Arc::new(move |client: GatewayClient, message: GatewayMessage| {
            callback(client, message).boxed()
        });
        *self.shared.raw_callback.write() = Some(callback);
    }

    pub(crate) async fn forward_raw(&self, message: GatewayMessage) {
        let callback = self.shared.raw_callback.read().clone();
        match callback {
            Some(callback) => callback(self.clone(), message).await,
            None => tracing::debug!(op = %message.op, "No handler for frame, dropping"),
        }
    }

    // ------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------

    /// Send `{"op": op, "d": body}`
    pub async fn send(&self, op: OpCode, body: Value) -> ClientResult<()> {
        self.send_message(&OutboundMessage::new(op, body)).await
    }

    /// Send a presence update (op 3)
    pub async fn change_presence(&self, presence: Presence) -> ClientResult<()> {
        if !presence.is_valid_status() {
            tracing::warn!(status = %presence.status, "Unrecognised presence status");
        }
        self.send_message(&OutboundMessage::presence(presence)).await
    }

    pub(crate) async fn send_message<T: Serialize>(
        &self,
        message: &OutboundMessage<T>,
    ) -> ClientResult<()> {
        let text = message.to_json()?;
        let outbound = self.outbound()?;
        tracing::trace!(op = %message.op, "Sending frame");
        outbound
            .send(Outbound::Text(text))
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    /// Sender for the current connection's writer
    pub(crate) fn outbound(&self) -> ClientResult<mpsc::Sender<Outbound>> {
        self.shared
            .connection
            .lock()
            .as_ref()
            .map(|active| active.outbound.clone())
            .ok_or(ClientError::NotConnected)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Open the first connection and start the session in the background
    ///
    /// Errors only if that first connection cannot be opened; later
    /// disconnects are handled internally.
    pub async fn connect(&self) -> ClientResult<()> {
        if self.is_closing() {
            return Err(ClientError::ShutDown);
        }
        if self.shared.started.swap(true, Ordering::SeqCst) {
            return Err(ClientError::AlreadyConnected);
        }

        match self.open_transport().await {
            Ok(stream) => {
                tokio::spawn(session::run(self.clone(), stream));
                Ok(())
            }
            Err(e) => {
                self.set_state(SessionState::Disconnected);
                self.shared.started.store(false, Ordering::SeqCst);
                Err(e.into())
            }
        }
    }

    /// Open a transport to the resume URL if held, else the configured URL
    pub(crate) async fn open_transport(&self) -> TransportResult<Box<dyn FrameStream>> {
        self.set_state(SessionState::Connecting);

        let resume_url = self.shared.identity.resume_url();
        let resuming = resume_url.is_some();
        let url = resume_url.unwrap_or_else(|| self.shared.config.url.clone());
        tracing::info!(url = %url, resuming, "Connecting to gateway");

        let (sink, stream) = self.shared.connector.connect(&url).await?;

        let previous = self
            .shared
            .connection
            .lock()
            .replace(ActiveConnection::spawn(sink));
        if let Some(previous) = previous {
            tracing::warn!("Replacing a connection that was never torn down");
            previous.writer.abort();
        }

        self.set_state(SessionState::AwaitingHello);
        Ok(stream)
    }

    /// Stop the heartbeat and close the current connection with `code`
    pub(crate) async fn teardown(&self, code: u16) {
        self.shared.heartbeat.stop();
        let active = self.shared.connection.lock().take();
        if let Some(active) = active {
            active.shutdown(code).await;
        }
    }

    /// Fixed reconnect delay; `false` if shutdown began while waiting
    pub(crate) async fn backoff(&self) -> bool {
        let mut shutdown = self.shared.shutdown.subscribe();
        let delay = self.shared.config.reconnect_delay();
        tracing::debug!(delay_ms = delay.as_millis(), "Backing off");

        tokio::select! {
            () = tokio::time::sleep(delay) => !self.is_closing(),
            _ = shutdown.wait_for(|done| *done) => false,
        }
    }

    /// Close the session
    ///
    /// Runs every close callback in registration order, stops the heartbeat, and
    /// closes the transport with a normal close. Calls after the first are no-ops.
    pub async fn close(&self) {
        if self.shared.closing.swap(true, Ordering::SeqCst) {
            tracing::debug!("Close requested, already shutting down");
            return;
        }

        tracing::info!("Closing gateway session");
        self.set_state(SessionState::Closing);
        self.run_close_callbacks().await;
        self.teardown(NORMAL_CLOSE).await;
        self.finish_shutdown();
    }

    /// Shutdown after the server ended the session
    pub(crate) async fn shutdown_after_disconnect(&self) {
        if self.shared.closing.swap(true, Ordering::SeqCst) {
            return;
        }

        self.set_state(SessionState::Closing);
        self.run_close_callbacks().await;
        self.finish_shutdown();
    }

    async fn run_close_callbacks(&self) {
        let callbacks = self.shared.close_callbacks.lock().clone();
        tracing::debug!(count = callbacks.len(), "Running close callbacks");

        for callback in callbacks {
            match callback {
                CloseCallback::Blocking(callback) => callback(),
                CloseCallback::Async(callback) => callback(self.clone()).await,
            }
        }
    }

    fn finish_shutdown(&self) {
        self.set_state(SessionState::Disconnected);
        self.shared.shutdown.send_replace(true);
        tracing::info!("Gateway session closed");
    }

    /// Wait until the session has shut down
    pub async fn wait_closed(&self) {
        let mut shutdown = self.shared.shutdown.subscribe();
        let _ = shutdown.wait_for(|done| *done).await;
    }

    /// Whether shutdown has completed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.shared.shutdown.borrow()
    }
}
