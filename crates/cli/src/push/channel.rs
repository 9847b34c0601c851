// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Push channel connection management.
//!
//! A [`PushChannel`] owns one connection to the backend's event stream. It
//! runs in a background task so callers stay responsive while connecting,
//! and delivers decoded [`PushEvent`]s to the handlers registered with
//! [`PushChannel::on`], in the order the server sent them.
//!
//! ```text
//!                 open()
//! Disconnected ──────────► Connecting ──────────► Connected
//!      ▲                    │    ▲                    │
//!      │  attempts used up  │    │   unexpected drop  │
//!      └────────────────────┘    └────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use heyama_core::{EventKind, Handshake, Packet, PushEvent, SocketPacket};

use super::transport::{Inbound, Transport, TransportError, TransportResult, WebSocketTransport};

/// Callback invoked for every event of a subscribed kind.
pub type EventHandler = Arc<dyn Fn(&PushEvent) + Send + Sync>;

/// Identifies one registered handler so it can be removed on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Something that delivers push events to subscribers.
///
/// Implemented by [`PushChannel`] and by a bare [`HandlerRegistry`], which
/// lets the store be driven without a connection.
pub trait EventSource: Send + Sync {
    /// Register a handler for one kind of event.
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> HandlerId;

    /// Remove a single handler. Returns false if it was not registered.
    fn unsubscribe(&self, kind: EventKind, id: HandlerId) -> bool;
}

/// Handlers keyed by event kind.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<(HandlerId, EventHandler)>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a handler. Handlers of the same kind run in registration order.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&PushEvent) + Send + Sync + 'static,
    {
        self.subscribe(kind, Arc::new(handler))
    }

    /// Remove every handler of a kind.
    pub fn off(&self, kind: EventKind) {
        self.lock().handlers.remove(&kind);
    }

    /// Number of handlers registered for a kind.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.lock().handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event to every handler of its kind.
    ///
    /// Returns the number of handlers invoked. Handlers run outside the
    /// registry lock, so they may subscribe or unsubscribe.
    pub fn dispatch(&self, event: &PushEvent) -> usize {
        let handlers: Vec<EventHandler> = self
            .lock()
            .handlers
            .get(&event.kind())
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }
}

impl EventSource for HandlerRegistry {
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> HandlerId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = HandlerId(inner.next_id);
        inner.handlers.entry(kind).or_default().push((id, handler));
        id
    }

    fn unsubscribe(&self, kind: EventKind, id: HandlerId) -> bool {
        let mut inner = self.lock();
        let Some(list) = inner.handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(hid, _)| *hid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            inner.handlers.remove(&kind);
        }
        removed
    }
}

/// State of the push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected, and not trying to.
    Disconnected,
    /// Attempting to connect.
    Connecting,
    /// Connected and receiving events.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        write!(f, "{}", s)
    }
}

/// Configuration for the push channel.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Backend base URL (`http(s)://` or `ws(s)://`).
    pub url: String,
    /// Connection attempts before settling in `Disconnected`.
    pub reconnect_attempts: u32,
    /// Delay before the first reconnection attempt.
    pub reconnect_delay: Duration,
    /// Cap on the delay between attempts.
    pub reconnect_delay_max: Duration,
    /// Limit on one connect-and-handshake attempt.
    pub connect_timeout: Duration,
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            url: crate::config::DEFAULT_BASE_URL.to_string(),
            reconnect_attempts: 5,
            reconnect_delay: Duration::from_secs(1),
            reconnect_delay_max: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(20),
        }
    }
}

impl PushConfig {
    /// Creates a config for the given URL with default reconnection policy.
    pub fn new(url: impl Into<String>) -> Self {
        PushConfig {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Delay before the `n`th attempt of a reconnection cycle (1-based).
    ///
    /// Doubles from `reconnect_delay` and is capped at `reconnect_delay_max`:
    /// 1s, 2s, 4s, 5s, 5s with the defaults.
    pub fn backoff(&self, n: u32) -> Duration {
        let exponent = n.saturating_sub(1).min(31);
        let delay = self.reconnect_delay.saturating_mul(1u32 << exponent);
        delay.min(self.reconnect_delay_max)
    }
}

type TransportFactory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Push channel client.
///
/// Cheap to clone; clones share one connection and one handler registry.
/// The connection is closed when [`close`](Self::close) is called or the
/// last clone is dropped.
pub struct PushChannel<T: Transport = WebSocketTransport> {
    inner: Arc<ChannelInner<T>>,
}

impl<T: Transport> Clone for PushChannel<T> {
    fn clone(&self) -> Self {
        PushChannel {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ChannelInner<T: Transport> {
    shared: Arc<Shared<T>>,
    task: Mutex<Option<RunningTask>>,
}

/// State reachable from the background task.
struct Shared<T: Transport> {
    config: PushConfig,
    factory: TransportFactory<T>,
    handlers: HandlerRegistry,
    state: watch::Sender<ConnectionState>,
    attempt: AtomicU32,
}

struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<T: Transport> Drop for ChannelInner<T> {
    fn drop(&mut self) {
        let task = self.task.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = task.take() {
            task.cancel.cancel();
        }
    }
}

impl<T: Transport> Shared<T> {
    fn set_state(&self, state: ConnectionState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            tracing::debug!("push channel {}", state);
        }
    }
}

impl PushChannel<WebSocketTransport> {
    /// Create a channel backed by a WebSocket transport. Nothing connects
    /// until [`open`](Self::open) is called.
    pub fn new(config: PushConfig) -> Self {
        Self::with_transport_factory(config, WebSocketTransport::new)
    }
}

impl<T: Transport + 'static> PushChannel<T> {
    /// Create a channel with a custom transport (for testing).
    ///
    /// The factory is called once per connection attempt.
    pub fn with_transport_factory<F>(config: PushConfig, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        PushChannel {
            inner: Arc::new(ChannelInner {
                shared: Arc::new(Shared {
                    config,
                    factory: Box::new(factory),
                    handlers: HandlerRegistry::new(),
                    state,
                    attempt: AtomicU32::new(0),
                }),
                task: Mutex::new(None),
            }),
        }
    }

    fn task(&self) -> MutexGuard<'_, Option<RunningTask>> {
        self.inner.task.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start connecting in the background.
    ///
    /// Does nothing while a connection task is already running. After the
    /// channel has settled in `Disconnected` (attempts exhausted or
    /// closed), calling this starts over with a fresh attempt budget.
    pub fn open(&self) {
        let mut task = self.task();
        if let Some(running) = task.take() {
            let settled = self.state() == ConnectionState::Disconnected;
            if !running.handle.is_finished() && !settled {
                *task = Some(running);
                return;
            }
            running.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let shared = Arc::clone(&self.inner.shared);
        shared.set_state(ConnectionState::Connecting);
        let handle = tokio::spawn(run(shared, cancel.clone()));
        *task = Some(RunningTask { cancel, handle });
    }

    /// Close the connection and wait for the background task to finish.
    pub async fn close(&self) {
        let running = self.task().take();
        if let Some(running) = running {
            running.cancel.cancel();
            if let Err(e) = running.handle.await {
                tracing::warn!("push channel task ended abnormally: {}", e);
            }
        }
        self.inner.shared.set_state(ConnectionState::Disconnected);
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.shared.state.borrow()
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Current attempt number while connecting, 0 otherwise.
    pub fn attempt(&self) -> u32 {
        self.inner.shared.attempt.load(Ordering::Acquire)
    }

    /// Receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.shared.state.subscribe()
    }

    /// Register a handler for one kind of event.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&PushEvent) + Send + Sync + 'static,
    {
        self.inner.shared.handlers.on(kind, handler)
    }

    /// Remove every handler of a kind.
    pub fn off(&self, kind: EventKind) {
        self.inner.shared.handlers.off(kind);
    }

    /// Remove a single handler.
    pub fn remove(&self, kind: EventKind, id: HandlerId) -> bool {
        self.inner.shared.handlers.unsubscribe(kind, id)
    }

    /// The registry events are dispatched through.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.inner.shared.handlers
    }
}

impl<T: Transport + 'static> EventSource for PushChannel<T> {
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> HandlerId {
        self.inner.shared.handlers.subscribe(kind, handler)
    }

    fn unsubscribe(&self, kind: EventKind, id: HandlerId) -> bool {
        self.inner.shared.handlers.unsubscribe(kind, id)
    }
}

/// An established Socket.IO session.
struct Session<T> {
    transport: T,
    handshake: Handshake,
}

/// Why a session ended.
enum SessionEnd {
    /// Transport failure, close frame or missed heartbeat. Reconnect.
    Dropped(String),
    /// The server disconnected the socket on purpose. Do not reconnect.
    ServerDisconnect,
}

/// Background task: connect, pump events, reconnect on drops.
async fn run<T: Transport>(shared: Arc<Shared<T>>, cancel: CancellationToken) {
    let mut initial = true;

    loop {
        let Some(mut session) = connect_with_retry(&shared, &cancel, initial).await else {
            return;
        };
        initial = false;

        let end = tokio::select! {
            _ = cancel.cancelled() => None,
            end = pump(&shared, &mut session) => Some(end),
        };

        match end {
            None => {
                let _ = session.transport.send(Packet::Close).await;
                let _ = session.transport.disconnect().await;
                shared.set_state(ConnectionState::Disconnected);
                return;
            }
            Some(SessionEnd::ServerDisconnect) => {
                tracing::info!("push channel disconnected by server");
                let _ = session.transport.disconnect().await;
                shared.set_state(ConnectionState::Disconnected);
                return;
            }
            Some(SessionEnd::Dropped(reason)) => {
                tracing::warn!("push connection lost: {}", reason);
                let _ = session.transport.disconnect().await;
                shared.set_state(ConnectionState::Connecting);
            }
        }
    }
}

/// Connection attempts with exponential backoff.
///
/// The initial connection makes its first attempt immediately; a
/// reconnection waits before every attempt. Returns `None` when cancelled
/// or when the attempt budget is used up.
async fn connect_with_retry<T: Transport>(
    shared: &Shared<T>,
    cancel: &CancellationToken,
    initial: bool,
) -> Option<Session<T>> {
    let config = &shared.config;
    let max_attempts = config.reconnect_attempts.max(1);

    for attempt in 1..=max_attempts {
        shared.set_state(ConnectionState::Connecting);
        shared.attempt.store(attempt, Ordering::Release);

        let wait_index = if initial { attempt - 1 } else { attempt };
        if wait_index > 0 {
            let delay = config.backoff(wait_index);
            tokio::select! {
                _ = cancel.cancelled() => {
                    shared.set_state(ConnectionState::Disconnected);
                    return None;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let mut transport = (shared.factory)();
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                shared.set_state(ConnectionState::Disconnected);
                return None;
            }
            result = tokio::time::timeout(
                config.connect_timeout,
                handshake(&mut transport, &config.url),
            ) => result,
        };

        let error = match result {
            Ok(Ok(handshake)) => {
                shared.attempt.store(0, Ordering::Release);
                shared.set_state(ConnectionState::Connected);
                tracing::info!("push channel connected (sid {})", handshake.sid);
                return Some(Session {
                    transport,
                    handshake,
                });
            }
            Ok(Err(e)) => e,
            Err(_) => TransportError::Timeout(format!(
                "no handshake within {}ms",
                config.connect_timeout.as_millis()
            )),
        };

        tracing::warn!(
            "push connect attempt {}/{} failed: {}",
            attempt,
            max_attempts,
            error
        );
        let _ = transport.disconnect().await;
    }

    shared.attempt.store(0, Ordering::Release);
    shared.set_state(ConnectionState::Disconnected);
    tracing::warn!(
        "push channel giving up after {} attempts; call open() to retry",
        max_attempts
    );
    None
}

/// Opens the transport and performs the Engine.IO and Socket.IO handshakes.
async fn handshake<T: Transport>(transport: &mut T, url: &str) -> TransportResult<Handshake> {
    transport.connect(url).await?;

    let handshake = loop {
        match transport.recv().await? {
            Inbound::Packet(Packet::Open(handshake)) => break handshake,
            Inbound::Packet(Packet::Noop) => continue,
            Inbound::Packet(Packet::Close) => return Err(TransportError::ConnectionClosed),
            Inbound::Packet(other) => {
                return Err(TransportError::Protocol(format!(
                    "expected open packet, got {:?}",
                    other
                )))
            }
            Inbound::Skipped(reason) => tracing::debug!("skipping frame: {}", reason),
        }
    };

    transport.send(Packet::connect()).await?;

    loop {
        match transport.recv().await? {
            Inbound::Packet(Packet::Message(SocketPacket::Connect(_))) => return Ok(handshake),
            Inbound::Packet(Packet::Message(SocketPacket::ConnectError(data))) => {
                return Err(TransportError::ConnectionFailed(format!(
                    "namespace connect refused: {}",
                    data
                )))
            }
            Inbound::Packet(Packet::Ping) => transport.send(Packet::Pong).await?,
            Inbound::Packet(Packet::Close) => return Err(TransportError::ConnectionClosed),
            Inbound::Packet(_) => continue,
            Inbound::Skipped(reason) => tracing::debug!("skipping frame: {}", reason),
        }
    }
}

/// Receives packets until the session ends, answering pings and
/// dispatching events.
///
/// Only a server ping proves the session alive: the deadline moves on each
/// ping and nothing else.
async fn pump<T: Transport>(shared: &Shared<T>, session: &mut Session<T>) -> SessionEnd {
    let heartbeat = session.handshake.heartbeat_timeout();
    let mut deadline = Instant::now() + heartbeat;

    loop {
        let inbound = match tokio::time::timeout_at(deadline, session.transport.recv()).await {
            Err(_) => {
                return SessionEnd::Dropped(format!(
                    "no ping within {}ms",
                    heartbeat.as_millis()
                ))
            }
            Ok(Err(e)) => return SessionEnd::Dropped(e.to_string()),
            Ok(Ok(inbound)) => inbound,
        };

        let packet = match inbound {
            Inbound::Packet(packet) => packet,
            Inbound::Skipped(reason) => {
                tracing::warn!("skipping frame: {}", reason);
                continue;
            }
        };

        match packet {
            Packet::Ping => {
                deadline = Instant::now() + heartbeat;
                if let Err(e) = session.transport.send(Packet::Pong).await {
                    return SessionEnd::Dropped(e.to_string());
                }
            }
            Packet::Close => return SessionEnd::Dropped("server closed the session".to_string()),
            Packet::Message(SocketPacket::Disconnect) => return SessionEnd::ServerDisconnect,
            Packet::Message(SocketPacket::Event { name, args }) => {
                dispatch_event(&shared.handlers, &name, &args);
            }
            other => tracing::trace!("ignoring packet {:?}", other),
        }
    }
}

fn dispatch_event(handlers: &HandlerRegistry, name: &str, args: &[Value]) {
    match PushEvent::decode(name, args) {
        Ok(Some(event)) => {
            let delivered = handlers.dispatch(&event);
            tracing::debug!(
                "{} for {} delivered to {} handler(s)",
                name,
                event.object_id(),
                delivered
            );
        }
        Ok(None) => tracing::debug!("ignoring event '{}'", name),
        Err(e) => tracing::warn!("skipping push event: {}", e),
    }
}
