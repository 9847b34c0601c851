// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine.IO transport for the push channel.
//!
//! Only the WebSocket transport is implemented; the HTTP long-polling
//! transport and the upgrade dance are skipped by connecting with
//! `transport=websocket` directly.

use std::future::Future;
use std::pin::Pin;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use heyama_core::Packet;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// A frame could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No answer within the allowed time.
    #[error("timed out: {0}")]
    Timeout(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// One unit handed up by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A decoded Engine.IO packet. A WebSocket close frame, or the stream
    /// ending, arrives as [`Packet::Close`].
    Packet(Packet),
    /// A frame that carries no Engine.IO text packet. The session goes on.
    Skipped(String),
}

/// Carries Engine.IO packets to and from the server.
///
/// The channel drives one transport per connection attempt, so
/// implementations only need to handle a single session.
pub trait Transport: Send + Sync {
    /// Open the connection for a backend base URL.
    fn connect(
        &mut self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Close the connection. Safe to call when not connected.
    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Send a packet to the server.
    fn send(
        &mut self,
        packet: Packet,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Wait for the next packet. After [`Packet::Close`] has been returned
    /// further calls fail with [`TransportError::ConnectionClosed`].
    fn recv(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<Inbound>> + Send + '_>>;
}

/// Builds the Socket.IO WebSocket endpoint for a backend base URL.
///
/// `https://host` becomes `wss://host/socket.io/?EIO=4&transport=websocket`.
pub fn socket_url(base: &str) -> TransportResult<String> {
    let (scheme, rest) = base
        .split_once("://")
        .ok_or_else(|| TransportError::ConnectionFailed(format!("invalid url '{}'", base)))?;
    let ws_scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => {
            return Err(TransportError::ConnectionFailed(format!(
                "unsupported url scheme '{}'",
                scheme
            )))
        }
    };
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(TransportError::ConnectionFailed(format!(
            "invalid url '{}'",
            base
        )));
    }
    Ok(format!(
        "{}://{}/socket.io/?EIO=4&transport=websocket",
        ws_scheme, rest
    ))
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Engine.IO over a single WebSocket, one text frame per packet.
#[derive(Default)]
pub struct WebSocketTransport {
    socket: Option<Socket>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn socket(&mut self) -> TransportResult<&mut Socket> {
        self.socket.as_mut().ok_or(TransportError::ConnectionClosed)
    }
}

/// Maps a WebSocket message onto the Engine.IO layer.
///
/// Returns `None` for WebSocket pings and pongs, which tungstenite answers
/// on its own and which say nothing about the Engine.IO heartbeat.
pub(crate) fn inbound(message: Message) -> Option<Inbound> {
    match message {
        Message::Text(text) => Some(match Packet::decode(text.as_str()) {
            Ok(packet) => Inbound::Packet(packet),
            Err(e) => Inbound::Skipped(format!("{}: {:?}", e, text.as_str())),
        }),
        Message::Binary(data) => Some(Inbound::Skipped(format!(
            "binary frame ({} bytes)",
            data.len()
        ))),
        Message::Close(frame) => {
            if let Some(frame) = frame {
                tracing::debug!(
                    "close frame {} {:?}",
                    u16::from(frame.code),
                    frame.reason.as_str()
                );
            }
            Some(Inbound::Packet(Packet::Close))
        }
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => None,
    }
}

impl Transport for WebSocketTransport {
    fn connect(
        &mut self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        let url = socket_url(url);
        Box::pin(async move {
            let url = url?;
            tracing::debug!("opening {}", url);
            let (socket, response) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            tracing::trace!("websocket upgraded with status {}", response.status());
            self.socket = Some(socket);
            Ok(())
        })
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            if let Some(mut socket) = self.socket.take() {
                let _ = socket.close(None).await;
            }
            Ok(())
        })
    }

    fn send(
        &mut self,
        packet: Packet,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        let frame = packet
            .encode()
            .map_err(|e| TransportError::Protocol(e.to_string()));
        Box::pin(async move {
            let frame = frame?;
            let sent = self.socket()?.send(Message::Text(frame.into())).await;
            if let Err(e) = sent {
                self.socket = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }
            Ok(())
        })
    }

    fn recv(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<Inbound>> + Send + '_>> {
        Box::pin(async move {
            loop {
                let next = self.socket()?.next().await;
                let message = match next {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        self.socket = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        self.socket = None;
                        return Ok(Inbound::Packet(Packet::Close));
                    }
                };
                if let Some(inbound) = inbound(message) {
                    if inbound == Inbound::Packet(Packet::Close) {
                        self.socket = None;
                    }
                    return Ok(inbound);
                }
            }
        })
    }
}

