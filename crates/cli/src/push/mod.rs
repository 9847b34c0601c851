// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Real-time push channel.
//!
//! Keeps a Socket.IO connection to the backend and delivers object
//! notifications to registered handlers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ PushChannel  │────►│  Transport  │────►│   Backend   │
//! │ (background) │◄────│   (trait)   │◄────│  Socket.IO  │
//! └──────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Handlers    │  objectCreated / objectUpdated / objectDeleted
//! └──────────────┘
//! ```
//!
//! # Features
//!
//! - Engine.IO v4 WebSocket transport with heartbeat replies
//! - Reconnect with exponential backoff, bounded attempts
//! - Per-kind handler registration and removal
//! - Injectable transport trait for testing

mod channel;
mod transport;

pub use channel::{
    ConnectionState, EventHandler, EventSource, HandlerId, HandlerRegistry, PushChannel,
    PushConfig,
};
pub use transport::{socket_url, Inbound, Transport, TransportError, TransportResult, WebSocketTransport};
