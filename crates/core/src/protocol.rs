// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Push channel wire protocol.
//!
//! The backend announces changes over Socket.IO (protocol v5) carried by
//! Engine.IO (protocol v4) on a WebSocket. Every WebSocket text frame holds
//! one Engine.IO packet:
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                      ping / pong
//! 40                                                         socket connect
//! 42["objectCreated",{..}]                                   socket event
//! ```
//!
//! Only the default namespace is used. Binary packets are not supported.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::object::HeyamaObject;

/// Session parameters sent by the server in the open packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Interval between server pings (milliseconds).
    pub ping_interval: u64,
    /// Grace period after a missed ping (milliseconds).
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

impl Handshake {
    /// Longest silence tolerated before the connection is considered dead.
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// An Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// A Socket.IO packet carried in an Engine.IO message.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Namespace connect. Sent bare by the client; the server's ack carries
    /// `{"sid": ..}`.
    Connect(Option<Value>),
    Disconnect,
    Event {
        name: String,
        args: Vec<Value>,
    },
    Ack {
        id: u64,
        args: Vec<Value>,
    },
    ConnectError(Value),
}

impl Packet {
    /// Creates the client's namespace connect packet (`40`).
    pub fn connect() -> Self {
        Packet::Message(SocketPacket::Connect(None))
    }

    /// Creates an event packet.
    pub fn event(name: impl Into<String>, args: Vec<Value>) -> Self {
        Packet::Message(SocketPacket::Event {
            name: name.into(),
            args,
        })
    }

    /// Encodes the packet as the text of a WebSocket frame.
    pub fn encode(&self) -> Result<String> {
        let text = match self {
            Packet::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
            Packet::Close => "1".to_string(),
            Packet::Ping => "2".to_string(),
            Packet::Pong => "3".to_string(),
            Packet::Message(packet) => format!("4{}", packet.encode()?),
            Packet::Upgrade => "5".to_string(),
            Packet::Noop => "6".to_string(),
        };
        Ok(text)
    }

    /// Decodes the text of a WebSocket frame.
    pub fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| Error::MalformedPacket("empty frame".to_string()))?;
        let rest = chars.as_str();

        match kind {
            '0' => Ok(Packet::Open(serde_json::from_str(rest)?)),
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping),
            '3' => Ok(Packet::Pong),
            '4' => Ok(Packet::Message(SocketPacket::decode(rest)?)),
            '5' => Ok(Packet::Upgrade),
            '6' => Ok(Packet::Noop),
            other => Err(Error::UnknownPacketType(other)),
        }
    }
}

impl SocketPacket {
    fn encode(&self) -> Result<String> {
        let text = match self {
            SocketPacket::Connect(None) => "0".to_string(),
            SocketPacket::Connect(Some(data)) => format!("0{}", serde_json::to_string(data)?),
            SocketPacket::Disconnect => "1".to_string(),
            SocketPacket::Event { name, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                format!("2{}", serde_json::to_string(&items)?)
            }
            SocketPacket::Ack { id, args } => format!("3{}{}", id, serde_json::to_string(args)?),
            SocketPacket::ConnectError(data) => format!("4{}", serde_json::to_string(data)?),
        };
        Ok(text)
    }

    fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| Error::MalformedPacket("empty socket packet".to_string()))?;
        let rest = skip_namespace(chars.as_str());

        // Ack ids are a run of digits in front of the JSON payload.
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        let (ack_id, payload) = rest.split_at(digits);

        match kind {
            '0' if payload.is_empty() => Ok(SocketPacket::Connect(None)),
            '0' => Ok(SocketPacket::Connect(Some(serde_json::from_str(payload)?))),
            '1' => Ok(SocketPacket::Disconnect),
            '2' => {
                let mut items: Vec<Value> = serde_json::from_str(payload)?;
                if items.is_empty() {
                    return Err(Error::MalformedPacket("event without a name".to_string()));
                }
                let name = match items.remove(0) {
                    Value::String(name) => name,
                    other => {
                        return Err(Error::MalformedPacket(format!(
                            "event name must be a string, got {}",
                            other
                        )))
                    }
                };
                Ok(SocketPacket::Event { name, args: items })
            }
            '3' => {
                let id = ack_id
                    .parse()
                    .map_err(|_| Error::MalformedPacket("ack without an id".to_string()))?;
                Ok(SocketPacket::Ack {
                    id,
                    args: serde_json::from_str(payload)?,
                })
            }
            '4' => Ok(SocketPacket::ConnectError(serde_json::from_str(payload)?)),
            '5' | '6' => Err(Error::MalformedPacket(
                "binary packets are not supported".to_string(),
            )),
            other => Err(Error::UnknownPacketType(other)),
        }
    }
}

/// Strips a leading `/namespace,` if present.
fn skip_namespace(text: &str) -> &str {
    if !text.starts_with('/') {
        return text;
    }
    match text.find(',') {
        Some(i) => &text[i + 1..],
        None => "",
    }
}

/// The kinds of change the backend announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl EventKind {
    /// All kinds, in subscription order.
    pub const ALL: [EventKind; 3] = [EventKind::Created, EventKind::Updated, EventKind::Deleted];

    /// Returns the Socket.IO event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            EventKind::Created => "objectCreated",
            EventKind::Updated => "objectUpdated",
            EventKind::Deleted => "objectDeleted",
        }
    }

    /// Looks up a kind by its Socket.IO event name.
    pub fn from_event_name(name: &str) -> Option<Self> {
        EventKind::ALL.into_iter().find(|k| k.event_name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// A decoded server notification.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Created(HeyamaObject),
    Updated(HeyamaObject),
    Deleted(String),
}

/// `objectDeleted` carries a bare id; some servers send `{ "id": .. }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DeletedPayload {
    Id(String),
    Object { id: String },
}

impl PushEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PushEvent::Created(_) => EventKind::Created,
            PushEvent::Updated(_) => EventKind::Updated,
            PushEvent::Deleted(_) => EventKind::Deleted,
        }
    }

    /// Returns the id of the object the event is about.
    pub fn object_id(&self) -> &str {
        match self {
            PushEvent::Created(obj) | PushEvent::Updated(obj) => &obj.id,
            PushEvent::Deleted(id) => id,
        }
    }

    /// Decodes a Socket.IO event.
    ///
    /// Returns `Ok(None)` for events that are not object notifications.
    pub fn decode(name: &str, args: &[Value]) -> Result<Option<Self>> {
        let Some(kind) = EventKind::from_event_name(name) else {
            return Ok(None);
        };
        let payload = args.first().cloned().ok_or_else(|| Error::InvalidEventPayload {
            event: name.to_string(),
            reason: "missing payload".to_string(),
        })?;
        let invalid = |e: serde_json::Error| Error::InvalidEventPayload {
            event: name.to_string(),
            reason: e.to_string(),
        };

        let event = match kind {
            EventKind::Created => {
                PushEvent::Created(serde_json::from_value(payload).map_err(invalid)?)
            }
            EventKind::Updated => {
                PushEvent::Updated(serde_json::from_value(payload).map_err(invalid)?)
            }
            EventKind::Deleted => match serde_json::from_value(payload).map_err(invalid)? {
                DeletedPayload::Id(id) | DeletedPayload::Object { id } => PushEvent::Deleted(id),
            },
        };
        Ok(Some(event))
    }

    /// Encodes the event as the packet a server would send.
    pub fn to_packet(&self) -> Result<Packet> {
        let payload = match self {
            PushEvent::Created(obj) | PushEvent::Updated(obj) => serde_json::to_value(obj)?,
            PushEvent::Deleted(id) => Value::String(id.clone()),
        };
        Ok(Packet::event(self.kind().event_name(), vec![payload]))
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
