// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! heyama-core: Shared types for the Heyama client
//!
//! This crate provides the data model exchanged with the Heyama backend and
//! the push channel wire protocol, used by the `heyama` client library and
//! its command-line front end.

pub mod error;
pub mod media;
pub mod object;
pub mod protocol;

pub use error::{Error, Result};
pub use media::PickedImage;
pub use object::{CreatePayload, HeyamaObject, Pagination, UpdatePayload};
pub use protocol::{EventKind, Handshake, Packet, PushEvent, SocketPacket};
