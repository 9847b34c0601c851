// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for heyama-core operations.

use thiserror::Error;

/// All possible errors that can occur in heyama-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("title must be at least {min} characters\n  hint: got {actual}")]
    TitleTooShort { min: usize, actual: usize },

    #[error("description must be at least {min} characters\n  hint: got {actual}")]
    DescriptionTooShort { min: usize, actual: usize },

    #[error("not an image file: '{0}'\n  hint: supported extensions are: jpg, jpeg, png, gif, webp, svg")]
    NotAnImage(String),

    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    #[error("unknown packet type: '{0}'")]
    UnknownPacketType(char),

    #[error("unexpected payload for event '{event}': {reason}")]
    InvalidEventPayload { event: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for heyama-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
