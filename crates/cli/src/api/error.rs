// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform error shape for REST calls.

use serde::Deserialize;
use thiserror::Error;

/// Error type for Remote API Client operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Timeout or connectivity failure.
    #[error("network error: {0}")]
    Network(String),

    /// The server failed (5xx, or any other unexpected status).
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server rejected the request (4xx other than 404).
    #[error("{0}")]
    Validation(String),

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A success response whose body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The image attached to a create payload could not be read.
    #[error("cannot attach image '{path}': {reason}")]
    Attachment { path: String, reason: String },
}

/// Result type for Remote API Client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned by the backend, e.g.
/// `{"statusCode":400,"message":["title should not be empty"],"error":"Bad Request"}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<ErrorMessage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

/// Extracts the server's `message` field from an error body.
///
/// Validation failures carry a list of messages, which are joined.
pub fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed.message? {
        ErrorMessage::One(m) => m,
        ErrorMessage::Many(list) => list.join(", "),
    };
    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}

impl ApiError {
    /// Maps a non-success status and its body onto the error taxonomy.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = server_message(body)
            .unwrap_or_else(|| format!("request failed with status code {}", status));
        match status {
            404 => ApiError::NotFound(message),
            400..=499 => ApiError::Validation(message),
            _ => ApiError::Server { status, message },
        }
    }

    /// The message to show the user: the server's own message when there
    /// is one, else this error's text, else `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        let message = match self {
            ApiError::Validation(m) | ApiError::NotFound(m) => m.clone(),
            ApiError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }

    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Network(m) if m.contains("timed out"))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Network("request timed out".to_string())
        } else if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
